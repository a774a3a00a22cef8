use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core_api::CoreError;
use crate::layout::{GEN4_COPY_SHIFT, Gen4Layout, gen4_layout};
use crate::version::GameVersion;

const SENTINEL_LEN: usize = 10;
const ERASED: u8 = 0xFF;

/// One of the two redundant copies of a double-buffered save region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlotIndex {
    #[default]
    Primary,
    Secondary,
}

impl SlotIndex {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Secondary),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        match *self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }

    pub fn base_offset(&self) -> usize {
        self.index() * GEN4_COPY_SHIFT
    }

    pub fn other(&self) -> Self {
        match *self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Authoritative copies of the generation 4 general and storage regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveSlots {
    pub general: SlotIndex,
    pub storage: SlotIndex,
}

impl ActiveSlots {
    pub fn new(general: SlotIndex, storage: SlotIndex) -> Self {
        Self { general, storage }
    }
}

pub fn locate_general_block(image: &[u8], version: GameVersion) -> Result<SlotIndex, CoreError> {
    let Some(layout) = checked_layout(image, version)? else {
        return Ok(SlotIndex::Primary);
    };
    // Firmware treats an erased second copy as the newer one here.
    let slot = pick_copy(image, 0, layout.general_counter, SlotIndex::Secondary);
    log::debug!("{version}: general block active in slot {slot}");
    Ok(slot)
}

pub fn locate_storage_block(image: &[u8], version: GameVersion) -> Result<SlotIndex, CoreError> {
    let Some(layout) = checked_layout(image, version)? else {
        return Ok(SlotIndex::Primary);
    };
    let slot = pick_copy(
        image,
        layout.storage_footer,
        layout.storage_footer,
        SlotIndex::Primary,
    );
    log::debug!("{version}: storage block active in slot {slot}");
    Ok(slot)
}

pub fn locate_active_slots(image: &[u8], version: GameVersion) -> Result<ActiveSlots, CoreError> {
    Ok(ActiveSlots {
        general: locate_general_block(image, version)?,
        storage: locate_storage_block(image, version)?,
    })
}

/// Generation 4 layout for `version`, once the image is known to hold both
/// copies. Other generations have no double-buffered regions.
fn checked_layout(
    image: &[u8],
    version: GameVersion,
) -> Result<Option<&'static Gen4Layout>, CoreError> {
    let Some(family) = version.family() else {
        return Ok(None);
    };
    let Some(layout) = gen4_layout(family) else {
        return Ok(None);
    };
    if image.len() < family.image_len() {
        return Err(CoreError::image_too_small(family.image_len(), image.len()));
    }
    Ok(Some(layout))
}

/// An erased first copy always yields the second. An erased second copy
/// yields `second_erased`, which differs between the general and storage
/// regions.
fn pick_copy(image: &[u8], sentinel: usize, counter: usize, second_erased: SlotIndex) -> SlotIndex {
    if is_erased(image, sentinel) {
        return SlotIndex::Secondary;
    }
    if is_erased(image, sentinel + GEN4_COPY_SHIFT) {
        return second_erased;
    }

    let first = read_counter(image, counter);
    let second = read_counter(image, counter + GEN4_COPY_SHIFT);
    log::trace!("save counters: copy 0 = {first}, copy 1 = {second}");
    // Ties go to the first copy.
    if first >= second {
        SlotIndex::Primary
    } else {
        SlotIndex::Secondary
    }
}

fn is_erased(image: &[u8], offset: usize) -> bool {
    image[offset..offset + SENTINEL_LEN]
        .iter()
        .all(|&b| b == ERASED)
}

fn read_counter(image: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([image[offset], image[offset + 1]])
}
