//! Per-family checksum behaviour behind one trait, so the rewriter and the
//! verifier walk every supported save the same way.

use crate::checksum::{ChecksumAlgorithm, METADATA_BLOCK_ID, blank_metadata};
use crate::layout::{
    B2W2_TABLE, BW_TABLE, BlockDescriptor, BlockTable, ChecksumSlots, DP_LAYOUT, Gen4Layout,
    HGSS_LAYOUT, ORAS_TABLE, PT_LAYOUT, SM_TABLE, XY_TABLE,
};
use crate::slot::ActiveSlots;
use crate::version::{Family, GameVersion};

pub trait SaveFormat {
    fn family(&self) -> Family;

    fn algorithm(&self) -> ChecksumAlgorithm;

    fn block_count(&self) -> usize;

    /// Absolute descriptor for block `index`. Only generation 4 consults
    /// `slots`; the other families have a single copy of every block.
    fn block(&self, index: usize, slots: ActiveSlots) -> Option<BlockDescriptor>;

    fn max_block_len(&self) -> usize;

    /// Adjust the scratch copy of block `index` before it is hashed.
    fn prepare_scratch(&self, _index: usize, _image: &[u8], _scratch: &mut [u8]) {}

    /// Whether the image must be re-signed after its checksums change.
    fn requires_resign(&self) -> bool {
        false
    }
}

/// Generation 5 and 6 saves: one CCITT checksum per table entry.
#[derive(Debug)]
pub struct BlockTableFormat {
    family: Family,
    table: &'static BlockTable,
}

impl SaveFormat for BlockTableFormat {
    fn family(&self) -> Family {
        self.family
    }

    fn algorithm(&self) -> ChecksumAlgorithm {
        ChecksumAlgorithm::Ccitt
    }

    fn block_count(&self) -> usize {
        self.table.len()
    }

    fn block(&self, index: usize, _slots: ActiveSlots) -> Option<BlockDescriptor> {
        self.table.descriptor(index)
    }

    fn max_block_len(&self) -> usize {
        self.table.max_block_len()
    }
}

/// Sun/Moon: reflected CRC-16 over info-table blocks, with the metadata
/// block hashed blank, and a signature over the result.
#[derive(Debug)]
pub struct SunMoonFormat {
    table: &'static BlockTable,
}

impl SunMoonFormat {
    fn stored_block_id(&self, index: usize, image: &[u8]) -> Option<u16> {
        let offset = self.table.block_id_offset(index)?;
        let bytes = image.get(offset..offset + 2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

impl SaveFormat for SunMoonFormat {
    fn family(&self) -> Family {
        Family::SunMoon
    }

    fn algorithm(&self) -> ChecksumAlgorithm {
        ChecksumAlgorithm::Reflected
    }

    fn block_count(&self) -> usize {
        self.table.len()
    }

    fn block(&self, index: usize, _slots: ActiveSlots) -> Option<BlockDescriptor> {
        self.table.descriptor(index)
    }

    fn max_block_len(&self) -> usize {
        self.table.max_block_len()
    }

    fn prepare_scratch(&self, index: usize, image: &[u8], scratch: &mut [u8]) {
        if self.stored_block_id(index, image) == Some(METADATA_BLOCK_ID) {
            log::trace!("block {index}: blanking metadata before hashing");
            blank_metadata(scratch);
        }
    }

    fn requires_resign(&self) -> bool {
        true
    }
}

/// Generation 4: one checksum over the general region and one over the
/// storage region, each taken from its authoritative copy.
#[derive(Debug)]
pub struct Gen4Format {
    family: Family,
    layout: &'static Gen4Layout,
}

impl Gen4Format {
    pub const GENERAL_BLOCK: usize = 0;
    pub const STORAGE_BLOCK: usize = 1;

    pub fn layout(&self) -> &'static Gen4Layout {
        self.layout
    }
}

impl SaveFormat for Gen4Format {
    fn family(&self) -> Family {
        self.family
    }

    fn algorithm(&self) -> ChecksumAlgorithm {
        ChecksumAlgorithm::Ccitt
    }

    fn block_count(&self) -> usize {
        2
    }

    fn block(&self, index: usize, slots: ActiveSlots) -> Option<BlockDescriptor> {
        let (range, checksum, base) = match index {
            Self::GENERAL_BLOCK => (
                self.layout.general_range(),
                self.layout.general_checksum,
                slots.general.base_offset(),
            ),
            Self::STORAGE_BLOCK => (
                self.layout.storage_range(),
                self.layout.storage_checksum,
                slots.storage.base_offset(),
            ),
            _ => return None,
        };
        Some(BlockDescriptor {
            index,
            range: range.shifted(base),
            checksum: ChecksumSlots::single(checksum + base),
        })
    }

    fn max_block_len(&self) -> usize {
        self.layout.general_len.max(self.layout.storage_len)
    }
}

static DP_FORMAT: Gen4Format = Gen4Format {
    family: Family::DiamondPearl,
    layout: &DP_LAYOUT,
};
static PT_FORMAT: Gen4Format = Gen4Format {
    family: Family::Platinum,
    layout: &PT_LAYOUT,
};
static HGSS_FORMAT: Gen4Format = Gen4Format {
    family: Family::HeartGoldSoulSilver,
    layout: &HGSS_LAYOUT,
};
static BW_FORMAT: BlockTableFormat = BlockTableFormat {
    family: Family::BlackWhite,
    table: &BW_TABLE,
};
static B2W2_FORMAT: BlockTableFormat = BlockTableFormat {
    family: Family::Black2White2,
    table: &B2W2_TABLE,
};
static XY_FORMAT: BlockTableFormat = BlockTableFormat {
    family: Family::XY,
    table: &XY_TABLE,
};
static ORAS_FORMAT: BlockTableFormat = BlockTableFormat {
    family: Family::OmegaRubyAlphaSapphire,
    table: &ORAS_TABLE,
};
static SM_FORMAT: SunMoonFormat = SunMoonFormat { table: &SM_TABLE };

pub fn family_format(family: Family) -> &'static dyn SaveFormat {
    match family {
        Family::DiamondPearl => &DP_FORMAT,
        Family::Platinum => &PT_FORMAT,
        Family::HeartGoldSoulSilver => &HGSS_FORMAT,
        Family::BlackWhite => &BW_FORMAT,
        Family::Black2White2 => &B2W2_FORMAT,
        Family::XY => &XY_FORMAT,
        Family::OmegaRubyAlphaSapphire => &ORAS_FORMAT,
        Family::SunMoon => &SM_FORMAT,
    }
}

pub fn format_for(version: GameVersion) -> Option<&'static dyn SaveFormat> {
    version.family().map(family_format)
}
