use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::version::{Family, GameVersion};

/// Distance between the two redundant copies of a generation 4 save.
pub const GEN4_COPY_SHIFT: usize = 0x40000;

/// Width of each entry in the generation 6/7 block-info table.
const INFO_ENTRY_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn shifted(&self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Where a block's 16-bit checksum is stored. Formats that keep a second
/// copy of every checksum also carry the mirror address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumSlots {
    pub primary: usize,
    pub mirror: Option<usize>,
}

impl ChecksumSlots {
    pub fn single(primary: usize) -> Self {
        Self {
            primary,
            mirror: None,
        }
    }

    pub fn mirrored(primary: usize, mirror: usize) -> Self {
        Self {
            primary,
            mirror: Some(mirror),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.primary).chain(self.mirror)
    }

    pub fn shifted(&self, by: usize) -> Self {
        Self {
            primary: self.primary + by,
            mirror: self.mirror.map(|m| m + by),
        }
    }

    /// One past the last byte any slot writes.
    pub fn end(&self) -> usize {
        self.iter().map(|o| o + 2).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub index: usize,
    pub range: ByteRange,
    pub checksum: ChecksumSlots,
}

impl BlockDescriptor {
    /// One past the last byte this block reads or writes.
    pub fn end(&self) -> usize {
        self.range.end.max(self.checksum.end())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ChecksumPlacement {
    /// Checksum of block `i` lives at `base + 8 * i`; the block identifier
    /// sits in the two bytes before it.
    InfoTable { base: usize },
    /// Per-block primary and mirror addresses.
    Mirrored {
        primary: &'static [u32],
        mirror: &'static [u32],
    },
}

/// Offsets and lengths for a family that checksums each block separately.
#[derive(Debug, Clone, Copy)]
pub struct BlockTable {
    pub offsets: &'static [u32],
    pub lengths: &'static [u32],
    pub placement: ChecksumPlacement,
}

impl BlockTable {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn range(&self, index: usize) -> Option<ByteRange> {
        let offset = *self.offsets.get(index)? as usize;
        let len = *self.lengths.get(index)? as usize;
        Some(ByteRange::new(offset, len))
    }

    pub fn checksum_slots(&self, index: usize) -> Option<ChecksumSlots> {
        if index >= self.len() {
            return None;
        }
        match self.placement {
            ChecksumPlacement::InfoTable { base } => {
                Some(ChecksumSlots::single(base + INFO_ENTRY_WIDTH * index))
            }
            ChecksumPlacement::Mirrored { primary, mirror } => Some(ChecksumSlots::mirrored(
                *primary.get(index)? as usize,
                *mirror.get(index)? as usize,
            )),
        }
    }

    /// Offset of the stored block identifier, for info-table layouts only.
    pub fn block_id_offset(&self, index: usize) -> Option<usize> {
        match self.placement {
            ChecksumPlacement::InfoTable { base } if index < self.len() => {
                Some(base + INFO_ENTRY_WIDTH * index - 2)
            }
            _ => None,
        }
    }

    pub fn descriptor(&self, index: usize) -> Option<BlockDescriptor> {
        Some(BlockDescriptor {
            index,
            range: self.range(index)?,
            checksum: self.checksum_slots(index)?,
        })
    }

    pub fn max_block_len(&self) -> usize {
        self.lengths.iter().copied().max().unwrap_or(0) as usize
    }
}

/// Fixed offsets of the generation 4 general and storage regions, relative
/// to the start of one copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gen4Layout {
    pub general_len: usize,
    pub general_checksum: usize,
    pub general_counter: usize,
    pub storage_footer: usize,
    pub storage_start: usize,
    pub storage_len: usize,
    pub storage_checksum: usize,
}

impl Gen4Layout {
    pub fn general_range(&self) -> ByteRange {
        ByteRange::new(0, self.general_len)
    }

    pub fn storage_range(&self) -> ByteRange {
        ByteRange::new(self.storage_start, self.storage_len)
    }
}

pub static DP_LAYOUT: Gen4Layout = Gen4Layout {
    general_len: 0xC0EC,
    general_checksum: 0xC0FE,
    general_counter: 0xC0F0,
    storage_footer: 0x1E2D0,
    storage_start: 0xC100,
    storage_len: 0x121CC,
    storage_checksum: 0x1E2DE,
};

pub static PT_LAYOUT: Gen4Layout = Gen4Layout {
    general_len: 0xCF18,
    general_checksum: 0xCF2A,
    general_counter: 0xCF1C,
    storage_footer: 0x1F100,
    storage_start: 0xCF2C,
    storage_len: 0x121D0,
    storage_checksum: 0x1F10E,
};

pub static HGSS_LAYOUT: Gen4Layout = Gen4Layout {
    general_len: 0xF618,
    general_checksum: 0xF626,
    general_counter: 0xF618,
    storage_footer: 0x21A00,
    storage_start: 0xF700,
    storage_len: 0x12300,
    storage_checksum: 0x21A0E,
};

pub fn gen4_layout(family: Family) -> Option<&'static Gen4Layout> {
    match family {
        Family::DiamondPearl => Some(&DP_LAYOUT),
        Family::Platinum => Some(&PT_LAYOUT),
        Family::HeartGoldSoulSilver => Some(&HGSS_LAYOUT),
        _ => None,
    }
}

pub static XY_TABLE: BlockTable = BlockTable {
    offsets: &XY_OFFSETS,
    lengths: &XY_LENGTHS,
    placement: ChecksumPlacement::InfoTable {
        base: 0x6A81A - 0x5400,
    },
};

pub static ORAS_TABLE: BlockTable = BlockTable {
    offsets: &ORAS_OFFSETS,
    lengths: &ORAS_LENGTHS,
    placement: ChecksumPlacement::InfoTable {
        base: 0x7B21A - 0x5400,
    },
};

pub static SM_TABLE: BlockTable = BlockTable {
    offsets: &SM_OFFSETS,
    lengths: &SM_LENGTHS,
    placement: ChecksumPlacement::InfoTable {
        base: 0x6BE00 - 0x200 + 0x10 + 0x0A,
    },
};

pub static BW_TABLE: BlockTable = BlockTable {
    offsets: &BW_OFFSETS,
    lengths: &BW_LENGTHS,
    placement: ChecksumPlacement::Mirrored {
        primary: &BW_CHECKSUMS,
        mirror: &BW_MIRRORS,
    },
};

pub static B2W2_TABLE: BlockTable = BlockTable {
    offsets: &B2W2_OFFSETS,
    lengths: &B2W2_LENGTHS,
    placement: ChecksumPlacement::Mirrored {
        primary: &B2W2_CHECKSUMS,
        mirror: &B2W2_MIRRORS,
    },
};

pub fn block_table(family: Family) -> Option<&'static BlockTable> {
    match family {
        Family::BlackWhite => Some(&BW_TABLE),
        Family::Black2White2 => Some(&B2W2_TABLE),
        Family::XY => Some(&XY_TABLE),
        Family::OmegaRubyAlphaSapphire => Some(&ORAS_TABLE),
        Family::SunMoon => Some(&SM_TABLE),
        Family::DiamondPearl | Family::Platinum | Family::HeartGoldSoulSilver => None,
    }
}

pub fn block_count(version: GameVersion) -> usize {
    let Some(family) = version.family() else {
        return 0;
    };
    match block_table(family) {
        Some(table) => table.len(),
        None => 2,
    }
}

/// Range of block `index` within one copy of the save, or `None` for
/// unknown versions and out-of-range indices.
pub fn block_range(version: GameVersion, index: usize) -> Option<ByteRange> {
    let family = version.family()?;
    if let Some(table) = block_table(family) {
        return table.range(index);
    }
    let gen4 = gen4_layout(family)?;
    match index {
        0 => Some(gen4.general_range()),
        1 => Some(gen4.storage_range()),
        _ => None,
    }
}

pub fn block_offset(version: GameVersion, index: usize) -> usize {
    block_range(version, index).map_or(0, |r| r.start)
}

pub fn block_length(version: GameVersion, index: usize) -> usize {
    block_range(version, index).map_or(0, |r| r.len())
}

pub fn checksum_offsets(version: GameVersion, index: usize) -> Option<ChecksumSlots> {
    let family = version.family()?;
    if let Some(table) = block_table(family) {
        return table.checksum_slots(index);
    }
    let gen4 = gen4_layout(family)?;
    match index {
        0 => Some(ChecksumSlots::single(gen4.general_checksum)),
        1 => Some(ChecksumSlots::single(gen4.storage_checksum)),
        _ => None,
    }
}

#[rustfmt::skip]
pub static XY_OFFSETS: [u32; 55] = [
    0x00000, 0x00400, 0x01000, 0x01200, 0x01400, 0x01600, 0x01800, 0x01A00,
    0x01C00, 0x01E00, 0x02000, 0x04200, 0x04400, 0x04A00, 0x05000, 0x0A000,
    0x0F000, 0x14000, 0x14200, 0x14A00, 0x15000, 0x15800, 0x16000, 0x16200,
    0x16400, 0x16A00, 0x16C00, 0x17000, 0x17800, 0x17A00, 0x17C00, 0x17E00,
    0x18000, 0x18200, 0x18A00, 0x19000, 0x19400, 0x1B000, 0x1B200, 0x1B400,
    0x1B800, 0x1BC00, 0x1D800, 0x1DC00, 0x1E400, 0x1E800, 0x1F200, 0x1F600,
    0x1FE00, 0x20C00, 0x20E00, 0x21000, 0x21E00, 0x22600, 0x57200,
];

#[rustfmt::skip]
pub static XY_LENGTHS: [u32; 55] = [
    0x002C8, 0x00B88, 0x0002C, 0x00038, 0x00150, 0x00004, 0x00008, 0x001C0,
    0x000BE, 0x00024, 0x02100, 0x00140, 0x00440, 0x00574, 0x04E28, 0x04E28,
    0x04E28, 0x00170, 0x0061C, 0x00504, 0x006A0, 0x00644, 0x00104, 0x00004,
    0x00420, 0x00064, 0x003F0, 0x0070C, 0x00180, 0x00004, 0x0000C, 0x00048,
    0x00054, 0x00644, 0x005C8, 0x002F8, 0x01B40, 0x001F4, 0x001F0, 0x00216,
    0x00390, 0x01A90, 0x00308, 0x00618, 0x0025C, 0x00834, 0x00318, 0x007D0,
    0x00C48, 0x00078, 0x00200, 0x00C84, 0x00628, 0x34AD0, 0x0E058,
];

#[rustfmt::skip]
pub static ORAS_OFFSETS: [u32; 58] = [
    0x00000, 0x00400, 0x01000, 0x01200, 0x01400, 0x01600, 0x01800, 0x01A00,
    0x01C00, 0x01E00, 0x02000, 0x04200, 0x04400, 0x04A00, 0x05000, 0x0A000,
    0x0F000, 0x14000, 0x14200, 0x14A00, 0x15000, 0x16200, 0x16A00, 0x16C00,
    0x16E00, 0x17400, 0x17600, 0x17A00, 0x18200, 0x18400, 0x18600, 0x18800,
    0x18A00, 0x18C00, 0x19400, 0x19A00, 0x19E00, 0x1BA00, 0x1BC00, 0x1C000,
    0x1C400, 0x1CC00, 0x1E800, 0x1EC00, 0x1F400, 0x1F800, 0x20200, 0x20600,
    0x20E00, 0x21C00, 0x21E00, 0x22000, 0x22E00, 0x23600, 0x23A00, 0x2B600,
    0x33000, 0x67C00,
];

#[rustfmt::skip]
pub static ORAS_LENGTHS: [u32; 58] = [
    0x002C8, 0x00B90, 0x0002C, 0x00038, 0x00150, 0x00004, 0x00008, 0x001C0,
    0x000BE, 0x00024, 0x02100, 0x00130, 0x00440, 0x00574, 0x04E28, 0x04E28,
    0x04E28, 0x00170, 0x0061C, 0x00504, 0x011CC, 0x00644, 0x00104, 0x00004,
    0x00420, 0x00064, 0x003F0, 0x0070C, 0x00180, 0x00004, 0x0000C, 0x00048,
    0x00054, 0x00644, 0x005C8, 0x002F8, 0x01B40, 0x001F4, 0x003E0, 0x00216,
    0x00640, 0x01A90, 0x00400, 0x00618, 0x0025C, 0x00834, 0x00318, 0x007D0,
    0x00C48, 0x00078, 0x00200, 0x00C84, 0x00628, 0x00400, 0x07AD0, 0x078B0,
    0x34AD0, 0x0E058,
];

#[rustfmt::skip]
pub static SM_OFFSETS: [u32; 37] = [
    0x00000, 0x00E00, 0x01000, 0x01200, 0x01400, 0x01C00, 0x02A00, 0x03A00,
    0x03E00, 0x04000, 0x04200, 0x04400, 0x04600, 0x04800, 0x04E00, 0x3B400,
    0x40C00, 0x40E00, 0x42000, 0x43C00, 0x4A200, 0x50800, 0x54200, 0x54400,
    0x54600, 0x64C00, 0x65000, 0x65C00, 0x69C00, 0x6A000, 0x6A800, 0x6AA00,
    0x6B200, 0x6B400, 0x6B600, 0x6B800, 0x6BA00,
];

#[rustfmt::skip]
pub static SM_LENGTHS: [u32; 37] = [
    0x00DE0, 0x0007C, 0x00014, 0x000C0, 0x0061C, 0x00E00, 0x00F78, 0x00228,
    0x00104, 0x00200, 0x00020, 0x00004, 0x00058, 0x005E6, 0x36600, 0x0572C,
    0x00008, 0x01080, 0x01A08, 0x06408, 0x06408, 0x03998, 0x00100, 0x00100,
    0x10528, 0x00204, 0x00B60, 0x03F50, 0x00358, 0x00728, 0x00200, 0x00718,
    0x001FC, 0x00200, 0x00120, 0x001C8, 0x00200,
];

#[rustfmt::skip]
pub static BW_OFFSETS: [u32; 26] = [
    0x00400, 0x01400, 0x02400, 0x03400, 0x04400, 0x05400, 0x06400, 0x07400,
    0x08400, 0x09400, 0x0A400, 0x0B400, 0x0C400, 0x0D400, 0x0E400, 0x0F400,
    0x10400, 0x11400, 0x12400, 0x13400, 0x14400, 0x15400, 0x16400, 0x17400,
    0x1C800, 0x23F00,
];

#[rustfmt::skip]
pub static BW_LENGTHS: [u32; 26] = [
    0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0,
    0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0,
    0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0,
    0x00A94, 0x0008C,
];

#[rustfmt::skip]
pub static BW_CHECKSUMS: [u32; 26] = [
    0x013F2, 0x023F2, 0x033F2, 0x043F2, 0x053F2, 0x063F2, 0x073F2, 0x083F2,
    0x093F2, 0x0A3F2, 0x0B3F2, 0x0C3F2, 0x0D3F2, 0x0E3F2, 0x0F3F2, 0x103F2,
    0x113F2, 0x123F2, 0x133F2, 0x143F2, 0x153F2, 0x163F2, 0x173F2, 0x183F2,
    0x1D296, 0x23F9A,
];

#[rustfmt::skip]
pub static BW_MIRRORS: [u32; 26] = [
    0x25F02, 0x25F04, 0x25F06, 0x25F08, 0x25F0A, 0x25F0C, 0x25F0E, 0x25F10,
    0x25F12, 0x25F14, 0x25F16, 0x25F18, 0x25F1A, 0x25F1C, 0x25F1E, 0x25F20,
    0x25F22, 0x25F24, 0x25F26, 0x25F28, 0x25F2A, 0x25F2C, 0x25F2E, 0x25F30,
    0x23F44, 0x23F9A,
];

#[rustfmt::skip]
pub static B2W2_OFFSETS: [u32; 26] = [
    0x00400, 0x01400, 0x02400, 0x03400, 0x04400, 0x05400, 0x06400, 0x07400,
    0x08400, 0x09400, 0x0A400, 0x0B400, 0x0C400, 0x0D400, 0x0E400, 0x0F400,
    0x10400, 0x11400, 0x12400, 0x13400, 0x14400, 0x15400, 0x16400, 0x17400,
    0x1C800, 0x25F00,
];

#[rustfmt::skip]
pub static B2W2_LENGTHS: [u32; 26] = [
    0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0,
    0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0,
    0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0, 0x00FF0,
    0x00A94, 0x00094,
];

#[rustfmt::skip]
pub static B2W2_CHECKSUMS: [u32; 26] = [
    0x013F2, 0x023F2, 0x033F2, 0x043F2, 0x053F2, 0x063F2, 0x073F2, 0x083F2,
    0x093F2, 0x0A3F2, 0x0B3F2, 0x0C3F2, 0x0D3F2, 0x0E3F2, 0x0F3F2, 0x103F2,
    0x113F2, 0x123F2, 0x133F2, 0x143F2, 0x153F2, 0x163F2, 0x173F2, 0x183F2,
    0x1D296, 0x25FA2,
];

#[rustfmt::skip]
pub static B2W2_MIRRORS: [u32; 26] = [
    0x25F02, 0x25F04, 0x25F06, 0x25F08, 0x25F0A, 0x25F0C, 0x25F0E, 0x25F10,
    0x25F12, 0x25F14, 0x25F16, 0x25F18, 0x25F1A, 0x25F1C, 0x25F1E, 0x25F20,
    0x25F22, 0x25F24, 0x25F26, 0x25F28, 0x25F2A, 0x25F2C, 0x25F2E, 0x25F30,
    0x25F44, 0x25FA2,
];
