use serde::{Deserialize, Serialize};

use crate::layout::ByteRange;
use crate::slot::ActiveSlots;
use crate::version::{Family, GameVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockReport {
    pub index: usize,
    pub range: ByteRange,
    pub computed: u16,
    pub stored: u16,
    pub mirror: Option<u16>,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksumReport {
    pub family: Family,
    pub version: GameVersion,
    pub slots: Option<ActiveSlots>,
    pub blocks: Vec<BlockReport>,
}

impl ChecksumReport {
    pub fn is_valid(&self) -> bool {
        self.blocks.iter().all(|b| b.valid)
    }

    pub fn invalid_blocks(&self) -> Vec<&BlockReport> {
        self.blocks.iter().filter(|b| !b.valid).collect()
    }
}
