use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

const REFLECTED_POLY: u16 = 0xA001;
const CCITT_POLY: u16 = 0x1021;

/// Block identifier whose embedded metadata is hashed as if blank.
pub const METADATA_BLOCK_ID: u16 = 36;
/// Region inside the metadata block that is zeroed before hashing.
pub const METADATA_RANGE: Range<usize> = 0x100..0x180;

static REFLECTED_TABLE: [u16; 256] = build_reflected_table();

const fn build_reflected_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ REFLECTED_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    Reflected,
    Ccitt,
}

impl ChecksumAlgorithm {
    pub fn compute(&self, data: &[u8]) -> u16 {
        match *self {
            Self::Reflected => crc16_reflected(data),
            Self::Ccitt => crc16_ccitt(data),
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Self::Reflected => "CRC-16 (reflected)",
            Self::Ccitt => "CRC-16/CCITT",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn crc16_reflected(data: &[u8]) -> u16 {
    crc16_reflected_seeded(data, 0)
}

/// Table-driven reflected CRC-16. The accumulator starts at `!seed` and the
/// result is complemented, so a zero seed gives CRC-16/USB.
///
/// Input is consumed a byte pair per step with a trailing single-byte step
/// for odd lengths, the way the console firmware walks it.
pub fn crc16_reflected_seeded(data: &[u8], seed: u16) -> u16 {
    let mut acc = !seed;
    let mut pairs = data.chunks_exact(2);
    for pair in &mut pairs {
        acc = reflected_step(acc, pair[0]);
        acc = reflected_step(acc, pair[1]);
    }
    if let [last] = pairs.remainder() {
        acc = reflected_step(acc, *last);
    }
    !acc
}

#[inline]
fn reflected_step(acc: u16, byte: u8) -> u16 {
    REFLECTED_TABLE[((acc ^ byte as u16) & 0xFF) as usize] ^ (acc >> 8)
}

/// Bit-by-bit CRC-16/CCITT (initial 0xFFFF, no final xor).
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ CCITT_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Zero the metadata window of a scratch copy. Blocks shorter than the
/// window only have their overlapping tail cleared.
pub fn blank_metadata(scratch: &mut [u8]) {
    let end = scratch.len().min(METADATA_RANGE.end);
    if METADATA_RANGE.start < end {
        scratch[METADATA_RANGE.start..end].fill(0);
    }
}
