use serde::{Deserialize, Serialize};

use crate::core_api::{BlockReport, ChecksumReport, CoreError, CoreErrorCode};
use crate::format::{SaveFormat, format_for};
use crate::layout::BlockDescriptor;
use crate::slot::ActiveSlots;
use crate::version::{Family, GameVersion};

/// Re-authenticates an image after its checksums change. Only formats that
/// sign their block table need one; signing itself happens outside this crate.
pub trait Resigner {
    fn resign(&mut self, image: &mut [u8]);
}

impl<F: FnMut(&mut [u8])> Resigner for F {
    fn resign(&mut self, image: &mut [u8]) {
        self(image)
    }
}

/// Leaves the signature untouched, for callers that sign in a later step.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResign;

impl Resigner for NoResign {
    fn resign(&mut self, _image: &mut [u8]) {}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSummary {
    pub family: Option<Family>,
    pub blocks: usize,
    pub resigned: bool,
}

/// Recompute every checksum of `image` and store it at the block's checksum
/// slots. `slots` only matters for generation 4 saves and should come from
/// [`crate::slot::locate_active_slots`].
///
/// Unknown versions are a no-op. Payload bytes are never modified; blocks
/// are processed in index order because later blocks may cover the
/// checksums of earlier ones.
pub fn rewrite_checksums<R: Resigner + ?Sized>(
    image: &mut [u8],
    version: GameVersion,
    slots: ActiveSlots,
    resigner: &mut R,
) -> Result<RewriteSummary, CoreError> {
    let Some(format) = format_for(version) else {
        log::debug!("{version}: unrecognized format, no checksums rewritten");
        return Ok(RewriteSummary::default());
    };
    ensure_image_len(image, format)?;

    let mut scratch = Vec::with_capacity(format.max_block_len());
    let mut blocks = 0;
    for index in 0..format.block_count() {
        let Some(block) = format.block(index, slots) else {
            continue;
        };
        let value = hash_block(format, &block, image, &mut scratch);
        for offset in block.checksum.iter() {
            image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        }
        log::trace!(
            "block {index} [{:#x}..{:#x}) -> {value:#06x}",
            block.range.start,
            block.range.end
        );
        blocks += 1;
    }

    let resigned = format.requires_resign();
    if resigned {
        log::debug!("{version}: re-signing image");
        resigner.resign(image);
    }
    log::debug!("{version}: rewrote {blocks} checksums");

    Ok(RewriteSummary {
        family: Some(format.family()),
        blocks,
        resigned,
    })
}

/// Compare each block's stored checksum(s) with a freshly computed value.
pub fn verify_checksums(
    image: &[u8],
    version: GameVersion,
    slots: ActiveSlots,
) -> Result<ChecksumReport, CoreError> {
    let format = format_for(version).ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::UnrecognizedFormat,
            format!("cannot verify checksums for {version}"),
        )
    })?;
    ensure_image_len(image, format)?;

    let mut scratch = Vec::with_capacity(format.max_block_len());
    let mut blocks = Vec::with_capacity(format.block_count());
    for index in 0..format.block_count() {
        let Some(block) = format.block(index, slots) else {
            continue;
        };
        let computed = hash_block(format, &block, image, &mut scratch);
        let stored = read_u16(image, block.checksum.primary);
        let mirror = block.checksum.mirror.map(|offset| read_u16(image, offset));
        blocks.push(BlockReport {
            index,
            range: block.range,
            computed,
            stored,
            mirror,
            valid: stored == computed && mirror.is_none_or(|m| m == computed),
        });
    }

    let family = format.family();
    Ok(ChecksumReport {
        family,
        version,
        slots: family.is_double_buffered().then_some(slots),
        blocks,
    })
}

fn ensure_image_len(image: &[u8], format: &dyn SaveFormat) -> Result<(), CoreError> {
    let needed = format.family().image_len();
    if image.len() < needed {
        return Err(CoreError::image_too_small(needed, image.len()));
    }
    Ok(())
}

fn hash_block(
    format: &dyn SaveFormat,
    block: &BlockDescriptor,
    image: &[u8],
    scratch: &mut Vec<u8>,
) -> u16 {
    scratch.clear();
    scratch.extend_from_slice(&image[block.range.as_range()]);
    format.prepare_scratch(block.index, image, scratch);
    format.algorithm().compute(scratch)
}

fn read_u16(image: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([image[offset], image[offset + 1]])
}
