use crate::format::{SaveFormat, family_format};
use crate::layout::BlockDescriptor;
use crate::rewrite::{self, Resigner, RewriteSummary};
use crate::slot::{self, ActiveSlots};
use crate::version::{Family, GameVersion};

use super::error::{CoreError, CoreErrorCode};
use super::types::ChecksumReport;

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// A save image together with the version it was opened as.
#[derive(Debug, Clone)]
pub struct Session {
    version: GameVersion,
    family: Family,
    image: Vec<u8>,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Open a save image. Without a hint the family is inferred from the
    /// image size; sizes shared by several families are settled by checking
    /// which family's stored checksums all hold.
    pub fn open_bytes<B: Into<Vec<u8>>>(
        &self,
        bytes: B,
        hint: Option<GameVersion>,
    ) -> Result<Session, CoreError> {
        let image = bytes.into();

        match hint {
            Some(version) => {
                let family = version.family().ok_or_else(|| {
                    CoreError::new(
                        CoreErrorCode::UnrecognizedFormat,
                        format!("unsupported game version {version}"),
                    )
                })?;
                if image.len() < family.image_len() {
                    return Err(CoreError::image_too_small(family.image_len(), image.len()));
                }
                Ok(Session {
                    version,
                    family,
                    image,
                })
            }
            None => {
                let family = detect_family(&image)?;
                log::debug!("detected {family} from a {:#x} byte image", image.len());
                Ok(Session {
                    version: family.titles()[0],
                    family,
                    image,
                })
            }
        }
    }
}

fn detect_family(image: &[u8]) -> Result<Family, CoreError> {
    let sized: Vec<Family> = Family::ALL
        .into_iter()
        .filter(|f| f.image_len() == image.len())
        .collect();

    match sized.as_slice() {
        [] => Err(CoreError::new(
            CoreErrorCode::UnrecognizedFormat,
            format!("no supported save is {:#x} bytes long", image.len()),
        )),
        [only] => Ok(*only),
        _ => {
            let verified: Vec<Family> = sized
                .iter()
                .copied()
                .filter(|&f| checksums_hold(image, f))
                .collect();
            match verified.as_slice() {
                [only] => Ok(*only),
                _ => Err(CoreError::new(
                    CoreErrorCode::GameDetectionAmbiguous,
                    format!(
                        "image size {:#x} matches {}; supply a game hint",
                        image.len(),
                        join_families(if verified.is_empty() {
                            &sized
                        } else {
                            &verified
                        })
                    ),
                )),
            }
        }
    }
}

fn checksums_hold(image: &[u8], family: Family) -> bool {
    let version = family.titles()[0];
    slot::locate_active_slots(image, version)
        .and_then(|slots| rewrite::verify_checksums(image, version, slots))
        .is_ok_and(|report| report.is_valid())
}

fn join_families(families: &[Family]) -> String {
    families
        .iter()
        .map(Family::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Session {
    pub fn version(&self) -> GameVersion {
        self.version
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn bytes(&self) -> &[u8] {
        &self.image
    }

    /// Mutable access for edits. Call [`Session::rewrite_checksums`] before
    /// persisting the image.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.image
    }

    fn format(&self) -> &'static dyn SaveFormat {
        family_format(self.family)
    }

    /// Authoritative copies, read fresh from the current image.
    pub fn active_slots(&self) -> Result<ActiveSlots, CoreError> {
        slot::locate_active_slots(&self.image, self.version)
    }

    pub fn block_count(&self) -> usize {
        self.format().block_count()
    }

    pub fn block(&self, index: usize) -> Result<BlockDescriptor, CoreError> {
        let slots = self.active_slots()?;
        self.format().block(index, slots).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::OutOfRangeBlockIndex,
                format!(
                    "block {index} out of range, {} has {} blocks",
                    self.family,
                    self.block_count()
                ),
            )
        })
    }

    pub fn blocks(&self) -> Result<Vec<BlockDescriptor>, CoreError> {
        (0..self.block_count()).map(|i| self.block(i)).collect()
    }

    pub fn verify(&self) -> Result<ChecksumReport, CoreError> {
        let slots = self.active_slots()?;
        rewrite::verify_checksums(&self.image, self.version, slots)
    }

    pub fn rewrite_checksums<R: Resigner + ?Sized>(
        &mut self,
        resigner: &mut R,
    ) -> Result<RewriteSummary, CoreError> {
        let slots = self.active_slots()?;
        rewrite::rewrite_checksums(&mut self.image, self.version, slots, resigner)
    }
}
