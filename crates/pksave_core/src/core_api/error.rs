use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    UnrecognizedFormat,
    OutOfRangeBlockIndex,
    ImageTooSmall,
    GameDetectionAmbiguous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn image_too_small(needed: usize, actual: usize) -> Self {
        Self::new(
            CoreErrorCode::ImageTooSmall,
            format!("save image is {actual:#x} bytes, layout needs {needed:#x}"),
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
