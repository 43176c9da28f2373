use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeline already complete: {end_count} rows captured")]
    TimelineComplete { end_count: usize },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Failed to decode persisted data: {0}")]
    DecodeError(String),

    #[error("Failed to encode persisted data: {0}")]
    EncodeError(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EngineError {
    /// True for the error classes raised by malformed or unreadable files.
    pub fn is_io_class(&self) -> bool {
        matches!(
            self,
            Self::DecodeError(_)
                | Self::EncodeError(_)
                | Self::JsonError(_)
                | Self::CsvError(_)
                | Self::ImageError(_)
                | Self::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
