//! Error types for the conversion pipeline

use thiserror::Error;

/// Error returned by the conversion pipeline.
///
/// Every variant is raised before any pixel is processed, so a failed
/// conversion never yields a partial buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Source or target dimensions are unusable
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions { width: u32, height: u32, reason: &'static str },
    /// Supplied palette is empty or has an out-of-range channel
    #[error("invalid palette: {0}")]
    InvalidPalette(String),
    /// A configuration value is outside its documented range
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub(crate) fn dimensions(width: u32, height: u32, reason: &'static str) -> Self {
        PipelineError::InvalidDimensions { width, height, reason }
    }
}
