use thiserror::Error;

/// Errors of the image level compression functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("stride of {stride} floats is smaller than a row of {width} RGB texels")]
    StrideTooSmall { stride: u32, width: u32 },

    #[error("source data holds {actual} floats, {required} required")]
    SourceTooSmall { actual: usize, required: usize },

    #[error("blocks buffer holds {actual} bytes, {required} required")]
    BufferTooSmall { actual: usize, required: usize },
}

pub type Result<T> = std::result::Result<T, CompressionError>;
