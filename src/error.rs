//! Error types for pixel engine operations

use thiserror::Error;

/// Result type alias for pixel engine operations
pub type Result<T> = std::result::Result<T, PixelError>;

/// Which buffer a length check refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// RGBA raster, 4 bytes per pixel
    Raster,
    /// Single-byte-per-pixel mask
    Mask,
}

impl std::fmt::Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raster => write!(f, "raster"),
            Self::Mask => write!(f, "mask"),
        }
    }
}

/// Coarse classification of a [`PixelError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Buffer length or image dimensions do not line up
    Dimension,
    /// A tool parameter is outside its documented domain
    Parameter,
    /// The underlying format encoder rejected the data
    Encode,
}

/// Error types for raster engine operations
#[derive(Error, Debug)]
pub enum PixelError {
    /// Zero or overflowing image dimensions
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Buffer length does not match the declared dimensions
    #[error("Invalid {kind} buffer length: expected {expected} bytes, got {actual}")]
    BufferLength {
        kind: BufferKind,
        expected: usize,
        actual: usize,
    },

    /// Caller-provided output buffer cannot hold the result
    #[error("Output buffer too small: need {needed} bytes, capacity is {capacity}")]
    OutputBufferTooSmall { needed: usize, capacity: usize },

    /// Tool parameter outside its domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Seed pixel lies outside the raster
    #[error("Seed ({x}, {y}) is outside the {width}x{height} raster")]
    SeedOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Format not compiled into this build
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Format encoder failure with the encoder's own message
    #[error("{format} encoding failed: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },
}

impl PixelError {
    /// Create a new invalid dimensions error
    pub fn invalid_dimensions<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDimensions(msg.into())
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(format: S) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Create a new encode error for the named format
    pub fn encode<S: Into<String>>(format: &'static str, message: S) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }

    /// Create parameter error with its valid range
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidParameter(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Classify the error into the three failure families
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDimensions(_)
            | Self::BufferLength { .. }
            | Self::OutputBufferTooSmall { .. } => ErrorKind::Dimension,
            Self::InvalidParameter(_) | Self::SeedOutOfBounds { .. } => ErrorKind::Parameter,
            Self::UnsupportedFormat(_) | Self::Encode { .. } => ErrorKind::Encode,
        }
    }
}
