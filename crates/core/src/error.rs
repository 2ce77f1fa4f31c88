//! Error types for proxfield

use thiserror::Error;

/// Main error type for proxfield operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Invalid kernel expression `{expr}`: {reason}")]
    InvalidKernelExpression { expr: String, reason: String },

    #[error("Unsupported resolution: {0}")]
    UnsupportedResolution(String),

    #[error("No value map provided and source `{0}` exposes no default value map")]
    MissingValueMap(String),

    #[error("Requested region intersects none of the supplied raster sources")]
    EmptyExtraction,

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for proxfield operations
pub type Result<T> = std::result::Result<T, Error>;
