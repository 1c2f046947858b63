use std::path::PathBuf;

use thiserror::Error;

use crate::types::Index5D;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors the binding itself can detect.
///
/// Failures inside the native library (bad file, unsupported codec,
/// out-of-range coordinates) are not translated: the native layer signals
/// them however it chooses, typically with a null pointer, and only those
/// null returns surface here. Everything else in this enum is a condition
/// checked on the Rust side of the boundary before or after a native call.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The native library could not be loaded or a symbol is missing
    #[error("native library error: {0}")]
    Library(#[from] libloading::Error),

    /// The file path contains an interior NUL and cannot cross the C boundary
    #[error("invalid path {path:?}: interior NUL byte")]
    InvalidPath { path: PathBuf },

    /// The native create call returned a null handle
    #[error("failed to open image {image_index} of {path:?}")]
    CreateFailed { path: PathBuf, image_index: u32 },

    /// A native read returned a null pointer where a result was expected
    #[error("native {operation} call returned null")]
    NullResult { operation: &'static str },

    /// Region end precedes begin on at least one axis
    #[error("invalid region: end {end:?} precedes begin {begin:?}")]
    InvalidRegion { begin: Index5D, end: Index5D },

    /// Caller buffer is too short for the requested region
    #[error("buffer too small: region holds {required} samples, buffer holds {actual}")]
    BufferTooSmall { required: u64, actual: u64 },

    /// The native layer reported a pixel data type code outside the ABI enum
    #[error("unknown data type code {0}")]
    UnknownDataType(i32),

    /// The native layer reported a compression code outside the ABI enum
    #[error("unknown compression algorithm code {0}")]
    UnknownCompression(i32),
}
