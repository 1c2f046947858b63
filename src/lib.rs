//! # ims-reader
//!
//! Rust bindings for the ImarisReader native library.
//!
//! The native reader exposes multi-resolution 5D microscopy images (X, Y, Z,
//! channel, time) through a C ABI with one function group per pixel type.
//! This crate re-declares that ABI bit-exact, loads the library at runtime,
//! and wraps it in one generic, bounds-checked reader instead of four
//! duplicated per-type classes.
//!
//! ## Features
//!
//! - **Runtime loading**: resolves the native call table once from the
//!   platform library (`bpImarisReader.dll` / `libbpImarisReader.dylib` /
//!   `libbpImarisReader.so`) or an explicit path
//! - **One generic reader**: [`ImageReader<T>`] over `u8`, `u16`, `u32`, `f32`
//! - **Owned results**: metadata, parameters, histograms and thumbnails come
//!   back as ordinary Rust collections; every freeable native array is
//!   released exactly once, on error paths too
//! - **Raw table access**: the [`ffi`] module exposes the bare call table for
//!   callers that need the unchecked native contract
//!
//! ## Architecture
//!
//! - [`ffi`] - `#[repr(C)]` ABI declarations, call table, unsafe view helpers
//! - [`types`] - owned result types
//! - [`marshal`] - native-to-owned decoding (the walk-and-copy, factored once)
//! - [`pixel`] - the sealed [`PixelType`] trait selecting a function group
//! - [`reader`] - [`ReaderLibrary`] and the generic [`ImageReader`]
//! - [`error`] - the [`ReaderError`] taxonomy
//! - [`config`] - CLI configuration for the inspector binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use ims_reader::{ImageReaderU16, Index5D, ReaderLibrary, ReaderOptions};
//!
//! fn main() -> ims_reader::Result<()> {
//!     let library = ReaderLibrary::load_default()?;
//!
//!     // Which pixel types does the file contain?
//!     let types = library.file_data_types("embryo.ims", false)?;
//!     println!("images: {types:?}");
//!
//!     // Open the first image and read its metadata.
//!     let reader = ImageReaderU16::open(&library, "embryo.ims", 0, ReaderOptions::default())?;
//!     let metadata = reader.read_metadata()?;
//!     let size = metadata.image_size_per_resolution[0];
//!
//!     // Read one full XY plane of the first Z/channel/timepoint.
//!     let begin = Index5D::new(0, 0, 0, 0, 0);
//!     let end = Index5D::new(size.x, size.y, 1, 1, 1);
//!     let mut buffer = vec![0u16; (size.x * size.y) as usize];
//!     reader.read_data(begin, end, 0, &mut buffer)?;
//!     Ok(())
//! }
//! ```
//!
//! ## What this crate is not
//!
//! There is no algorithmic core here: file parsing, chunk decompression and
//! pyramid construction all live inside the closed native library. Failures
//! inside it (bad file, unsupported codec, out-of-range coordinates) are
//! passed through unmodified; see [`ReaderError`] for the few conditions the
//! binding checks itself.

pub mod config;
pub mod error;
pub mod ffi;
pub mod marshal;
pub mod pixel;
pub mod reader;
pub mod types;

// Re-export commonly used types
pub use error::{ReaderError, Result};
pub use pixel::PixelType;
pub use reader::{
    ImageReader, ImageReaderF32, ImageReaderU16, ImageReaderU32, ImageReaderU8, ReaderLibrary,
};
pub use types::{
    ChannelColor, Color, ColorMode, CompressionAlgorithm, DataType, Histogram, ImageExtent,
    ImageMetadata, Index5D, IndexTcr, Parameters, ReaderOptions, Size5D, Thumbnail, TimeInfo,
};
