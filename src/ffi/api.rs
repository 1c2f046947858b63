//! The native call table.
//!
//! The native reader exports one function group per pixel type
//! (`...UInt8`, `...UInt16`, `...UInt32`, `...Float`) plus type-agnostic
//! discovery and free functions. This module declares the exact signatures,
//! resolves every export once into a plain [`ReaderFns`] table, and knows the
//! platform file name the library ships under.
//!
//! The table holds bare function pointers rather than [`libloading::Symbol`]
//! values so it can also be filled without dynamic loading, whether from a
//! statically linked build or from in-process stubs in tests.

use libloading::{Library, Symbol};
use std::os::raw::{c_char, c_uint, c_void};

use super::types::{
    CCompressionAlgorithm, CColorInfoVector, CDataTypeVector, CHistogram, CImageExtent, CIndex5D,
    CIndexTcr, COptions, CParameters, CSize5DVector, CThumbnail, CTimeInfoVector,
    ImageReaderHandle,
};

// =============================================================================
// Function signatures
// =============================================================================

/// `bpImageReaderC_Create{UInt8,UInt16,UInt32,Float}`
pub type CreateFn =
    unsafe extern "C" fn(*const c_char, c_uint, *const COptions) -> *mut ImageReaderHandle;

/// `bpImageReaderC_Destroy{...}`
pub type DestroyFn = unsafe extern "C" fn(*mut ImageReaderHandle);

/// `bpImageReaderC_ReadData{...}`
///
/// The buffer parameter is declared type-erased; each pixel-type export
/// actually takes a pointer to its own scalar. The region is `begin`/`end`
/// per axis at the given resolution index, and the caller owns sizing the
/// buffer to the region; the native side performs no checking.
pub type ReadDataFn = unsafe extern "C" fn(
    *mut ImageReaderHandle,
    *const CIndex5D,
    *const CIndex5D,
    c_uint,
    *mut c_void,
);

/// `bpImageReaderC_ReadMetadata{...}`
///
/// Fills five caller-provided out-structures (the native side allocates the
/// arrays inside them) and writes the compression code through the last
/// parameter. The four array-bearing structures must be released with exactly
/// one [`FreeMetadataFn`] call.
pub type ReadMetadataFn = unsafe extern "C" fn(
    *mut ImageReaderHandle,
    *mut CSize5DVector,
    *mut CSize5DVector,
    *mut CImageExtent,
    *mut CTimeInfoVector,
    *mut CColorInfoVector,
    *mut CCompressionAlgorithm,
);

/// `bpImageReaderC_ReadParameters{...}`
///
/// Fills a caller-provided [`CParameters`]; release with [`FreeParametersFn`].
pub type ReadParametersFn = unsafe extern "C" fn(*mut ImageReaderHandle, *mut CParameters);

/// `bpImageReaderC_ReadHistogram{...}`
///
/// Returns a native-owned histogram struct. The interface exposes no matching
/// free call; see the crate-level notes on histogram/thumbnail ownership.
pub type ReadHistogramFn =
    unsafe extern "C" fn(*mut ImageReaderHandle, *const CIndexTcr) -> *mut CHistogram;

/// `bpImageReaderC_ReadThumbnail{...}`
pub type ReadThumbnailFn = unsafe extern "C" fn(*mut ImageReaderHandle) -> *mut CThumbnail;

/// `bpImageReaderC_GetFileImagesInformation`
pub type GetFileImagesInformationFn =
    unsafe extern "C" fn(*const c_char, bool) -> *mut CDataTypeVector;

/// `bpImageReaderC_FreeDataTypes`
pub type FreeDataTypesFn = unsafe extern "C" fn(*mut CDataTypeVector);

/// `bpImageReaderC_FreeMetadata`
pub type FreeMetadataFn = unsafe extern "C" fn(
    *mut CSize5DVector,
    *mut CSize5DVector,
    *mut CTimeInfoVector,
    *mut CColorInfoVector,
);

/// `bpImageReaderC_FreeParameters`
pub type FreeParametersFn = unsafe extern "C" fn(*mut CParameters);

// =============================================================================
// Function table
// =============================================================================

/// The function group exported for one pixel type.
#[derive(Clone, Copy)]
pub struct PixelFns {
    pub create: CreateFn,
    pub destroy: DestroyFn,
    pub read_data: ReadDataFn,
    pub read_metadata: ReadMetadataFn,
    pub read_parameters: ReadParametersFn,
    pub read_histogram: ReadHistogramFn,
    pub read_thumbnail: ReadThumbnailFn,
}

/// The complete resolved native call table.
#[derive(Clone, Copy)]
pub struct ReaderFns {
    pub get_file_images_information: GetFileImagesInformationFn,
    pub free_data_types: FreeDataTypesFn,
    pub free_metadata: FreeMetadataFn,
    pub free_parameters: FreeParametersFn,
    pub uint8: PixelFns,
    pub uint16: PixelFns,
    pub uint32: PixelFns,
    pub float32: PixelFns,
}

impl ReaderFns {
    /// Resolve every export of the native reader from an open library.
    ///
    /// # Safety
    ///
    /// The library must export the ImarisReader C ABI with the exact
    /// signatures declared in this module, and must outlive every use of the
    /// returned table. [`crate::ReaderLibrary`] upholds the lifetime
    /// requirement by owning the [`Library`] alongside the table.
    pub unsafe fn resolve(library: &Library) -> Result<Self, libloading::Error> {
        macro_rules! symbol {
            ($ty:ty, $name:expr) => {{
                let symbol: Symbol<$ty> = library.get($name.as_bytes())?;
                *symbol
            }};
        }

        macro_rules! pixel_fns {
            ($suffix:literal) => {
                PixelFns {
                    create: symbol!(CreateFn, concat!("bpImageReaderC_Create", $suffix)),
                    destroy: symbol!(DestroyFn, concat!("bpImageReaderC_Destroy", $suffix)),
                    read_data: symbol!(ReadDataFn, concat!("bpImageReaderC_ReadData", $suffix)),
                    read_metadata: symbol!(
                        ReadMetadataFn,
                        concat!("bpImageReaderC_ReadMetadata", $suffix)
                    ),
                    read_parameters: symbol!(
                        ReadParametersFn,
                        concat!("bpImageReaderC_ReadParameters", $suffix)
                    ),
                    read_histogram: symbol!(
                        ReadHistogramFn,
                        concat!("bpImageReaderC_ReadHistogram", $suffix)
                    ),
                    read_thumbnail: symbol!(
                        ReadThumbnailFn,
                        concat!("bpImageReaderC_ReadThumbnail", $suffix)
                    ),
                }
            };
        }

        Ok(Self {
            get_file_images_information: symbol!(
                GetFileImagesInformationFn,
                "bpImageReaderC_GetFileImagesInformation"
            ),
            free_data_types: symbol!(FreeDataTypesFn, "bpImageReaderC_FreeDataTypes"),
            free_metadata: symbol!(FreeMetadataFn, "bpImageReaderC_FreeMetadata"),
            free_parameters: symbol!(FreeParametersFn, "bpImageReaderC_FreeParameters"),
            uint8: pixel_fns!("UInt8"),
            uint16: pixel_fns!("UInt16"),
            uint32: pixel_fns!("UInt32"),
            float32: pixel_fns!("Float"),
        })
    }
}

// =============================================================================
// Platform library name
// =============================================================================

/// File name the native reader ships under on the current platform.
///
/// Matches the names the vendor's own bindings load: `bpImarisReader.dll`,
/// `libbpImarisReader.dylib`, `libbpImarisReader.so`.
pub fn default_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "bpImarisReader.dll"
    } else if cfg!(target_os = "macos") {
        "libbpImarisReader.dylib"
    } else {
        "libbpImarisReader.so"
    }
}
