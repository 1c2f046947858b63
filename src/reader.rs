//! Safe wrapper over the native reader.
//!
//! [`ReaderLibrary`] owns the loaded native library and its resolved call
//! table; [`ImageReader`] owns one native reader handle, generic over the
//! pixel scalar type. Every native array read is paired with exactly one
//! matching free call through a guard that fires on all paths, including
//! error paths.
//!
//! A reader handle is a single-ownership resource meant for sequential use:
//! the wrapper holds a raw pointer and is therefore neither `Send` nor
//! `Sync`. Native calls are blocking and synchronous; there is no
//! cancellation or timeout.

use std::ffi::CString;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use tracing::debug;

use crate::error::{ReaderError, Result};
use crate::ffi::api::{default_library_name, PixelFns, ReaderFns};
use crate::ffi::types::{
    CCompressionAlgorithm, CColorInfoVector, CDataTypeVector, CImageExtent, COptions, CParameters,
    CSize5DVector, CTimeInfoVector, ImageReaderHandle,
};
use crate::marshal;
use crate::pixel::PixelType;
use crate::types::{
    CompressionAlgorithm, DataType, Histogram, ImageExtent, ImageMetadata, Index5D, IndexTcr,
    Parameters, ReaderOptions, Thumbnail,
};

// =============================================================================
// ReaderLibrary
// =============================================================================

/// The loaded native reader library.
///
/// Shared via [`Arc`] so every open reader keeps the library mapped for its
/// whole lifetime. Immutable after load.
pub struct ReaderLibrary {
    // Kept alive for the function pointers in `fns`; never touched again.
    _library: Option<Library>,
    fns: ReaderFns,
}

impl ReaderLibrary {
    /// Load the native reader from an explicit library path.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let library = unsafe { Library::new(path) }?;
        let fns = unsafe { ReaderFns::resolve(&library) }?;
        debug!(path = %path.display(), "loaded native reader library");
        Ok(Arc::new(Self {
            _library: Some(library),
            fns,
        }))
    }

    /// Load the native reader by its platform file name, searching the
    /// system's default library paths.
    pub fn load_default() -> Result<Arc<Self>> {
        Self::load(default_library_name())
    }

    /// Wrap an already-resolved call table.
    ///
    /// For builds that link the native reader statically, or tests that stub
    /// it out in-process. The caller guarantees every function pointer stays
    /// valid for the lifetime of the returned value.
    pub fn from_fns(fns: ReaderFns) -> Arc<Self> {
        Arc::new(Self {
            _library: None,
            fns,
        })
    }

    /// The resolved native call table.
    pub fn fns(&self) -> &ReaderFns {
        &self.fns
    }

    /// Enumerate the pixel data types of the images in a file, one entry per
    /// image, without opening a reader.
    ///
    /// The native layer allocates the returned code array; it is released
    /// with exactly one free call before this returns, on success and on
    /// decode failure alike. (The vector struct itself is native-owned and
    /// has no release call; that behavior is inherited.)
    pub fn file_data_types(&self, path: impl AsRef<Path>, swmr: bool) -> Result<Vec<DataType>> {
        let path = path.as_ref();
        let path_c = path_cstring(path)?;

        let raw = unsafe { (self.fns.get_file_images_information)(path_c.as_ptr(), swmr) };
        if raw.is_null() {
            return Err(ReaderError::NullResult {
                operation: "data type discovery",
            });
        }

        let guard = DataTypesGuard {
            fns: &self.fns,
            raw,
        };
        let decoded = unsafe { marshal::data_types(&*guard.raw) }?;
        debug!(path = %path.display(), images = decoded.len(), "enumerated file images");
        Ok(decoded)
    }
}

impl std::fmt::Debug for ReaderLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderLibrary")
            .field("dynamically_loaded", &self._library.is_some())
            .finish()
    }
}

// =============================================================================
// Free guards
// =============================================================================

struct DataTypesGuard<'a> {
    fns: &'a ReaderFns,
    raw: *mut CDataTypeVector,
}

impl Drop for DataTypesGuard<'_> {
    fn drop(&mut self) {
        unsafe { (self.fns.free_data_types)(self.raw) }
    }
}

/// Holds the four array-bearing metadata out-structures and releases them
/// with one `FreeMetadata` call on drop. Created before the native read:
/// the free call tolerates the all-null defaults, so an early exit is safe.
struct MetadataGuard<'a> {
    fns: &'a ReaderFns,
    image_sizes: CSize5DVector,
    block_sizes: CSize5DVector,
    time_infos: CTimeInfoVector,
    color_infos: CColorInfoVector,
}

impl<'a> MetadataGuard<'a> {
    fn new(fns: &'a ReaderFns) -> Self {
        Self {
            fns,
            image_sizes: CSize5DVector::default(),
            block_sizes: CSize5DVector::default(),
            time_infos: CTimeInfoVector::default(),
            color_infos: CColorInfoVector::default(),
        }
    }
}

impl Drop for MetadataGuard<'_> {
    fn drop(&mut self) {
        unsafe {
            (self.fns.free_metadata)(
                &mut self.image_sizes,
                &mut self.block_sizes,
                &mut self.time_infos,
                &mut self.color_infos,
            )
        }
    }
}

struct ParametersGuard<'a> {
    fns: &'a ReaderFns,
    raw: CParameters,
}

impl<'a> ParametersGuard<'a> {
    fn new(fns: &'a ReaderFns) -> Self {
        Self {
            fns,
            raw: CParameters::default(),
        }
    }
}

impl Drop for ParametersGuard<'_> {
    fn drop(&mut self) {
        unsafe { (self.fns.free_parameters)(&mut self.raw) }
    }
}

// =============================================================================
// ImageReader
// =============================================================================

/// One open native reader, generic over the pixel scalar type.
///
/// Created by [`ImageReader::open`]; the native handle is destroyed exactly
/// once when the value drops. All failure behavior beyond the argument checks
/// documented per method is the native library's own.
pub struct ImageReader<T: PixelType> {
    library: Arc<ReaderLibrary>,
    handle: *mut ImageReaderHandle,
    path: PathBuf,
    image_index: u32,
    _pixel: PhantomData<T>,
}

/// Reader for 8-bit unsigned integer images.
pub type ImageReaderU8 = ImageReader<u8>;
/// Reader for 16-bit unsigned integer images.
pub type ImageReaderU16 = ImageReader<u16>;
/// Reader for 32-bit unsigned integer images.
pub type ImageReaderU32 = ImageReader<u32>;
/// Reader for 32-bit float images.
pub type ImageReaderF32 = ImageReader<f32>;

impl<T: PixelType> ImageReader<T> {
    /// Open image `image_index` of `path` with the native reader for `T`.
    ///
    /// Fails with [`ReaderError::CreateFailed`] when the native create call
    /// returns a null handle; the binding performs no validation of its own
    /// beyond the path conversion.
    pub fn open(
        library: &Arc<ReaderLibrary>,
        path: impl Into<PathBuf>,
        image_index: u32,
        options: ReaderOptions,
    ) -> Result<Self> {
        let path = path.into();
        let path_c = path_cstring(&path)?;
        let options_c = COptions { swmr: options.swmr };

        let handle =
            unsafe { (T::fns(library.fns()).create)(path_c.as_ptr(), image_index, &options_c) };
        if handle.is_null() {
            return Err(ReaderError::CreateFailed { path, image_index });
        }

        debug!(
            path = %path.display(),
            image_index,
            data_type = %T::DATA_TYPE,
            "opened native reader"
        );
        Ok(Self {
            library: Arc::clone(library),
            handle,
            path,
            image_index,
            _pixel: PhantomData,
        })
    }

    /// The file this reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The image index this reader was opened on.
    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    /// The pixel data type this reader reads.
    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn fns(&self) -> &PixelFns {
        T::fns(self.library.fns())
    }

    /// Read the samples of the 5D region `begin..end` at the given resolution
    /// level into `buffer`.
    ///
    /// The buffer must hold at least `prod(end - begin)` samples; shorter
    /// buffers are rejected before the native call, and an inverted region
    /// (`end` before `begin` on any axis) is
    /// [`ReaderError::InvalidRegion`]. The region/level contract itself,
    /// including what happens for coordinates outside the image, is owned by
    /// the native layer.
    pub fn read_data(
        &self,
        begin: Index5D,
        end: Index5D,
        resolution_index: u32,
        buffer: &mut [T],
    ) -> Result<()> {
        let required = begin
            .samples_until(end)
            .ok_or(ReaderError::InvalidRegion { begin, end })?;
        if (buffer.len() as u64) < required {
            return Err(ReaderError::BufferTooSmall {
                required,
                actual: buffer.len() as u64,
            });
        }

        let begin_c = begin.to_c();
        let end_c = end.to_c();
        unsafe {
            (self.fns().read_data)(
                self.handle,
                &begin_c,
                &end_c,
                resolution_index,
                buffer.as_mut_ptr().cast(),
            )
        }
        debug!(samples = required, resolution_index, "read pixel region");
        Ok(())
    }

    /// Read the image metadata: per-resolution image and block sizes, spatial
    /// extents, per-timepoint acquisition times, per-channel color settings,
    /// and the compression algorithm.
    ///
    /// The five native arrays filled by the call are released with exactly
    /// one `FreeMetadata`, also when the compression code fails to convert.
    pub fn read_metadata(&self) -> Result<ImageMetadata> {
        let mut guard = MetadataGuard::new(self.library.fns());
        let mut extent = CImageExtent::default();
        let mut compression: CCompressionAlgorithm = 0;

        unsafe {
            (self.fns().read_metadata)(
                self.handle,
                &mut guard.image_sizes,
                &mut guard.block_sizes,
                &mut extent,
                &mut guard.time_infos,
                &mut guard.color_infos,
                &mut compression,
            );
        }

        let metadata = ImageMetadata {
            image_size_per_resolution: unsafe { marshal::size_per_resolution(&guard.image_sizes) },
            block_size_per_resolution: unsafe { marshal::size_per_resolution(&guard.block_sizes) },
            extent: ImageExtent::from_c(&extent),
            time_points: unsafe { marshal::time_infos(&guard.time_infos) },
            channel_colors: unsafe { marshal::channel_colors(&guard.color_infos) },
            compression: CompressionAlgorithm::try_from(compression)?,
        };
        debug!(
            resolutions = metadata.resolution_count(),
            channels = metadata.channel_count(),
            time_points = metadata.time_point_count(),
            "read metadata"
        );
        Ok(metadata)
    }

    /// Read the parameter sections: a two-level string mapping of arbitrary
    /// metadata grouped by section name. Duplicate names are last-write-wins.
    ///
    /// The native structures are released with exactly one `FreeParameters`.
    pub fn read_parameters(&self) -> Result<Parameters> {
        let mut guard = ParametersGuard::new(self.library.fns());

        unsafe { (self.fns().read_parameters)(self.handle, &mut guard.raw) }

        let decoded = unsafe { marshal::parameters(&guard.raw) };
        debug!(sections = decoded.section_count(), "read parameters");
        Ok(decoded)
    }

    /// Read the histogram of one (time, channel, resolution) subset.
    ///
    /// The native interface exposes no free call for the returned struct;
    /// the data is copied into an owned [`Histogram`] and the native
    /// allocation is left to the native layer (its per-call cost is inherited
    /// behavior this binding does not control).
    pub fn read_histogram(&self, index: IndexTcr) -> Result<Histogram> {
        let index_c = index.to_c();
        let raw = unsafe { (self.fns().read_histogram)(self.handle, &index_c) };
        if raw.is_null() {
            return Err(ReaderError::NullResult {
                operation: "histogram read",
            });
        }
        Ok(unsafe { marshal::histogram(&*raw) })
    }

    /// Read the fixed-size RGBA thumbnail.
    ///
    /// Ownership of the returned native struct is the same open contract as
    /// [`read_histogram`](Self::read_histogram): copied, never freed.
    pub fn read_thumbnail(&self) -> Result<Thumbnail> {
        let raw = unsafe { (self.fns().read_thumbnail)(self.handle) };
        if raw.is_null() {
            return Err(ReaderError::NullResult {
                operation: "thumbnail read",
            });
        }
        Ok(unsafe { marshal::thumbnail(&*raw) })
    }
}

impl<T: PixelType> Drop for ImageReader<T> {
    fn drop(&mut self) {
        unsafe { (self.fns().destroy)(self.handle) }
        debug!(path = %self.path.display(), image_index = self.image_index, "destroyed native reader");
    }
}

impl<T: PixelType> std::fmt::Debug for ImageReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageReader")
            .field("path", &self.path)
            .field("image_index", &self.image_index)
            .field("data_type", &T::DATA_TYPE)
            .finish()
    }
}

fn path_cstring(path: &Path) -> Result<CString> {
    CString::new(path.to_string_lossy().into_owned().into_bytes()).map_err(|_| {
        ReaderError::InvalidPath {
            path: path.to_path_buf(),
        }
    })
}
