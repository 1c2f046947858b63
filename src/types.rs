//! Owned types returned by the safe reader API.
//!
//! These are the in-process counterparts of the transient native structures
//! in [`crate::ffi::types`]: once a read returns, everything here owns its
//! memory and has no remaining tie to the native layer.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::ReaderError;
use crate::ffi::types::{
    CColor, CImageExtent, CIndex5D, CIndexTcr, CTimeInfo, C_DATA_TYPE_FLOAT, C_DATA_TYPE_UINT16,
    C_DATA_TYPE_UINT32, C_DATA_TYPE_UINT8,
};

// =============================================================================
// Pixel data types
// =============================================================================

/// Pixel data type of one image in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    Float32,
}

impl DataType {
    /// The native ABI code for this data type.
    pub fn code(self) -> i32 {
        match self {
            DataType::UInt8 => C_DATA_TYPE_UINT8,
            DataType::UInt16 => C_DATA_TYPE_UINT16,
            DataType::UInt32 => C_DATA_TYPE_UINT32,
            DataType::Float32 => C_DATA_TYPE_FLOAT,
        }
    }

    /// Size of one sample in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            DataType::UInt8 => 1,
            DataType::UInt16 => 2,
            DataType::UInt32 | DataType::Float32 => 4,
        }
    }
}

impl TryFrom<i32> for DataType {
    type Error = ReaderError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            C_DATA_TYPE_UINT8 => Ok(DataType::UInt8),
            C_DATA_TYPE_UINT16 => Ok(DataType::UInt16),
            C_DATA_TYPE_UINT32 => Ok(DataType::UInt32),
            C_DATA_TYPE_FLOAT => Ok(DataType::Float32),
            other => Err(ReaderError::UnknownDataType(other)),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::Float32 => "float32",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Coordinates
// =============================================================================

/// A five-axis position or extent: spatial X/Y/Z, channel, time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Index5D {
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub c: u32,
    pub t: u32,
}

/// The native ABI treats sizes and indices as the same five-field tuple.
pub type Size5D = Index5D;

impl Index5D {
    pub fn new(x: u32, y: u32, z: u32, c: u32, t: u32) -> Self {
        Self { x, y, z, c, t }
    }

    /// Number of samples in the region spanning `self..end`.
    ///
    /// `None` if `end` precedes `self` on any axis or the product overflows.
    pub fn samples_until(self, end: Index5D) -> Option<u64> {
        let spans = [
            end.x.checked_sub(self.x)?,
            end.y.checked_sub(self.y)?,
            end.z.checked_sub(self.z)?,
            end.c.checked_sub(self.c)?,
            end.t.checked_sub(self.t)?,
        ];
        spans
            .iter()
            .try_fold(1u64, |count, &span| count.checked_mul(span as u64))
    }

    pub(crate) fn to_c(self) -> CIndex5D {
        CIndex5D {
            x: self.x,
            y: self.y,
            z: self.z,
            c: self.c,
            t: self.t,
        }
    }

    pub(crate) fn from_c(raw: &CIndex5D) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            z: raw.z,
            c: raw.c,
            t: raw.t,
        }
    }
}

/// (Time, Channel, Resolution) triple identifying a histogram's source subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexTcr {
    pub t: u32,
    pub c: u32,
    pub r: u32,
}

impl IndexTcr {
    pub fn new(t: u32, c: u32, r: u32) -> Self {
        Self { t, c, r }
    }

    pub(crate) fn to_c(self) -> CIndexTcr {
        CIndexTcr {
            t: self.t,
            c: self.c,
            r: self.r,
        }
    }
}

// =============================================================================
// Reader options
// =============================================================================

/// Options passed to the native reader on open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReaderOptions {
    /// Open in single-writer-multi-reader mode, allowing reads from a file
    /// that another process is still writing
    pub swmr: bool,
}

// =============================================================================
// Metadata
// =============================================================================

/// Spatial extents of the image, min and max per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ImageExtent {
    pub min_x: f32,
    pub min_y: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
}

impl ImageExtent {
    pub(crate) fn from_c(raw: &CImageExtent) -> Self {
        Self {
            min_x: raw.extent_min_x,
            min_y: raw.extent_min_y,
            min_z: raw.extent_min_z,
            max_x: raw.extent_max_x,
            max_y: raw.extent_max_y,
            max_z: raw.extent_max_z,
        }
    }
}

/// Acquisition timestamp of one timepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeInfo {
    /// Julian day number of the acquisition date
    pub julian_day: u32,
    /// Nanoseconds elapsed since midnight of that day
    pub nanoseconds_of_day: u64,
}

impl TimeInfo {
    pub(crate) fn from_c(raw: &CTimeInfo) -> Self {
        Self {
            julian_day: raw.julian_day,
            nanoseconds_of_day: raw.nanoseconds_of_day,
        }
    }
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub(crate) fn from_c(raw: &CColor) -> Self {
        Self {
            red: raw.red,
            green: raw.green,
            blue: raw.blue,
            alpha: raw.alpha,
        }
    }
}

/// How a channel maps sample values to display colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColorMode {
    /// One base color for the whole channel
    BaseColor(Color),
    /// An explicit lookup table
    Table(Vec<Color>),
}

/// Display settings of one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelColor {
    pub mode: ColorMode,
    pub opacity: f32,
    pub range_min: f32,
    pub range_max: f32,
    pub gamma_correction: f32,
}

/// Compression applied to the pixel blocks of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompressionAlgorithm {
    None,
    /// Gzip at the given level (1..=9)
    Gzip { level: u8 },
    /// Byte-shuffle followed by gzip at the given level (1..=9)
    ShuffleGzip { level: u8 },
    Lz4,
    ShuffleLz4,
}

impl CompressionAlgorithm {
    /// The native ABI code for this algorithm.
    pub fn code(self) -> i32 {
        match self {
            CompressionAlgorithm::None => 0,
            CompressionAlgorithm::Gzip { level } => level as i32,
            CompressionAlgorithm::ShuffleGzip { level } => 10 + level as i32,
            CompressionAlgorithm::Lz4 => 21,
            CompressionAlgorithm::ShuffleLz4 => 31,
        }
    }
}

impl TryFrom<i32> for CompressionAlgorithm {
    type Error = ReaderError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CompressionAlgorithm::None),
            1..=9 => Ok(CompressionAlgorithm::Gzip { level: code as u8 }),
            11..=19 => Ok(CompressionAlgorithm::ShuffleGzip {
                level: (code - 10) as u8,
            }),
            21 => Ok(CompressionAlgorithm::Lz4),
            31 => Ok(CompressionAlgorithm::ShuffleLz4),
            other => Err(ReaderError::UnknownCompression(other)),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionAlgorithm::None => write!(f, "none"),
            CompressionAlgorithm::Gzip { level } => write!(f, "gzip (level {level})"),
            CompressionAlgorithm::ShuffleGzip { level } => {
                write!(f, "shuffle+gzip (level {level})")
            }
            CompressionAlgorithm::Lz4 => write!(f, "lz4"),
            CompressionAlgorithm::ShuffleLz4 => write!(f, "shuffle+lz4"),
        }
    }
}

/// Everything the native metadata read reports about one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMetadata {
    /// Image size at each resolution level, level 0 first (full resolution)
    pub image_size_per_resolution: Vec<Size5D>,
    /// Block (chunk) size at each resolution level
    pub block_size_per_resolution: Vec<Size5D>,
    /// Spatial extents of the image
    pub extent: ImageExtent,
    /// Acquisition timestamp per timepoint
    pub time_points: Vec<TimeInfo>,
    /// Display settings per channel
    pub channel_colors: Vec<ChannelColor>,
    /// Compression applied to the pixel blocks
    pub compression: CompressionAlgorithm,
}

impl ImageMetadata {
    /// Number of resolution levels in the pyramid.
    pub fn resolution_count(&self) -> usize {
        self.image_size_per_resolution.len()
    }

    /// Number of timepoints.
    pub fn time_point_count(&self) -> usize {
        self.time_points.len()
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channel_colors.len()
    }
}

// =============================================================================
// Histogram and thumbnail
// =============================================================================

/// Sample value histogram of one (time, channel, resolution) subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub min: u32,
    pub max: u32,
    pub bins: Vec<u64>,
}

/// Fixed-size RGBA preview of the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    /// Interleaved RGBA bytes, `width * height * 4` long
    pub rgba: Vec<u8>,
}

// =============================================================================
// Parameters
// =============================================================================

/// Arbitrary metadata key/value pairs grouped by named section.
///
/// Duplicate section or key names are last-write-wins; the native layer
/// performs no duplicate detection and neither does this map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameters {
    sections: HashMap<String, HashMap<String, String>>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, creating the section if needed.
    pub fn set_value(
        &mut self,
        section: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Look up one value.
    pub fn value(&self, section: &str, name: &str) -> Option<&str> {
        self.sections.get(section)?.get(name).map(String::as_str)
    }

    /// All parameters of one section.
    pub fn section(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(name)
    }

    /// Iterate over `(section name, parameters)` pairs in arbitrary order.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &HashMap<String, String>)> {
        self.sections.iter().map(|(name, map)| (name.as_str(), map))
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
