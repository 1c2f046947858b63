//! Configuration for the inspector CLI.
//!
//! Command-line arguments via clap, with environment variable fallbacks
//! using the `IMS_` prefix:
//!
//! - `IMS_LIBRARY` - explicit path to the native reader library
//! - `IMS_SWMR` - open files in single-writer-multi-reader mode
//! - `IMS_IMAGE_INDEX` - image index within the file (default: 0)
//!
//! The library itself takes no ambient configuration; everything reaches it
//! through explicit arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::DataType;

// =============================================================================
// CLI
// =============================================================================

/// ims-reader - inspect images through the ImarisReader native library.
#[derive(Parser, Debug)]
#[command(name = "ims-reader")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the pixel data types of the images in a file
    Types(TypesConfig),

    /// Dump the metadata of one image
    Metadata(MetadataConfig),

    /// Dump the parameter sections of one image
    Params(ParamsConfig),

    /// Print the histogram of one (time, channel, resolution) subset
    Histogram(HistogramConfig),

    /// Export the thumbnail of one image as PNG
    Thumbnail(ThumbnailConfig),
}

// =============================================================================
// Shared options
// =============================================================================

/// Options every subcommand takes.
#[derive(Args, Debug, Clone)]
pub struct CommonConfig {
    /// Path to the image file.
    pub file: PathBuf,

    /// Explicit path to the native reader library.
    ///
    /// When omitted, the platform file name is resolved through the system's
    /// default library search paths.
    #[arg(long, env = "IMS_LIBRARY")]
    pub library: Option<PathBuf>,

    /// Open the file in single-writer-multi-reader mode.
    #[arg(long, env = "IMS_SWMR")]
    pub swmr: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Options for subcommands that open a typed reader.
#[derive(Args, Debug, Clone)]
pub struct OpenConfig {
    #[command(flatten)]
    pub common: CommonConfig,

    /// Image index within the file.
    #[arg(long, default_value_t = 0, env = "IMS_IMAGE_INDEX")]
    pub image_index: u32,

    /// Pixel data type of the image.
    ///
    /// Discovered from the file when omitted.
    #[arg(long = "type", value_enum)]
    pub data_type: Option<DataTypeArg>,
}

/// Pixel data type as a CLI argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTypeArg {
    U8,
    U16,
    U32,
    F32,
}

impl From<DataTypeArg> for DataType {
    fn from(arg: DataTypeArg) -> Self {
        match arg {
            DataTypeArg::U8 => DataType::UInt8,
            DataTypeArg::U16 => DataType::UInt16,
            DataTypeArg::U32 => DataType::UInt32,
            DataTypeArg::F32 => DataType::Float32,
        }
    }
}

// =============================================================================
// Per-command configuration
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct TypesConfig {
    #[command(flatten)]
    pub common: CommonConfig,
}

#[derive(Args, Debug, Clone)]
pub struct MetadataConfig {
    #[command(flatten)]
    pub open: OpenConfig,

    /// Emit JSON instead of the human-readable dump.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParamsConfig {
    #[command(flatten)]
    pub open: OpenConfig,

    /// Emit JSON instead of the human-readable dump.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HistogramConfig {
    #[command(flatten)]
    pub open: OpenConfig,

    /// Timepoint index.
    #[arg(short = 't', long, default_value_t = 0)]
    pub time: u32,

    /// Channel index.
    #[arg(short = 'c', long, default_value_t = 0)]
    pub channel: u32,

    /// Resolution level index.
    #[arg(short = 'r', long, default_value_t = 0)]
    pub resolution: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ThumbnailConfig {
    #[command(flatten)]
    pub open: OpenConfig,

    /// Output PNG path.
    #[arg(short = 'o', long)]
    pub output: PathBuf,
}
