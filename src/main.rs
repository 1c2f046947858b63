//! ims-reader - inspect images through the ImarisReader native library.
//!
//! This binary exercises the binding end to end: discovery, metadata,
//! parameters, histograms and thumbnail export.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ims_reader::{
    config::{
        Cli, Command, HistogramConfig, MetadataConfig, OpenConfig, ParamsConfig, ThumbnailConfig,
        TypesConfig,
    },
    DataType, Histogram, ImageMetadata, ImageReader, IndexTcr, Parameters, PixelType,
    ReaderLibrary, ReaderOptions, Thumbnail,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Types(config) => run_types(config),
        Command::Metadata(config) => run_metadata(config),
        Command::Params(config) => run_params(config),
        Command::Histogram(config) => run_histogram(config),
        Command::Thumbnail(config) => run_thumbnail(config),
    }
}

// =============================================================================
// Shared plumbing
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ims_reader=debug"
    } else {
        "ims_reader=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load the native library from the configured path or the platform default.
fn load_library(library: Option<&PathBuf>) -> Result<Arc<ReaderLibrary>, String> {
    let loaded = match library {
        Some(path) => ReaderLibrary::load(path),
        None => ReaderLibrary::load_default(),
    };
    loaded.map_err(|e| format!("failed to load the native reader library: {e}"))
}

/// Pixel data type of the selected image: the explicit CLI choice, or the
/// file's own answer via discovery.
fn resolve_data_type(library: &ReaderLibrary, config: &OpenConfig) -> Result<DataType, String> {
    if let Some(arg) = config.data_type {
        return Ok(arg.into());
    }

    let types = library
        .file_data_types(&config.common.file, config.common.swmr)
        .map_err(|e| format!("data type discovery failed: {e}"))?;
    types
        .get(config.image_index as usize)
        .copied()
        .ok_or_else(|| {
            format!(
                "file has {} image(s), no image index {}",
                types.len(),
                config.image_index
            )
        })
}

fn open_reader<T: PixelType>(
    library: &Arc<ReaderLibrary>,
    config: &OpenConfig,
) -> Result<ImageReader<T>, String> {
    ImageReader::open(
        library,
        &config.common.file,
        config.image_index,
        ReaderOptions {
            swmr: config.common.swmr,
        },
    )
    .map_err(|e| e.to_string())
}

/// Expand a generic call over the runtime data type.
macro_rules! for_data_type {
    ($data_type:expr, $generic:ident($($args:expr),*)) => {
        match $data_type {
            DataType::UInt8 => $generic::<u8>($($args),*),
            DataType::UInt16 => $generic::<u16>($($args),*),
            DataType::UInt32 => $generic::<u32>($($args),*),
            DataType::Float32 => $generic::<f32>($($args),*),
        }
    };
}

// =============================================================================
// Types command
// =============================================================================

fn run_types(config: TypesConfig) -> ExitCode {
    init_logging(config.common.verbose);

    let library = match load_library(config.common.library.as_ref()) {
        Ok(library) => library,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match library.file_data_types(&config.common.file, config.common.swmr) {
        Ok(types) => {
            for (index, data_type) in types.iter().enumerate() {
                println!("image {index}: {data_type}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("data type discovery failed: {e}");
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Metadata command
// =============================================================================

fn run_metadata(config: MetadataConfig) -> ExitCode {
    init_logging(config.open.common.verbose);

    let result = load_library(config.open.common.library.as_ref()).and_then(|library| {
        let data_type = resolve_data_type(&library, &config.open)?;
        for_data_type!(data_type, read_metadata_for(&library, &config.open))
    });

    match result {
        Ok(metadata) => {
            print_metadata(&metadata, config.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn read_metadata_for<T: PixelType>(
    library: &Arc<ReaderLibrary>,
    config: &OpenConfig,
) -> Result<ImageMetadata, String> {
    let reader: ImageReader<T> = open_reader(library, config)?;
    reader.read_metadata().map_err(|e| e.to_string())
}

fn print_metadata(metadata: &ImageMetadata, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(metadata).unwrap());
        return;
    }

    println!("resolutions: {}", metadata.resolution_count());
    for (level, (image, block)) in metadata
        .image_size_per_resolution
        .iter()
        .zip(&metadata.block_size_per_resolution)
        .enumerate()
    {
        println!(
            "  level {level}: {}x{}x{} c={} t={} (block {}x{}x{} c={} t={})",
            image.x, image.y, image.z, image.c, image.t, block.x, block.y, block.z, block.c,
            block.t
        );
    }

    let extent = &metadata.extent;
    println!(
        "extent: x {}..{}  y {}..{}  z {}..{}",
        extent.min_x, extent.max_x, extent.min_y, extent.max_y, extent.min_z, extent.max_z
    );

    println!("time points: {}", metadata.time_point_count());
    for (index, time) in metadata.time_points.iter().enumerate() {
        println!(
            "  t{index}: julian day {} + {} ns",
            time.julian_day, time.nanoseconds_of_day
        );
    }

    println!("channels: {}", metadata.channel_count());
    for (index, channel) in metadata.channel_colors.iter().enumerate() {
        match &channel.mode {
            ims_reader::ColorMode::BaseColor(color) => println!(
                "  c{index}: base color rgba({}, {}, {}, {})",
                color.red, color.green, color.blue, color.alpha
            ),
            ims_reader::ColorMode::Table(table) => {
                println!("  c{index}: color table with {} entries", table.len())
            }
        }
        println!(
            "       opacity {} range {}..{} gamma {}",
            channel.opacity, channel.range_min, channel.range_max, channel.gamma_correction
        );
    }

    println!("compression: {}", metadata.compression);
}

// =============================================================================
// Params command
// =============================================================================

fn run_params(config: ParamsConfig) -> ExitCode {
    init_logging(config.open.common.verbose);

    let result = load_library(config.open.common.library.as_ref()).and_then(|library| {
        let data_type = resolve_data_type(&library, &config.open)?;
        for_data_type!(data_type, read_params_for(&library, &config.open))
    });

    match result {
        Ok(params) => {
            print_params(&params, config.json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn read_params_for<T: PixelType>(
    library: &Arc<ReaderLibrary>,
    config: &OpenConfig,
) -> Result<Parameters, String> {
    let reader: ImageReader<T> = open_reader(library, config)?;
    reader.read_parameters().map_err(|e| e.to_string())
}

fn print_params(params: &Parameters, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(params).unwrap());
        return;
    }

    // Sections and keys come out of a hash map; sort for stable output.
    let mut sections: Vec<_> = params.sections().collect();
    sections.sort_by(|a, b| a.0.cmp(b.0));

    for (name, values) in sections {
        println!("[{name}]");
        let mut entries: Vec<_> = values.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            println!("  {key} = {value}");
        }
    }
}

// =============================================================================
// Histogram command
// =============================================================================

fn run_histogram(config: HistogramConfig) -> ExitCode {
    init_logging(config.open.common.verbose);

    let index = IndexTcr::new(config.time, config.channel, config.resolution);
    let result = load_library(config.open.common.library.as_ref()).and_then(|library| {
        let data_type = resolve_data_type(&library, &config.open)?;
        for_data_type!(data_type, read_histogram_for(&library, &config.open, index))
    });

    match result {
        Ok(histogram) => {
            println!(
                "t={} c={} r={}: min {} max {} ({} bins)",
                config.time,
                config.channel,
                config.resolution,
                histogram.min,
                histogram.max,
                histogram.bins.len()
            );
            for (bin, count) in histogram.bins.iter().enumerate() {
                if *count != 0 {
                    println!("  bin {bin}: {count}");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn read_histogram_for<T: PixelType>(
    library: &Arc<ReaderLibrary>,
    config: &OpenConfig,
    index: IndexTcr,
) -> Result<Histogram, String> {
    let reader: ImageReader<T> = open_reader(library, config)?;
    reader.read_histogram(index).map_err(|e| e.to_string())
}

// =============================================================================
// Thumbnail command
// =============================================================================

fn run_thumbnail(config: ThumbnailConfig) -> ExitCode {
    init_logging(config.open.common.verbose);

    let result = load_library(config.open.common.library.as_ref()).and_then(|library| {
        let data_type = resolve_data_type(&library, &config.open)?;
        for_data_type!(data_type, read_thumbnail_for(&library, &config.open))
    });

    let thumbnail = match result {
        Ok(thumbnail) => thumbnail,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let image =
        match image::RgbaImage::from_raw(thumbnail.width, thumbnail.height, thumbnail.rgba) {
            Some(image) => image,
            None => {
                error!(
                    "native thumbnail is inconsistent: {}x{} with a short pixel buffer",
                    thumbnail.width, thumbnail.height
                );
                return ExitCode::FAILURE;
            }
        };

    if let Err(e) = image.save(&config.output) {
        error!("failed to write {}: {e}", config.output.display());
        return ExitCode::FAILURE;
    }

    println!(
        "wrote {}x{} thumbnail to {}",
        image.width(),
        image.height(),
        config.output.display()
    );
    ExitCode::SUCCESS
}

fn read_thumbnail_for<T: PixelType>(
    library: &Arc<ReaderLibrary>,
    config: &OpenConfig,
) -> Result<Thumbnail, String> {
    let reader: ImageReader<T> = open_reader(library, config)?;
    reader.read_thumbnail().map_err(|e| e.to_string())
}
