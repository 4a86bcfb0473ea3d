//! Pixel engine CLI tool
//!
//! Command-line front end over the library: decodes an image file, runs one
//! engine operation and writes the result back to disk.

use super::config::CliConfigBuilder;
use crate::{
    compress::{compress, compress_to_size},
    encoders::encoder_for,
    matting::{self, ColorKeyParams, GrabCutParams, WandParams},
    tracing_config::spans,
    transform::{self, CropRect, FlipDirection, ResizeFilter, RotateAngle},
    types::{Quality, RasterView, RectSeed, SegmentationMask},
    utils::ColorParser,
    CompressionFormat,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::RgbaImage;
use instant::Instant;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Raster matting and compression tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "imgly-pixelcut")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Encoder settings JSON file (flags override individual values)
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Console, global = true)]
    pub log_format: LogFormat,

    /// Also append logs to this file (needs the tracing-files feature)
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored human-readable lines
    Console,
    /// Plain lines without timestamps
    Compact,
    /// One JSON object per event (needs the tracing-json feature)
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make pixels close to a solid color transparent
    Key(KeyArgs),
    /// Select a region by color similarity to a seed pixel
    Wand(WandArgs),
    /// Segment the foreground inside a rectangle
    Grabcut(GrabCutArgs),
    /// Encode at a fixed quality
    Compress(CompressArgs),
    /// Encode at the highest quality that fits a byte budget
    Fit(FitArgs),
    /// Crop, rotate, flip or resize
    Transform(TransformArgs),
}

/// Input and output paths shared by every command
#[derive(Args, Debug)]
pub struct IoArgs {
    /// Input image
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Key color as #RRGGBB or #RGB
    #[arg(short, long, default_value = "#ffffff")]
    pub color: String,

    /// Maximum RGB distance keyed out completely
    #[arg(short, long, default_value_t = 0.0)]
    pub tolerance: f32,

    /// Width of the alpha ramp beyond the tolerance
    #[arg(long, default_value_t = 0.0)]
    pub feather: f32,
}

/// What to write for selection commands
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum MaskMode {
    /// Grayscale mask image
    #[default]
    Mask,
    /// Input image with the mask applied as alpha
    Cutout,
}

#[derive(Args, Debug)]
pub struct WandArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Seed column
    #[arg(short = 'x', long)]
    pub seed_x: u32,

    /// Seed row
    #[arg(short = 'y', long)]
    pub seed_y: u32,

    /// Maximum RGB distance to the seed color
    #[arg(short, long, default_value_t = 32.0)]
    pub tolerance: f32,

    /// Select matching pixels anywhere, not only the seed's region
    #[arg(long)]
    pub global: bool,

    #[arg(long, value_enum, default_value_t = MaskMode::Mask)]
    pub mode: MaskMode,
}

#[derive(Args, Debug)]
pub struct GrabCutArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Seed rectangle as x,y,width,height (x and y may be negative)
    #[arg(short, long, value_parser = parse_rect, allow_hyphen_values = true)]
    pub rect: RectSeed,

    /// Refinement rounds (1-20)
    #[arg(short, long, default_value_t = matting::grabcut::DEFAULT_ITERATIONS)]
    pub iterations: u32,

    #[arg(long, value_enum, default_value_t = MaskMode::Cutout)]
    pub mode: MaskMode,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliFormat {
    Jpeg,
    Webp,
    Png,
}

impl From<CliFormat> for CompressionFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Jpeg => Self::Jpeg,
            CliFormat::Webp => Self::WebP,
            CliFormat::Png => Self::Png,
        }
    }
}

/// Per-format encoder overrides
#[derive(Args, Debug, Default)]
pub struct EncoderArgs {
    /// Progressive JPEG scans
    #[arg(long)]
    pub jpeg_progressive: bool,

    /// Disable optimized JPEG Huffman tables
    #[arg(long)]
    pub jpeg_no_optimize: bool,

    /// WebP method (0 = fast, 6 = slowest)
    #[arg(long)]
    pub webp_method: Option<u8>,
}

#[derive(Args, Debug)]
pub struct CompressArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Output format [default: from the output extension]
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Quality (1-100)
    #[arg(short, long, default_value_t = 85)]
    pub quality: u8,

    #[command(flatten)]
    pub encoder: EncoderArgs,
}

#[derive(Args, Debug)]
pub struct FitArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Output format [default: from the output extension]
    #[arg(short, long, value_enum)]
    pub format: Option<CliFormat>,

    /// Byte budget for the encoded output
    #[arg(short, long)]
    pub target_size: usize,

    #[command(flatten)]
    pub encoder: EncoderArgs,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(subcommand)]
    pub operation: TransformOp,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliFlip {
    Horizontal,
    Vertical,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<CliFilter> for ResizeFilter {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => Self::Nearest,
            CliFilter::Triangle => Self::Triangle,
            CliFilter::CatmullRom => Self::CatmullRom,
            CliFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TransformOp {
    /// Extract a rectangle
    Crop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Rotate clockwise by a multiple of 90 degrees
    Rotate { degrees: u32 },
    /// Mirror the image
    Flip {
        #[arg(value_enum)]
        direction: CliFlip,
    },
    /// Resample to new dimensions
    Resize {
        width: u32,
        height: u32,
        #[arg(long, value_enum, default_value_t = CliFilter::Triangle)]
        filter: CliFilter,
    },
}

fn parse_rect(value: &str) -> std::result::Result<RectSeed, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, width, height] = parts.as_slice() else {
        return Err(format!(
            "expected x,y,width,height with 4 values, got {}",
            parts.len()
        ));
    };
    let coordinate = |s: &str| s.parse::<i64>().map_err(|e| format!("invalid coordinate '{}': {}", s, e));
    let extent = |s: &str| s.parse::<u32>().map_err(|e| format!("invalid extent '{}': {}", s, e));
    Ok(RectSeed::new(
        coordinate(x)?,
        coordinate(y)?,
        extent(width)?,
        extent(height)?,
    ))
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = CliConfigBuilder::tracing_config(&cli)?
        .init()
        .context("Failed to initialize tracing")?;
    run(&cli)
}

/// Execute a parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    let start = Instant::now();
    let (name, io) = match &cli.command {
        Command::Key(args) => ("key", &args.io),
        Command::Wand(args) => ("wand", &args.io),
        Command::Grabcut(args) => ("grabcut", &args.io),
        Command::Compress(args) => ("compress", &args.io),
        Command::Fit(args) => ("fit", &args.io),
        Command::Transform(args) => ("transform", &args.io),
    };
    let _span = spans::file_processing(name, &io.input).entered();

    let image = load_rgba(&io.input)?;
    let (width, height) = image.dimensions();
    let raster = RasterView::new(image.as_raw(), width, height)
        .context("Input image has unusable dimensions")?;
    debug!(width, height, "decoded input");

    match &cli.command {
        Command::Key(args) => run_key(raster, args)?,
        Command::Wand(args) => run_wand(raster, args)?,
        Command::Grabcut(args) => run_grabcut(raster, args)?,
        Command::Compress(args) => run_compress(cli, raster, args)?,
        Command::Fit(args) => run_fit(cli, raster, args)?,
        Command::Transform(args) => run_transform(raster, args)?,
    }

    info!(
        command = name,
        output = %io.output.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?
        .to_rgba8())
}

fn save_rgba(data: Vec<u8>, width: u32, height: u32, path: &Path) -> Result<()> {
    let image = RgbaImage::from_raw(width, height, data)
        .context("Result buffer does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_selection(
    raster: RasterView<'_>,
    mask: &SegmentationMask,
    mode: MaskMode,
    path: &Path,
) -> Result<()> {
    match mode {
        MaskMode::Mask => mask
            .to_image()?
            .save(path)
            .with_context(|| format!("Failed to write mask {}", path.display())),
        MaskMode::Cutout => {
            let mut image = raster.to_rgba_image()?;
            mask.apply_to_image(&mut image)?;
            image
                .save(path)
                .with_context(|| format!("Failed to write cutout {}", path.display()))
        },
    }
}

fn run_key(raster: RasterView<'_>, args: &KeyArgs) -> Result<()> {
    let target = ColorParser::parse_hex(&args.color).context("Invalid --color")?;
    let params = ColorKeyParams::new(target, args.tolerance).with_feather(args.feather);
    let keyed = matting::remove_color(raster, &params).context("Color keying failed")?;

    let transparent = keyed.chunks_exact(4).filter(|p| p[3] == 0).count();
    info!(
        transparent,
        total = raster.pixel_count(),
        "keyed {} with tolerance {}",
        target,
        args.tolerance
    );
    save_rgba(keyed, raster.width(), raster.height(), &args.io.output)
}

fn run_wand(raster: RasterView<'_>, args: &WandArgs) -> Result<()> {
    let mut params = WandParams::new(args.seed_x, args.seed_y, args.tolerance);
    if args.global {
        params = params.global();
    }
    let mask = matting::select(raster, &params).context("Magic wand selection failed")?;
    info!(selected = mask.selected_count(), "magic wand selection");
    write_selection(raster, &mask, args.mode, &args.io.output)
}

fn run_grabcut(raster: RasterView<'_>, args: &GrabCutArgs) -> Result<()> {
    let params = GrabCutParams::new(args.rect).with_iterations(args.iterations);
    let mask = matting::segment(raster, &params).context("GrabCut segmentation failed")?;
    let selected = mask.selected_count();
    if selected == 0 {
        warn!("segmentation selected no foreground pixels");
    }
    info!(selected, "grabcut segmentation");
    write_selection(raster, &mask, args.mode, &args.io.output)
}

fn resolve_format(format: Option<CliFormat>, output: &Path) -> Result<CompressionFormat> {
    if let Some(format) = format {
        return Ok(format.into());
    }
    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .context("Cannot infer format: output has no extension, pass --format")?;
    extension
        .parse()
        .with_context(|| format!("Cannot infer format from extension '{}'", extension))
}

fn run_compress(cli: &Cli, raster: RasterView<'_>, args: &CompressArgs) -> Result<()> {
    let format = resolve_format(args.format, &args.io.output)?;
    let settings = CliConfigBuilder::encoder_settings(cli, &args.encoder)?;
    let quality = Quality::new(args.quality).context("Invalid --quality")?;

    let bytes = compress(raster, format, quality, &settings)
        .with_context(|| format!("{} encoding failed", format))?;
    info!(%format, quality = quality.get(), size = bytes.len(), "compressed");
    write_bytes(&bytes, &args.io.output)
}

fn run_fit(cli: &Cli, raster: RasterView<'_>, args: &FitArgs) -> Result<()> {
    let format = resolve_format(args.format, &args.io.output)?;
    let settings = CliConfigBuilder::encoder_settings(cli, &args.encoder)?;
    let encoder = encoder_for(format, &settings)?;

    let result = compress_to_size(raster, args.target_size, encoder.as_ref())
        .with_context(|| format!("Target-size search for {} failed", format))?;
    if !result.fits(args.target_size) {
        warn!(
            size = result.bytes.len(),
            target = args.target_size,
            "quality 1 still exceeds the target size"
        );
    }
    info!(
        %format,
        quality = result.quality.map(Quality::get),
        size = result.bytes.len(),
        attempts = result.attempts,
        outcome = %result.outcome,
        "fitted"
    );
    write_bytes(&result.bytes, &args.io.output)
}

fn run_transform(raster: RasterView<'_>, args: &TransformArgs) -> Result<()> {
    let image = match args.operation {
        TransformOp::Crop {
            x,
            y,
            width,
            height,
        } => transform::crop(raster, CropRect::new(x, y, width, height))?,
        TransformOp::Rotate { degrees } => {
            transform::rotate(raster, RotateAngle::from_degrees(degrees)?)?
        },
        TransformOp::Flip { direction } => {
            let direction = match direction {
                CliFlip::Horizontal => FlipDirection::Horizontal,
                CliFlip::Vertical => FlipDirection::Vertical,
            };
            transform::flip(raster, direction)?
        },
        TransformOp::Resize {
            width,
            height,
            filter,
        } => transform::resize(raster, width, height, filter.into())?,
    };
    let (width, height) = image.dimensions();
    info!(width, height, "transformed");
    save_rgba(image.into_raw(), width, height, &args.io.output)
}
