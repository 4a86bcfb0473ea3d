#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # IMG.LY Pixelcut
//!
//! Client-side raster tools over raw RGBA8 buffers: solid-color keying,
//! magic wand selection, GrabCut foreground segmentation, quality-driven and
//! size-targeted compression, and geometric transforms.
//!
//! Every operation takes a row-major RGBA buffer plus its dimensions and is
//! a pure function of its inputs, so the same calls back the native API, the
//! command-line tool and the browser bindings.
//!
//! ## Features
//!
//! - **Color keying**: make pixels within an RGB distance of a color
//!   transparent, with an optional feathered edge
//! - **Magic wand**: flood-fill or global selection by color similarity
//! - **GrabCut**: iterative color-model and min-cut segmentation seeded by a
//!   rectangle
//! - **Compression**: JPEG, WebP and PNG at a fixed quality, or the highest
//!   quality that fits a byte budget
//! - **Transforms**: crop, quarter-turn rotation, flip and resize
//!
//! ## Quick Start
//!
//! ```rust
//! use imgly_pixelcut::{matting, ColorKeyParams, RasterView, Rgb};
//!
//! # fn example() -> imgly_pixelcut::Result<()> {
//! let pixels = vec![255u8; 4 * 4 * 4];
//! let raster = RasterView::new(&pixels, 4, 4)?;
//! let keyed = matting::remove_color(raster, &ColorKeyParams::new(Rgb::white(), 10.0))?;
//! assert!(keyed.chunks_exact(4).all(|p| p[3] == 0));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Buffer-Oriented Engine
//!
//! [`Engine`] exposes the same tools with scalar arguments and caller-owned
//! output buffers:
//!
//! ```rust
//! use imgly_pixelcut::CompressionFormat;
//!
//! # fn example() -> imgly_pixelcut::Result<()> {
//! let engine = imgly_pixelcut::init();
//! let pixels = vec![128u8; 16 * 16 * 4];
//! let mut output = vec![0u8; 64 * 1024];
//! let report = engine.compress_to_size(&pixels, 16, 16, 2_000, CompressionFormat::Jpeg, &mut output)?;
//! assert!(report.bytes_written <= 2_000);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface and tracing subscriber setup
//! - `webp-support` (default): lossy WebP through libwebp
//! - `parallel`: data-parallel per-pixel passes with rayon
//! - `wasm`: `wasm-bindgen` exports
//! - `tracing-json`, `tracing-files`: extra log formats and destinations for the CLI

#[cfg(feature = "cli")]
pub mod cli;
pub mod compress;
pub mod config;
pub mod encoders;
pub mod engine;
pub mod error;
pub mod matting;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod transform;
pub mod types;
pub mod utils;
#[cfg(feature = "wasm")]
pub mod wasm;

// Public API exports
pub use compress::{
    compress, compress_into, compress_to_size, compress_to_size_into, CompressionReport,
    SearchOutcome, TargetSizeResult, MAX_SEARCH_PROBES,
};
pub use config::{
    CompressionFormat, EncoderSettings, EncoderSettingsBuilder, JpegOptions, PngCompression,
    PngOptions, WebPOptions,
};
pub use encoders::{encoder_for, RasterEncoder};
pub use engine::{init, Engine};
pub use error::{BufferKind, ErrorKind, PixelError, Result};
pub use matting::{ColorKeyParams, GrabCutParams, WandParams};
pub use transform::{CropRect, FlipDirection, ResizeFilter, RotateAngle};
pub use types::{Quality, RasterView, RectSeed, Rgb, SegmentationMask};
pub use utils::{BufferValidator, ColorParser, NumericValidator};

#[cfg(feature = "cli")]
pub use tracing_config::{spans, TracingConfig, TracingFormat, TracingOutput};
