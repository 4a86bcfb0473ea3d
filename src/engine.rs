//! Process-wide engine handle
//!
//! [`Engine`] is the flat, buffer-in/buffer-out surface shared by the native
//! API and the WASM bindings. Every method validates the input raster first,
//! then parameters, then output capacity, and writes results into the
//! caller's buffer.

use crate::{
    compress::{self, CompressionReport},
    config::{CompressionFormat, EncoderSettings},
    encoders::encoder_for,
    error::Result,
    matting::{self, ColorKeyParams, GrabCutParams, WandParams},
    transform::{self, CropRect, FlipDirection, ResizeFilter, RotateAngle},
    types::{Quality, RasterView, RectSeed, Rgb},
};
use std::sync::OnceLock;
use tracing::debug;

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// Initialize the shared engine
///
/// Idempotent: every call returns the same handle, configured with default
/// [`EncoderSettings`].
pub fn init() -> &'static Engine {
    ENGINE.get_or_init(|| {
        debug!("pixel engine initialized");
        Engine::default()
    })
}

/// Stateless raster engine
///
/// Holds only immutable encoder settings, so it is `Send + Sync` and calls on
/// independent buffers never coordinate.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    settings: EncoderSettings,
}

impl Engine {
    /// Engine with custom encoder settings
    ///
    /// # Errors
    /// - `InvalidParameter` when `settings` fail validation
    pub fn with_settings(settings: EncoderSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    #[must_use]
    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Key out `target` into `output`, returning the bytes written
    #[allow(clippy::too_many_arguments)]
    pub fn remove_solid_color(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        target: [u8; 3],
        tolerance: f32,
        feather: f32,
        output: &mut [u8],
    ) -> Result<usize> {
        let raster = RasterView::new(input, width, height)?;
        let params = ColorKeyParams::new(Rgb::from(target), tolerance).with_feather(feather);
        matting::remove_color_into(raster, &params, output)
    }

    /// Magic wand selection into `mask_output`, returning the selected count
    #[allow(clippy::too_many_arguments)]
    pub fn magic_wand_select(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        seed_x: u32,
        seed_y: u32,
        tolerance: f32,
        connected: bool,
        mask_output: &mut [u8],
    ) -> Result<usize> {
        let raster = RasterView::new(input, width, height)?;
        let params = WandParams {
            seed_x,
            seed_y,
            tolerance,
            connected,
        };
        matting::select_into(raster, &params, mask_output)
    }

    /// GrabCut segmentation into `mask_output`, returning the foreground count
    #[allow(clippy::too_many_arguments)]
    pub fn grabcut_segment(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        rect: RectSeed,
        iterations: u32,
        mask_output: &mut [u8],
    ) -> Result<usize> {
        let raster = RasterView::new(input, width, height)?;
        let params = GrabCutParams::new(rect).with_iterations(iterations);
        matting::segment_into(raster, &params, mask_output)
    }

    fn compress_as(
        &self,
        format: CompressionFormat,
        input: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        output: &mut [u8],
    ) -> Result<usize> {
        let raster = RasterView::new(input, width, height)?;
        let quality = Quality::new(quality)?;
        compress::compress_into(raster, format, quality, &self.settings, output)
    }

    /// Encode as JPEG at `quality` (1-100)
    pub fn compress_jpeg(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        output: &mut [u8],
    ) -> Result<usize> {
        self.compress_as(CompressionFormat::Jpeg, input, width, height, quality, output)
    }

    /// Encode as lossy WebP at `quality` (1-100)
    pub fn compress_webp(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        output: &mut [u8],
    ) -> Result<usize> {
        self.compress_as(CompressionFormat::WebP, input, width, height, quality, output)
    }

    /// Encode as PNG; `quality` (1-100) only selects the deflate effort
    pub fn compress_png(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        quality: u8,
        output: &mut [u8],
    ) -> Result<usize> {
        self.compress_as(CompressionFormat::Png, input, width, height, quality, output)
    }

    /// Encode at the highest quality that fits `target_size` bytes
    pub fn compress_to_size(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        target_size: usize,
        format: CompressionFormat,
        output: &mut [u8],
    ) -> Result<CompressionReport> {
        let raster = RasterView::new(input, width, height)?;
        let encoder = encoder_for(format, &self.settings)?;
        compress::compress_to_size_into(raster, target_size, encoder.as_ref(), output)
    }

    pub fn crop_image(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        rect: CropRect,
        output: &mut [u8],
    ) -> Result<usize> {
        transform::crop_into(RasterView::new(input, width, height)?, rect, output)
    }

    /// Rotate clockwise; quarter turns swap the output dimensions
    pub fn rotate_image(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        angle: RotateAngle,
        output: &mut [u8],
    ) -> Result<usize> {
        transform::rotate_into(RasterView::new(input, width, height)?, angle, output)
    }

    pub fn flip_image(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        direction: FlipDirection,
        output: &mut [u8],
    ) -> Result<usize> {
        transform::flip_into(RasterView::new(input, width, height)?, direction, output)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn resize_image(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        new_width: u32,
        new_height: u32,
        filter: ResizeFilter,
        output: &mut [u8],
    ) -> Result<usize> {
        let raster = RasterView::new(input, width, height)?;
        transform::resize_into(raster, new_width, new_height, filter, output)
    }
}
