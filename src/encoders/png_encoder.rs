//! Lossless PNG encoder
//!
//! Quality does not change the pixels, only how hard deflate works.

use super::{encode_error, RasterEncoder};
use crate::{
    config::{CompressionFormat, PngCompression, PngOptions},
    error::Result,
    types::{Quality, RasterView},
};
use image::{
    codecs::png::{CompressionType, FilterType, PngEncoder as ImagePngEncoder},
    ExtendedColorType, ImageEncoder,
};
use tracing::{instrument, trace};

/// PNG encoder writing 8-bit RGBA
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder {
    options: PngOptions,
}

impl PngEncoder {
    #[must_use]
    pub fn new(options: PngOptions) -> Self {
        Self { options }
    }
}

impl From<PngCompression> for CompressionType {
    fn from(effort: PngCompression) -> Self {
        match effort {
            PngCompression::Fast => Self::Fast,
            PngCompression::Default => Self::Default,
            PngCompression::Best => Self::Best,
        }
    }
}

impl RasterEncoder for PngEncoder {
    fn format(&self) -> CompressionFormat {
        CompressionFormat::Png
    }

    #[instrument(level = "trace", skip_all, fields(quality = quality.get()))]
    fn encode(&self, raster: RasterView<'_>, quality: Quality) -> Result<Vec<u8>> {
        let effort = self.options.effort_for(quality);
        let mut buffer = Vec::new();
        ImagePngEncoder::new_with_quality(&mut buffer, effort.into(), FilterType::Adaptive)
            .write_image(
                raster.data(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| encode_error(CompressionFormat::Png, e))?;

        trace!(bytes = buffer.len(), ?effort, "PNG encoded");
        Ok(buffer)
    }
}
