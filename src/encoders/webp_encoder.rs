//! Lossy WebP encoder with alpha, through libwebp

use super::{encode_error, RasterEncoder};
use crate::{
    config::{CompressionFormat, WebPOptions},
    error::Result,
    types::{Quality, RasterView},
};
use tracing::{instrument, trace};

/// WebP encoder with fixed tuning options
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPEncoder {
    options: WebPOptions,
}

impl WebPEncoder {
    #[must_use]
    pub fn new(options: WebPOptions) -> Self {
        Self { options }
    }

    fn config(&self, quality: Quality) -> Result<webp::WebPConfig> {
        let mut config = webp::WebPConfig::new().map_err(|()| {
            encode_error(CompressionFormat::WebP, "failed to initialize WebPConfig")
        })?;
        config.lossless = 0;
        config.quality = f32::from(quality.get());
        config.method = i32::from(self.options.method);
        config.filter_strength = i32::from(self.options.filter_strength);
        config.filter_sharpness = i32::from(self.options.filter_sharpness);
        config.sns_strength = i32::from(self.options.sns_strength);
        Ok(config)
    }
}

impl RasterEncoder for WebPEncoder {
    fn format(&self) -> CompressionFormat {
        CompressionFormat::WebP
    }

    #[instrument(level = "trace", skip_all, fields(quality = quality.get()))]
    fn encode(&self, raster: RasterView<'_>, quality: Quality) -> Result<Vec<u8>> {
        let config = self.config(quality)?;
        let encoder = webp::Encoder::from_rgba(raster.data(), raster.width(), raster.height());
        let memory = encoder
            .encode_advanced(&config)
            .map_err(|e| encode_error(CompressionFormat::WebP, format!("{:?}", e)))?;

        let bytes = memory.to_vec();
        trace!(bytes = bytes.len(), "WebP encoded");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webp_keeps_alpha() {
        let mut data = Vec::new();
        for i in 0..16u8 {
            data.extend_from_slice(&[i * 10, 100, 200, if i % 2 == 0 { 255 } else { 0 }]);
        }
        let raster = RasterView::new(&data, 4, 4).unwrap();
        let bytes = WebPEncoder::default()
            .encode(raster, Quality::new(90).unwrap())
            .unwrap();

        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");

        let decoded = webp::Decoder::new(&bytes).decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
        assert!(decoded.is_alpha());
    }

    #[test]
    fn test_config_mirrors_options() {
        let encoder = WebPEncoder::new(WebPOptions {
            method: 6,
            filter_strength: 20,
            filter_sharpness: 3,
            sns_strength: 80,
        });
        let config = encoder.config(Quality::new(42).unwrap()).unwrap();
        assert_eq!(config.quality, 42.0);
        assert_eq!(config.method, 6);
        assert_eq!(config.filter_strength, 20);
        assert_eq!(config.filter_sharpness, 3);
        assert_eq!(config.sns_strength, 80);
    }
}
