//! JPEG encoder
//!
//! Backed by the `jpeg-encoder` crate, which exposes the progressive and
//! optimized-Huffman switches that `image`'s JPEG codec does not. The alpha
//! channel is ignored.

use super::{encode_error, RasterEncoder};
use crate::{
    config::{CompressionFormat, JpegOptions},
    error::Result,
    types::{Quality, RasterView},
};
use jpeg_encoder::{ColorType, Encoder};
use tracing::{instrument, trace};

/// JPEG encoder with fixed strategy options
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder {
    options: JpegOptions,
}

impl JpegEncoder {
    #[must_use]
    pub fn new(options: JpegOptions) -> Self {
        Self { options }
    }

    fn dimension(value: u32) -> Result<u16> {
        u16::try_from(value).map_err(|_| {
            encode_error(
                CompressionFormat::Jpeg,
                format!("dimension {} exceeds the JPEG limit of {}", value, u16::MAX),
            )
        })
    }
}

impl RasterEncoder for JpegEncoder {
    fn format(&self) -> CompressionFormat {
        CompressionFormat::Jpeg
    }

    #[instrument(level = "trace", skip_all, fields(quality = quality.get()))]
    fn encode(&self, raster: RasterView<'_>, quality: Quality) -> Result<Vec<u8>> {
        let width = Self::dimension(raster.width())?;
        let height = Self::dimension(raster.height())?;

        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, quality.get());
        encoder.set_progressive(self.options.progressive);
        encoder.set_optimized_huffman_tables(self.options.optimize);
        encoder
            .encode(raster.data(), width, height, ColorType::Rgba)
            .map_err(|e| encode_error(CompressionFormat::Jpeg, e))?;

        trace!(bytes = buffer.len(), "JPEG encoded");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy(width: u32, height: u32) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| {
                let v = (i.wrapping_mul(2_654_435_761) >> 24) as u8;
                [v, v.wrapping_mul(3), v ^ 0x5a, 255]
            })
            .collect()
    }

    #[test]
    fn test_jpeg_signature() {
        let data = vec![200u8; 4 * 4 * 4];
        let raster = RasterView::new(&data, 4, 4).unwrap();
        let bytes = JpegEncoder::default()
            .encode(raster, Quality::new(80).unwrap())
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let data = noisy(64, 64);
        let raster = RasterView::new(&data, 64, 64).unwrap();
        let encoder = JpegEncoder::default();
        let high = encoder.encode(raster, Quality::new(95).unwrap()).unwrap();
        let low = encoder.encode(raster, Quality::new(10).unwrap()).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_progressive_output_decodes() {
        let data = noisy(32, 32);
        let raster = RasterView::new(&data, 32, 32).unwrap();
        let encoder = JpegEncoder::new(JpegOptions {
            optimize: false,
            progressive: true,
        });
        let bytes = encoder.encode(raster, Quality::new(75).unwrap()).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));
    }

    #[test]
    fn test_oversized_dimension_rejected() {
        assert!(JpegEncoder::dimension(70_000).is_err());
        assert_eq!(JpegEncoder::dimension(65_535).unwrap(), 65_535);
    }
}
