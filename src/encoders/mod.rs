//! Format encoders for RGBA rasters
//!
//! Every format sits behind [`RasterEncoder`], so the size-targeted search in
//! [`crate::compress`] can drive any of them without knowing the format:
//!
//! - **JPEG**: baseline or progressive, optional optimized Huffman tables;
//!   alpha is dropped
//! - **WebP**: lossy with alpha through libwebp (`webp-support` feature)
//! - **PNG**: lossless; quality only selects the deflate effort
//!
//! # Usage
//!
//! ```rust
//! use imgly_pixelcut::{encoders::encoder_for, CompressionFormat, EncoderSettings, Quality, RasterView};
//!
//! # fn example() -> imgly_pixelcut::Result<()> {
//! let pixels = vec![255u8; 8 * 8 * 4];
//! let raster = RasterView::new(&pixels, 8, 8)?;
//! let encoder = encoder_for(CompressionFormat::Png, &EncoderSettings::default())?;
//! let png = encoder.encode(raster, Quality::MAX)?;
//! assert!(png.starts_with(b"\x89PNG"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod jpeg_encoder;
pub mod png_encoder;
#[cfg(feature = "webp-support")]
pub mod webp_encoder;

pub use jpeg_encoder::JpegEncoder;
pub use png_encoder::PngEncoder;
#[cfg(feature = "webp-support")]
pub use webp_encoder::WebPEncoder;

use crate::{
    config::{CompressionFormat, EncoderSettings},
    error::{PixelError, Result},
    types::{Quality, RasterView},
    utils::BufferValidator,
};

/// Encode an RGBA raster at a given quality
pub trait RasterEncoder: Send + Sync {
    /// Format produced by this encoder
    fn format(&self) -> CompressionFormat;

    /// Whether `quality` trades size for fidelity
    ///
    /// Encoders without a quality axis may still read `quality` as an effort
    /// hint, but output size is not expected to shrink with it.
    fn has_quality_axis(&self) -> bool {
        self.format().is_lossy()
    }

    /// Encode the whole raster
    ///
    /// # Errors
    /// - Format encoder failure, reported as [`PixelError::Encode`]
    fn encode(&self, raster: RasterView<'_>, quality: Quality) -> Result<Vec<u8>>;
}

/// Build the encoder for `format` with per-format `settings`
///
/// # Errors
/// - `UnsupportedFormat` when the format was not compiled in
/// - `InvalidParameter` when `settings` fail validation
pub fn encoder_for(
    format: CompressionFormat,
    settings: &EncoderSettings,
) -> Result<Box<dyn RasterEncoder>> {
    settings.validate()?;
    match format {
        CompressionFormat::Jpeg => Ok(Box::new(JpegEncoder::new(settings.jpeg))),
        CompressionFormat::Png => Ok(Box::new(PngEncoder::new(settings.png))),
        #[cfg(feature = "webp-support")]
        CompressionFormat::WebP => Ok(Box::new(WebPEncoder::new(settings.webp))),
        #[cfg(not(feature = "webp-support"))]
        CompressionFormat::WebP => Err(PixelError::unsupported_format(
            "webp (built without the webp-support feature)",
        )),
    }
}

/// Encode into a caller-provided buffer, returning the bytes written
///
/// # Errors
/// - Encoder failure
/// - `OutputBufferTooSmall` when the encoded stream does not fit
pub fn encode_into(
    encoder: &dyn RasterEncoder,
    raster: RasterView<'_>,
    quality: Quality,
    output: &mut [u8],
) -> Result<usize> {
    let encoded = encoder.encode(raster, quality)?;
    BufferValidator::copy_into_output(output, &encoded)
}

/// Map a foreign encoder error into [`PixelError::Encode`]
pub(crate) fn encode_error(format: CompressionFormat, message: impl std::fmt::Display) -> PixelError {
    let name = match format {
        CompressionFormat::Jpeg => "JPEG",
        CompressionFormat::WebP => "WebP",
        CompressionFormat::Png => "PNG",
    };
    PixelError::encode(name, message.to_string())
}
