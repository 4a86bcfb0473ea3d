//! Quality-parameterized compression and size-targeted search

mod target_size;

pub use target_size::{
    compress_to_size, compress_to_size_into, CompressionReport, SearchOutcome, TargetSizeResult,
    MAX_SEARCH_PROBES,
};

use crate::{
    config::{CompressionFormat, EncoderSettings},
    encoders::{encode_into, encoder_for},
    error::Result,
    types::{Quality, RasterView},
};
use tracing::{debug, instrument};

/// Encode `raster` as `format` at a fixed quality
///
/// # Errors
/// - `UnsupportedFormat` when the format was not compiled in
/// - `InvalidParameter` when `settings` fail validation
/// - Encoder failure
pub fn compress(
    raster: RasterView<'_>,
    format: CompressionFormat,
    quality: Quality,
    settings: &EncoderSettings,
) -> Result<Vec<u8>> {
    encoder_for(format, settings)?.encode(raster, quality)
}

/// Encode `raster` as `format` into a caller buffer, returning the bytes written
///
/// # Errors
/// As [`compress`], plus `OutputBufferTooSmall` when the stream does not fit
#[instrument(
    skip_all,
    fields(
        width = raster.width(),
        height = raster.height(),
        format = %format,
        quality = quality.get()
    )
)]
pub fn compress_into(
    raster: RasterView<'_>,
    format: CompressionFormat,
    quality: Quality,
    settings: &EncoderSettings,
    output: &mut [u8],
) -> Result<usize> {
    let encoder = encoder_for(format, settings)?;
    let written = encode_into(encoder.as_ref(), raster, quality, output)?;
    debug!(bytes = written, "compressed");
    Ok(written)
}
