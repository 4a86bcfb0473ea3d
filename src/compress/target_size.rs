//! Size-targeted compression
//!
//! Finds the highest quality whose encoded size fits a byte budget. Encoded
//! size is assumed to be non-decreasing in quality, which holds well enough
//! for JPEG and WebP that a bounded binary search lands on or next to the
//! optimum.

use crate::{
    encoders::RasterEncoder,
    error::Result,
    types::{Quality, RasterView},
    utils::{BufferValidator, NumericValidator},
};
use instant::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Binary search probes after the initial quality-100 probe
///
/// Seven halvings cover the 99 remaining quality levels.
pub const MAX_SEARCH_PROBES: u32 = 7;

/// How the search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Output fits the target at the reported quality
    WithinTarget,
    /// Even quality 1 exceeds the target; the quality-1 output is returned
    FloorExceedsTarget,
    /// Format has no quality axis; a single lossless encode was made
    Lossless,
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WithinTarget => write!(f, "within target"),
            Self::FloorExceedsTarget => write!(f, "quality floor exceeds target"),
            Self::Lossless => write!(f, "lossless"),
        }
    }
}

/// Encoded output of a size-targeted search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSizeResult {
    pub bytes: Vec<u8>,
    /// Quality used; `None` for lossless formats
    pub quality: Option<Quality>,
    pub outcome: SearchOutcome,
    /// Number of encodes performed
    pub attempts: u32,
}

impl TargetSizeResult {
    /// Whether the output respects the byte budget
    #[must_use]
    pub fn fits(&self, target_size: usize) -> bool {
        self.bytes.len() <= target_size
    }
}

/// Summary of a size-targeted encode written into a caller buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionReport {
    pub bytes_written: usize,
    pub quality: Option<Quality>,
    pub outcome: SearchOutcome,
}

/// Search for the highest quality whose output is at most `target_size` bytes
///
/// Quality 100 is tried first. If it does not fit, qualities 1..=99 are
/// binary searched for at most [`MAX_SEARCH_PROBES`] encodes. When nothing
/// fits, the quality-1 output is returned flagged
/// [`SearchOutcome::FloorExceedsTarget`]. Encoders without a quality axis are
/// encoded once and reported as [`SearchOutcome::Lossless`].
///
/// # Errors
/// - `InvalidParameter` when `target_size` is zero
/// - Encoder failure, which aborts the search
#[instrument(
    skip_all,
    fields(
        width = raster.width(),
        height = raster.height(),
        format = %encoder.format(),
        target_size = target_size
    )
)]
pub fn compress_to_size(
    raster: RasterView<'_>,
    target_size: usize,
    encoder: &dyn RasterEncoder,
) -> Result<TargetSizeResult> {
    NumericValidator::validate_positive(target_size, "target size")?;
    let start = Instant::now();

    if !encoder.has_quality_axis() {
        let bytes = encoder.encode(raster, Quality::MAX)?;
        debug!(size = bytes.len(), "lossless encode, no quality search");
        return Ok(TargetSizeResult {
            bytes,
            quality: None,
            outcome: SearchOutcome::Lossless,
            attempts: 1,
        });
    }

    let mut attempts = 1;
    let ceiling = encoder.encode(raster, Quality::MAX)?;
    debug!(quality = 100, size = ceiling.len(), "probe");
    if ceiling.len() <= target_size {
        return Ok(TargetSizeResult {
            bytes: ceiling,
            quality: Some(Quality::MAX),
            outcome: SearchOutcome::WithinTarget,
            attempts,
        });
    }

    let mut low: u8 = 1;
    let mut high: u8 = 99;
    let mut best: Option<(Quality, Vec<u8>)> = None;
    let mut floor: Option<Vec<u8>> = None;
    let mut probes = 0;

    while low <= high && probes < MAX_SEARCH_PROBES {
        let mid = low + (high - low) / 2;
        let quality = Quality::new(mid)?;
        let bytes = encoder.encode(raster, quality)?;
        attempts += 1;
        probes += 1;

        let fits = bytes.len() <= target_size;
        debug!(quality = mid, size = bytes.len(), fits, "probe");

        if fits {
            best = Some((quality, bytes));
            low = mid + 1;
        } else {
            if mid == 1 {
                floor = Some(bytes);
                break;
            }
            high = mid - 1;
        }
    }

    let result = match best {
        Some((quality, bytes)) => TargetSizeResult {
            bytes,
            quality: Some(quality),
            outcome: SearchOutcome::WithinTarget,
            attempts,
        },
        None => {
            let bytes = match floor {
                Some(bytes) => bytes,
                None => {
                    attempts += 1;
                    encoder.encode(raster, Quality::MIN)?
                }
            };
            TargetSizeResult {
                bytes,
                quality: Some(Quality::MIN),
                outcome: SearchOutcome::FloorExceedsTarget,
                attempts,
            }
        }
    };

    debug!(
        quality = result.quality.map(Quality::get),
        size = result.bytes.len(),
        attempts = result.attempts,
        outcome = %result.outcome,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "target size search complete"
    );
    Ok(result)
}

/// [`compress_to_size`] writing into a caller buffer
///
/// # Errors
/// As [`compress_to_size`], plus `OutputBufferTooSmall` when the chosen
/// output does not fit `output`
pub fn compress_to_size_into(
    raster: RasterView<'_>,
    target_size: usize,
    encoder: &dyn RasterEncoder,
    output: &mut [u8],
) -> Result<CompressionReport> {
    let result = compress_to_size(raster, target_size, encoder)?;
    let bytes_written = BufferValidator::copy_into_output(output, &result.bytes)?;
    Ok(CompressionReport {
        bytes_written,
        quality: result.quality,
        outcome: result.outcome,
    })
}
