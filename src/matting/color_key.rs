//! Solid-color keying
//!
//! Pixels whose RGB distance to the key color is within `tolerance` become
//! fully transparent. With a non-zero `feather`, pixels in the distance band
//! `(tolerance, tolerance + feather)` get a linear alpha ramp from 0 up to
//! their original alpha. RGB channels are never modified.

use crate::{
    error::Result,
    types::{RasterView, Rgb, CHANNELS},
    utils::{BufferValidator, NumericValidator},
};
use instant::Instant;
use tracing::{debug, instrument};

/// Parameters for [`remove_color`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorKeyParams {
    /// Key color
    pub target: Rgb,
    /// Maximum RGB distance that is keyed out completely
    pub tolerance: f32,
    /// Width of the alpha ramp beyond `tolerance`, in distance units
    pub feather: f32,
}

impl ColorKeyParams {
    #[must_use]
    pub fn new(target: Rgb, tolerance: f32) -> Self {
        Self {
            target,
            tolerance,
            feather: 0.0,
        }
    }

    #[must_use]
    pub fn with_feather(mut self, feather: f32) -> Self {
        self.feather = feather;
        self
    }

    pub fn validate(&self) -> Result<()> {
        NumericValidator::validate_tolerance(self.tolerance)?;
        NumericValidator::validate_feather(self.feather)?;
        Ok(())
    }

    /// Alpha for a pixel of color `rgb` whose current alpha is `alpha`
    #[must_use]
    pub fn keyed_alpha(&self, rgb: Rgb, alpha: u8) -> u8 {
        let distance = f64::from(rgb.distance_sq(self.target)).sqrt();
        let tolerance = f64::from(self.tolerance);
        if distance <= tolerance {
            return 0;
        }

        let feather = f64::from(self.feather);
        if feather > 0.0 && distance < tolerance + feather {
            let ramp = (distance - tolerance) / feather;
            return (f64::from(alpha) * ramp).round().clamp(0.0, f64::from(alpha)) as u8;
        }

        alpha
    }
}

/// Key out `params.target`, returning a new raster
///
/// # Errors
/// - `InvalidParameter` for NaN or negative tolerance/feather
pub fn remove_color(raster: RasterView<'_>, params: &ColorKeyParams) -> Result<Vec<u8>> {
    let mut output = vec![0u8; raster.byte_len()];
    remove_color_into(raster, params, &mut output)?;
    Ok(output)
}

/// Key out `params.target` into a caller-provided buffer
///
/// Returns the number of bytes written, always the raster's byte length.
///
/// # Errors
/// - `InvalidParameter` for NaN or negative tolerance/feather
/// - `OutputBufferTooSmall` when `output` is shorter than the raster
#[instrument(
    skip_all,
    fields(
        width = raster.width(),
        height = raster.height(),
        target = %params.target,
        tolerance = params.tolerance,
        feather = params.feather
    )
)]
pub fn remove_color_into(
    raster: RasterView<'_>,
    params: &ColorKeyParams,
    output: &mut [u8],
) -> Result<usize> {
    params.validate()?;
    let written = BufferValidator::copy_into_output(output, raster.data())?;
    let start = Instant::now();

    if let Some(pixels) = output.get_mut(..written) {
        key_pixels(pixels, params);
    }

    debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "color key applied"
    );
    Ok(written)
}

fn key_pixel(pixel: &mut [u8], params: &ColorKeyParams) {
    let rgb = Rgb::from_pixel(pixel);
    if let Some(alpha) = pixel.get_mut(3) {
        *alpha = params.keyed_alpha(rgb, *alpha);
    }
}

#[cfg(not(feature = "parallel"))]
fn key_pixels(pixels: &mut [u8], params: &ColorKeyParams) {
    pixels
        .chunks_exact_mut(CHANNELS)
        .for_each(|pixel| key_pixel(pixel, params));
}

#[cfg(feature = "parallel")]
fn key_pixels(pixels: &mut [u8], params: &ColorKeyParams) {
    use rayon::prelude::*;

    pixels
        .par_chunks_exact_mut(CHANNELS)
        .for_each(|pixel| key_pixel(pixel, params));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        pixel.repeat((width * height) as usize)
    }

    #[test]
    fn test_white_raster_fully_keyed() {
        let data = solid(4, 4, [255, 255, 255, 255]);
        let raster = RasterView::new(&data, 4, 4).unwrap();
        let params = ColorKeyParams::new(Rgb::white(), 0.0);

        let output = remove_color(raster, &params).unwrap();

        for pixel in output.chunks_exact(4) {
            assert_eq!(pixel, &[255, 255, 255, 0]);
        }
    }

    #[test]
    fn test_original_alpha_preserved_outside_tolerance() {
        let data = vec![10, 10, 10, 77, 200, 0, 0, 0];
        let raster = RasterView::new(&data, 2, 1).unwrap();
        let params = ColorKeyParams::new(Rgb::white(), 5.0);

        let output = remove_color(raster, &params).unwrap();
        assert_eq!(output, data);
    }

    #[test]
    fn test_tolerance_zero_is_exact_match() {
        let data = vec![255, 255, 255, 255, 254, 255, 255, 255];
        let raster = RasterView::new(&data, 2, 1).unwrap();
        let output = remove_color(raster, &ColorKeyParams::new(Rgb::white(), 0.0)).unwrap();
        assert_eq!(output[3], 0);
        assert_eq!(output[7], 255);
    }

    #[test]
    fn test_tolerance_above_max_distance_keys_everything() {
        let data = vec![0, 0, 0, 255, 255, 255, 255, 255, 12, 200, 7, 128];
        let raster = RasterView::new(&data, 3, 1).unwrap();
        let params = ColorKeyParams::new(Rgb::black(), 442.0);
        let output = remove_color(raster, &params).unwrap();
        assert!(output.chunks_exact(4).all(|p| p[3] == 0));
    }

    #[test]
    fn test_feather_ramps_linearly() {
        let params = ColorKeyParams::new(Rgb::black(), 10.0).with_feather(10.0);
        // distance 15 sits halfway through the ramp
        assert_eq!(params.keyed_alpha(Rgb::new(15, 0, 0), 200), 100);
        assert_eq!(params.keyed_alpha(Rgb::new(10, 0, 0), 200), 0);
        assert_eq!(params.keyed_alpha(Rgb::new(20, 0, 0), 200), 200);
        assert_eq!(params.keyed_alpha(Rgb::new(25, 0, 0), 200), 200);
        // a transparent pixel stays transparent
        assert_eq!(params.keyed_alpha(Rgb::new(30, 0, 0), 0), 0);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let data = solid(1, 1, [0, 0, 0, 255]);
        let raster = RasterView::new(&data, 1, 1).unwrap();
        assert!(remove_color(raster, &ColorKeyParams::new(Rgb::black(), -1.0)).is_err());
        assert!(remove_color(
            raster,
            &ColorKeyParams::new(Rgb::black(), 1.0).with_feather(f32::NAN)
        )
        .is_err());
    }

    #[test]
    fn test_output_buffer_capacity() {
        let data = solid(2, 2, [0, 0, 0, 255]);
        let raster = RasterView::new(&data, 2, 2).unwrap();
        let params = ColorKeyParams::new(Rgb::black(), 0.0);

        let mut small = vec![0u8; 15];
        assert!(remove_color_into(raster, &params, &mut small).is_err());

        let mut large = vec![9u8; 20];
        assert_eq!(remove_color_into(raster, &params, &mut large).unwrap(), 16);
        assert_eq!(&large[16..], &[9, 9, 9, 9]);
    }
}
