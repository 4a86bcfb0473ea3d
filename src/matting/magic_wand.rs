//! Magic wand selection
//!
//! The seed pixel's RGB is the reference color. In connected mode the
//! selection grows from the seed through 4-neighbors that stay within
//! tolerance of the reference; in global mode every pixel is tested on its
//! own.

use crate::{
    error::{PixelError, Result},
    types::{RasterView, Rgb, SegmentationMask},
    utils::{BufferValidator, NumericValidator},
};
use instant::Instant;
use tracing::{debug, instrument};

/// Parameters for [`select`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WandParams {
    pub seed_x: u32,
    pub seed_y: u32,
    /// Maximum RGB distance to the seed color
    pub tolerance: f32,
    /// Restrict the selection to the seed's 4-connected region
    pub connected: bool,
}

impl WandParams {
    #[must_use]
    pub fn new(seed_x: u32, seed_y: u32, tolerance: f32) -> Self {
        Self {
            seed_x,
            seed_y,
            tolerance,
            connected: true,
        }
    }

    #[must_use]
    pub fn global(mut self) -> Self {
        self.connected = false;
        self
    }

    fn validate(&self, width: u32, height: u32) -> Result<()> {
        NumericValidator::validate_tolerance(self.tolerance)?;
        if self.seed_x >= width || self.seed_y >= height {
            return Err(PixelError::SeedOutOfBounds {
                x: self.seed_x,
                y: self.seed_y,
                width,
                height,
            });
        }
        Ok(())
    }
}

/// Select pixels similar to the seed
///
/// # Errors
/// - `SeedOutOfBounds` when the seed is not inside the raster
/// - `InvalidParameter` for NaN or negative tolerance
pub fn select(raster: RasterView<'_>, params: &WandParams) -> Result<SegmentationMask> {
    let mut data = vec![SegmentationMask::UNSELECTED; raster.pixel_count()];
    select_into(raster, params, &mut data)?;
    Ok(SegmentationMask::new(data, raster.dimensions()))
}

/// Select pixels similar to the seed into a `width * height` mask buffer
///
/// Returns the number of selected pixels.
///
/// # Errors
/// - `BufferLength` when `mask` is not exactly one byte per pixel
/// - `SeedOutOfBounds` when the seed is not inside the raster
/// - `InvalidParameter` for NaN or negative tolerance
#[instrument(
    skip_all,
    fields(
        width = raster.width(),
        height = raster.height(),
        seed_x = params.seed_x,
        seed_y = params.seed_y,
        tolerance = params.tolerance,
        connected = params.connected
    )
)]
pub fn select_into(raster: RasterView<'_>, params: &WandParams, mask: &mut [u8]) -> Result<usize> {
    BufferValidator::validate_mask_output(mask, raster.pixel_count())?;
    params.validate(raster.width(), raster.height())?;

    let start = Instant::now();
    mask.fill(SegmentationMask::UNSELECTED);
    let reference = raster.rgb_at(params.seed_x, params.seed_y);

    let selected = if params.connected {
        flood_fill(raster, params, reference, mask)
    } else {
        select_global(raster, reference, params.tolerance, mask)
    };

    debug!(
        selected,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "magic wand selection complete"
    );
    Ok(selected)
}

/// Depth-first fill with an explicit stack
///
/// A pixel is marked visited only once it passes the tolerance test, so a
/// rejected pixel may be examined again from another neighbor. Neighbors are
/// pushed west, east, north, south.
fn flood_fill(raster: RasterView<'_>, params: &WandParams, reference: Rgb, mask: &mut [u8]) -> usize {
    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let mut visited = vec![false; width * height];
    let mut stack = vec![params.seed_y as usize * width + params.seed_x as usize];
    let mut selected = 0;

    while let Some(index) = stack.pop() {
        if visited[index] || !raster.rgb(index).within_tolerance(reference, params.tolerance) {
            continue;
        }
        visited[index] = true;
        mask[index] = SegmentationMask::SELECTED;
        selected += 1;

        let x = index % width;
        let y = index / width;
        if x > 0 && !visited[index - 1] {
            stack.push(index - 1);
        }
        if x + 1 < width && !visited[index + 1] {
            stack.push(index + 1);
        }
        if y > 0 && !visited[index - width] {
            stack.push(index - width);
        }
        if y + 1 < height && !visited[index + width] {
            stack.push(index + width);
        }
    }

    selected
}

fn mark(pixel: &[u8], reference: Rgb, tolerance: f32, slot: &mut u8) -> usize {
    if Rgb::from_pixel(pixel).within_tolerance(reference, tolerance) {
        *slot = SegmentationMask::SELECTED;
        1
    } else {
        0
    }
}

#[cfg(not(feature = "parallel"))]
fn select_global(raster: RasterView<'_>, reference: Rgb, tolerance: f32, mask: &mut [u8]) -> usize {
    raster
        .pixels()
        .zip(mask.iter_mut())
        .map(|(pixel, slot)| mark(pixel, reference, tolerance, slot))
        .sum()
}

#[cfg(feature = "parallel")]
fn select_global(raster: RasterView<'_>, reference: Rgb, tolerance: f32, mask: &mut [u8]) -> usize {
    use crate::types::CHANNELS;
    use rayon::prelude::*;

    raster
        .data()
        .par_chunks_exact(CHANNELS)
        .zip(mask.par_iter_mut())
        .map(|(pixel, slot)| mark(pixel, reference, tolerance, slot))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    fn raster_from(pixels: &[[u8; 4]]) -> Vec<u8> {
        pixels.concat()
    }

    #[test]
    fn test_red_center_connected_and_global() {
        let mut pixels = [BLUE; 9];
        pixels[4] = RED;
        let data = raster_from(&pixels);
        let raster = RasterView::new(&data, 3, 3).unwrap();

        let mut expected = vec![0u8; 9];
        expected[4] = 255;

        let mask = select(raster, &WandParams::new(1, 1, 10.0)).unwrap();
        assert_eq!(mask.data, expected);
        assert_eq!(mask.selected_count(), 1);

        let mask = select(raster, &WandParams::new(1, 1, 10.0).global()).unwrap();
        assert_eq!(mask.data, expected);
        assert_eq!(mask.selected_count(), 1);
    }

    #[test]
    fn test_connected_stops_at_barrier_global_does_not() {
        // red | green | red
        let data = raster_from(&[RED, GREEN, RED]);
        let raster = RasterView::new(&data, 3, 1).unwrap();

        let connected = select(raster, &WandParams::new(0, 0, 10.0)).unwrap();
        assert_eq!(connected.data, vec![255, 0, 0]);

        let global = select(raster, &WandParams::new(0, 0, 10.0).global()).unwrap();
        assert_eq!(global.data, vec![255, 0, 255]);
    }

    #[test]
    fn test_diagonal_neighbors_not_connected() {
        let data = raster_from(&[RED, BLUE, BLUE, RED]);
        let raster = RasterView::new(&data, 2, 2).unwrap();
        let mask = select(raster, &WandParams::new(0, 0, 0.0)).unwrap();
        assert_eq!(mask.data, vec![255, 0, 0, 0]);
    }

    #[test]
    fn test_seed_always_selected() {
        let data = raster_from(&[[12, 34, 56, 0], BLUE]);
        let raster = RasterView::new(&data, 2, 1).unwrap();
        let mask = select(raster, &WandParams::new(0, 0, 0.0)).unwrap();
        assert!(mask.is_selected(0, 0));
    }

    #[test]
    fn test_seed_out_of_bounds() {
        let data = raster_from(&[RED; 4]);
        let raster = RasterView::new(&data, 2, 2).unwrap();
        let err = select(raster, &WandParams::new(2, 0, 10.0)).unwrap_err();
        assert!(matches!(err, PixelError::SeedOutOfBounds { x: 2, y: 0, .. }));
    }

    #[test]
    fn test_select_into_requires_exact_mask_length() {
        let data = raster_from(&[RED; 4]);
        let raster = RasterView::new(&data, 2, 2).unwrap();
        let params = WandParams::new(0, 0, 0.0);

        assert!(select_into(raster, &params, &mut [0u8; 5]).is_err());

        let mut mask = [7u8; 4];
        assert_eq!(select_into(raster, &params, &mut mask).unwrap(), 4);
        assert_eq!(mask, [255; 4]);
    }

    #[test]
    fn test_spiral_region() {
        // 5x5 with a single-pixel-wide red corridor
        let r = RED;
        let b = BLUE;
        let data = raster_from(&[
            r, r, r, r, r, //
            b, b, b, b, r, //
            r, r, r, b, r, //
            r, b, b, b, r, //
            r, r, r, r, r, //
        ]);
        let raster = RasterView::new(&data, 5, 5).unwrap();
        let mask = select(raster, &WandParams::new(2, 2, 0.0)).unwrap();
        assert_eq!(mask.selected_count(), 17);
        assert!(mask.is_selected(0, 0));
        assert!(!mask.is_selected(1, 1));
    }
}
