//! Geometric transforms on RGBA rasters
//!
//! Thin wrappers over `image::imageops` that validate geometry up front and
//! write into caller buffers.

use crate::{
    error::{PixelError, Result},
    types::RasterView,
    utils::BufferValidator,
};
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Crop rectangle; must lie fully inside the source raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn validate(&self, width: u32, height: u32) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PixelError::invalid_parameter(format!(
                "Crop rectangle must have non-zero area, got {}x{}",
                self.width, self.height
            )));
        }
        let fits = |start: u32, extent: u32, limit: u32| {
            start.checked_add(extent).is_some_and(|end| end <= limit)
        };
        if !fits(self.x, self.width, width) || !fits(self.y, self.height, height) {
            return Err(PixelError::invalid_parameter(format!(
                "Crop rectangle ({}, {}, {}x{}) exceeds the {}x{} raster",
                self.x, self.y, self.width, self.height, width, height
            )));
        }
        Ok(())
    }
}

/// Clockwise rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotateAngle {
    Degree0,
    Degree90,
    Degree180,
    Degree270,
}

impl RotateAngle {
    /// Parse a clockwise angle in degrees
    pub fn from_degrees(degrees: u32) -> Result<Self> {
        match degrees % 360 {
            0 => Ok(Self::Degree0),
            90 => Ok(Self::Degree90),
            180 => Ok(Self::Degree180),
            270 => Ok(Self::Degree270),
            _ => Err(PixelError::invalid_parameter(format!(
                "Rotation must be a multiple of 90 degrees, got {}",
                degrees
            ))),
        }
    }

    /// Output dimensions for a `width`x`height` input
    #[must_use]
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Self::Degree0 | Self::Degree180 => (width, height),
            Self::Degree90 | Self::Degree270 => (height, width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

/// Resampling filter for [`resize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<ResizeFilter> for imageops::FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

fn into_output(image: &RgbaImage, output: &mut [u8]) -> Result<usize> {
    BufferValidator::copy_into_output(output, image.as_raw())
}

/// Extract `rect` from the raster
///
/// # Errors
/// - `InvalidParameter` for a zero-area rectangle or one that leaves the raster
pub fn crop(raster: RasterView<'_>, rect: CropRect) -> Result<RgbaImage> {
    rect.validate(raster.width(), raster.height())?;
    let image = raster.to_rgba_image()?;
    Ok(imageops::crop_imm(&image, rect.x, rect.y, rect.width, rect.height).to_image())
}

/// [`crop`] into a caller buffer
///
/// # Errors
/// As [`crop`], plus `OutputBufferTooSmall`
#[instrument(skip_all, fields(width = raster.width(), height = raster.height(), rect = ?rect))]
pub fn crop_into(raster: RasterView<'_>, rect: CropRect, output: &mut [u8]) -> Result<usize> {
    rect.validate(raster.width(), raster.height())?;
    let needed = BufferValidator::raster_len(rect.width, rect.height)?;
    BufferValidator::validate_output_capacity(output, needed)?;
    into_output(&crop(raster, rect)?, output)
}

/// Rotate clockwise by `angle`
pub fn rotate(raster: RasterView<'_>, angle: RotateAngle) -> Result<RgbaImage> {
    let image = raster.to_rgba_image()?;
    Ok(match angle {
        RotateAngle::Degree0 => image,
        RotateAngle::Degree90 => imageops::rotate90(&image),
        RotateAngle::Degree180 => imageops::rotate180(&image),
        RotateAngle::Degree270 => imageops::rotate270(&image),
    })
}

/// [`rotate`] into a caller buffer
///
/// # Errors
/// - `OutputBufferTooSmall`
#[instrument(skip_all, fields(width = raster.width(), height = raster.height(), angle = ?angle))]
pub fn rotate_into(raster: RasterView<'_>, angle: RotateAngle, output: &mut [u8]) -> Result<usize> {
    BufferValidator::validate_output_capacity(output, raster.byte_len())?;
    into_output(&rotate(raster, angle)?, output)
}

/// Mirror the raster
pub fn flip(raster: RasterView<'_>, direction: FlipDirection) -> Result<RgbaImage> {
    let image = raster.to_rgba_image()?;
    Ok(match direction {
        FlipDirection::Horizontal => imageops::flip_horizontal(&image),
        FlipDirection::Vertical => imageops::flip_vertical(&image),
    })
}

/// [`flip`] into a caller buffer
///
/// # Errors
/// - `OutputBufferTooSmall`
#[instrument(skip_all, fields(width = raster.width(), height = raster.height(), direction = ?direction))]
pub fn flip_into(
    raster: RasterView<'_>,
    direction: FlipDirection,
    output: &mut [u8],
) -> Result<usize> {
    BufferValidator::validate_output_capacity(output, raster.byte_len())?;
    into_output(&flip(raster, direction)?, output)
}

/// Resample to `new_width`x`new_height`
///
/// # Errors
/// - `InvalidDimensions` for zero or overflowing target dimensions
pub fn resize(
    raster: RasterView<'_>,
    new_width: u32,
    new_height: u32,
    filter: ResizeFilter,
) -> Result<RgbaImage> {
    BufferValidator::raster_len(new_width, new_height)?;
    let image = raster.to_rgba_image()?;
    Ok(imageops::resize(&image, new_width, new_height, filter.into()))
}

/// [`resize`] into a caller buffer
///
/// # Errors
/// As [`resize`], plus `OutputBufferTooSmall`
#[instrument(
    skip_all,
    fields(
        width = raster.width(),
        height = raster.height(),
        new_width = new_width,
        new_height = new_height,
        filter = ?filter
    )
)]
pub fn resize_into(
    raster: RasterView<'_>,
    new_width: u32,
    new_height: u32,
    filter: ResizeFilter,
    output: &mut [u8],
) -> Result<usize> {
    let needed = BufferValidator::raster_len(new_width, new_height)?;
    BufferValidator::validate_output_capacity(output, needed)?;
    into_output(&resize(raster, new_width, new_height, filter)?, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 raster with each pixel's red channel holding its index
    fn indexed() -> Vec<u8> {
        (0..6u8).flat_map(|i| [i, 0, 0, 255]).collect()
    }

    fn reds(image: &RgbaImage) -> Vec<u8> {
        image.pixels().map(|p| p.0[0]).collect()
    }

    #[test]
    fn test_crop() {
        let data = indexed();
        let raster = RasterView::new(&data, 3, 2).unwrap();
        let cropped = crop(raster, CropRect::new(1, 0, 2, 2)).unwrap();
        assert_eq!(cropped.dimensions(), (2, 2));
        assert_eq!(reds(&cropped), vec![1, 2, 4, 5]);

        assert!(crop(raster, CropRect::new(2, 0, 2, 1)).is_err());
        assert!(crop(raster, CropRect::new(0, 0, 0, 1)).is_err());
        assert!(crop(raster, CropRect::new(u32::MAX, 0, 2, 1)).is_err());
    }

    #[test]
    fn test_rotate_90() {
        let data = indexed();
        let raster = RasterView::new(&data, 3, 2).unwrap();
        let rotated = rotate(raster, RotateAngle::Degree90).unwrap();
        assert_eq!(rotated.dimensions(), (2, 3));
        // 0 1 2      3 0
        // 3 4 5  ->  4 1
        //            5 2
        assert_eq!(reds(&rotated), vec![3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn test_four_quarter_turns_are_identity() {
        let data = indexed();
        let mut current = data.clone();
        let (mut w, mut h) = (3, 2);
        for _ in 0..4 {
            let raster = RasterView::new(&current, w, h).unwrap();
            let rotated = rotate(raster, RotateAngle::Degree90).unwrap();
            (w, h) = rotated.dimensions();
            current = rotated.into_raw();
        }
        assert_eq!(current, data);
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let data = indexed();
        let raster = RasterView::new(&data, 3, 2).unwrap();
        let once = flip(raster, FlipDirection::Horizontal).unwrap();
        assert_eq!(reds(&once), vec![2, 1, 0, 5, 4, 3]);

        let twice = flip(
            RasterView::new(once.as_raw(), 3, 2).unwrap(),
            FlipDirection::Horizontal,
        )
        .unwrap();
        assert_eq!(twice.as_raw(), &data);

        let vertical = flip(raster, FlipDirection::Vertical).unwrap();
        assert_eq!(reds(&vertical), vec![3, 4, 5, 0, 1, 2]);
    }

    #[test]
    fn test_resize_into() {
        let data = vec![255u8; 4 * 4 * 4];
        let raster = RasterView::new(&data, 4, 4).unwrap();
        let mut output = vec![0u8; 2 * 2 * 4];
        let written = resize_into(raster, 2, 2, ResizeFilter::Nearest, &mut output).unwrap();
        assert_eq!(written, 16);
        assert!(output.iter().all(|&b| b == 255));

        assert!(resize_into(raster, 3, 3, ResizeFilter::Triangle, &mut output).is_err());
        assert!(resize(raster, 0, 3, ResizeFilter::Triangle).is_err());
    }

    #[test]
    fn test_rotate_angle_parsing() {
        assert_eq!(RotateAngle::from_degrees(450).unwrap(), RotateAngle::Degree90);
        assert!(RotateAngle::from_degrees(45).is_err());
        assert_eq!(RotateAngle::Degree270.output_dimensions(3, 2), (2, 3));
    }
}
