//! Core data model: raster views, masks, colors, rectangle seeds and quality values

use crate::{
    error::{BufferKind, PixelError, Result},
    utils::BufferValidator,
};
use image::{ImageBuffer, Luma, RgbaImage};
use serde::{Deserialize, Serialize};

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// An exact RGB color; alpha never takes part in color matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Largest possible Euclidean distance between two RGB colors (`255 * sqrt(3)`)
    pub const MAX_DISTANCE: f32 = 441.672_96;

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    #[must_use]
    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Read the RGB part of an RGBA pixel; missing channels read as 0
    #[must_use]
    pub fn from_pixel(pixel: &[u8]) -> Self {
        let channel = |i: usize| pixel.get(i).copied().unwrap_or(0);
        Self::new(channel(0), channel(1), channel(2))
    }

    /// Squared Euclidean distance in RGB space
    #[must_use]
    pub fn distance_sq(self, other: Self) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }

    /// `distance(self, other) <= tolerance`, evaluated without rounding at the boundary
    #[must_use]
    pub fn within_tolerance(self, other: Self, tolerance: f32) -> bool {
        f64::from(self.distance_sq(other)).sqrt() <= f64::from(tolerance)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Borrowed, validated view over a row-major RGBA buffer
#[derive(Debug, Clone, Copy)]
pub struct RasterView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RasterView<'a> {
    /// Wrap `data` as a `width`x`height` raster
    ///
    /// # Errors
    /// - Zero or overflowing dimensions
    /// - `data.len() != width * height * 4`
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = BufferValidator::raster_len(width, height)?;
        if data.len() != expected {
            return Err(PixelError::BufferLength {
                kind: BufferKind::Raster,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Byte length of the buffer
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// RGB of the pixel with linear index `index`
    #[must_use]
    pub fn rgb(&self, index: usize) -> Rgb {
        let start = index * CHANNELS;
        Rgb::from_pixel(self.data.get(start..start + CHANNELS).unwrap_or(&[]))
    }

    /// RGB of the pixel at `(x, y)`
    #[must_use]
    pub fn rgb_at(&self, x: u32, y: u32) -> Rgb {
        self.rgb(y as usize * self.width as usize + x as usize)
    }

    /// Iterate over RGBA pixels
    pub fn pixels(&self) -> std::slice::ChunksExact<'a, u8> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Copy into an owned `image` buffer
    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec()).ok_or_else(|| {
            PixelError::invalid_dimensions("Failed to build RGBA image from raster")
        })
    }
}

/// Binary selection mask: 0 = background, 255 = foreground
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    /// Mask data, one byte per pixel, row-major
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl SegmentationMask {
    /// Value written for selected pixels
    pub const SELECTED: u8 = 255;
    /// Value written for unselected pixels
    pub const UNSELECTED: u8 = 0;

    /// Create a new segmentation mask
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Convert mask to a grayscale image
    pub fn to_image(&self) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (width, height) = self.dimensions;
        ImageBuffer::from_raw(width, height, self.data.clone())
            .ok_or_else(|| PixelError::invalid_dimensions("Failed to create image from mask data"))
    }

    /// Number of pixels at the selected pole
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == Self::SELECTED).count()
    }

    #[must_use]
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        let idx = y as usize * self.dimensions.0 as usize + x as usize;
        self.data.get(idx) == Some(&Self::SELECTED)
    }

    /// Copy the mask into a caller-provided buffer of exactly `width * height` bytes
    pub fn copy_into(&self, output: &mut [u8]) -> Result<usize> {
        BufferValidator::validate_mask_output(output, self.data.len())?;
        output.copy_from_slice(&self.data);
        Ok(self.data.len())
    }

    /// Write the mask into the alpha channel of a raw RGBA buffer
    pub fn apply_to_rgba(&self, rgba: &mut [u8]) -> Result<()> {
        let expected = self.data.len() * CHANNELS;
        if rgba.len() != expected {
            return Err(PixelError::BufferLength {
                kind: BufferKind::Raster,
                expected,
                actual: rgba.len(),
            });
        }
        for (pixel, &alpha) in rgba.chunks_exact_mut(CHANNELS).zip(&self.data) {
            if let Some(a) = pixel.get_mut(3) {
                *a = alpha;
            }
        }
        Ok(())
    }

    /// Apply the mask to an RGBA image
    pub fn apply_to_image(&self, image: &mut RgbaImage) -> Result<()> {
        if image.dimensions() != self.dimensions {
            return Err(PixelError::invalid_dimensions(
                "Image and mask dimensions do not match",
            ));
        }
        self.apply_to_rgba(image.as_mut())
    }
}

/// Rectangle seed in pixel coordinates; may extend past the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectSeed {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Rectangle clipped to raster bounds, half-open on the right and bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClippedRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl RectSeed {
    #[must_use]
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clip to a `width`x`height` raster
    ///
    /// # Errors
    /// - Zero-area rectangle
    /// - Rectangle with no pixel inside the raster
    pub fn clip(&self, width: u32, height: u32) -> Result<ClippedRect> {
        if self.width == 0 || self.height == 0 {
            return Err(PixelError::invalid_parameter(format!(
                "Rectangle must have non-zero area, got {}x{}",
                self.width, self.height
            )));
        }

        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(i64::from(self.width)).min(i64::from(width));
        let y1 = self.y.saturating_add(i64::from(self.height)).min(i64::from(height));

        if x0 >= x1 || y0 >= y1 {
            return Err(PixelError::invalid_parameter(format!(
                "Rectangle ({}, {}, {}x{}) lies outside the {}x{} raster",
                self.x, self.y, self.width, self.height, width, height
            )));
        }

        Ok(ClippedRect {
            x0: x0 as u32,
            y0: y0 as u32,
            x1: x1 as u32,
            y1: y1 as u32,
        })
    }
}

impl ClippedRect {
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Encoder quality in `1..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(100);

    /// # Errors
    /// Returns `InvalidParameter` when `value` is outside `1..=100`
    pub fn new(value: u8) -> Result<Self> {
        if (1..=100).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PixelError::config_value_error("quality", value, "1-100"))
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = PixelError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(value: Quality) -> Self {
        value.0
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
