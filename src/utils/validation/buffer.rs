//! Buffer geometry validation
//!
//! Every engine entry point runs these before any pixel work so that a
//! mismatched buffer is reported as a dimension error, never as a panic.

use crate::{
    error::{BufferKind, PixelError, Result},
    types::CHANNELS,
};

/// Validator for raster, mask and output buffer geometry
pub struct BufferValidator;

impl BufferValidator {
    /// Number of pixels in a `width`x`height` image
    ///
    /// # Errors
    /// - Zero width or height
    /// - Pixel count overflows `usize`
    pub fn pixel_count(width: u32, height: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(PixelError::invalid_dimensions(format!(
                "Image dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| {
                PixelError::invalid_dimensions(format!(
                    "Image dimensions overflow: {}x{}",
                    width, height
                ))
            })
    }

    /// Byte length of a `width`x`height` RGBA raster
    pub fn raster_len(width: u32, height: u32) -> Result<usize> {
        Self::pixel_count(width, height)?
            .checked_mul(CHANNELS)
            .ok_or_else(|| {
                PixelError::invalid_dimensions(format!(
                    "Raster buffer length overflows: {}x{}x{}",
                    width, height, CHANNELS
                ))
            })
    }

    /// Check that a mask output has exactly one byte per pixel
    pub fn validate_mask_output(output: &[u8], pixel_count: usize) -> Result<()> {
        if output.len() != pixel_count {
            return Err(PixelError::BufferLength {
                kind: BufferKind::Mask,
                expected: pixel_count,
                actual: output.len(),
            });
        }
        Ok(())
    }

    /// Check that an output buffer can hold `needed` bytes
    pub fn validate_output_capacity(output: &[u8], needed: usize) -> Result<()> {
        if output.len() < needed {
            return Err(PixelError::OutputBufferTooSmall {
                needed,
                capacity: output.len(),
            });
        }
        Ok(())
    }

    /// Copy `data` to the front of `output`, returning the bytes written
    pub fn copy_into_output(output: &mut [u8], data: &[u8]) -> Result<usize> {
        Self::validate_output_capacity(output, data.len())?;
        if let Some(head) = output.get_mut(..data.len()) {
            head.copy_from_slice(data);
        }
        Ok(data.len())
    }
}
