//! Color parsing utilities
//!
//! Used by the CLI to turn user-facing color strings into [`Rgb`] key colors.

use crate::{
    error::{PixelError, Result},
    types::Rgb,
};

/// Utility for parsing and converting colors
pub struct ColorParser;

impl ColorParser {
    /// Parse a hex color string to [`Rgb`]
    ///
    /// Supports both #RRGGBB and #RGB formats, with or without the `#`.
    ///
    /// # Examples
    /// ```rust
    /// use imgly_pixelcut::utils::ColorParser;
    ///
    /// let white = ColorParser::parse_hex("#ffffff")?;
    /// let red = ColorParser::parse_hex("#f00")?;
    /// assert_eq!(white.r, 255);
    /// assert_eq!(red.g, 0);
    /// # Ok::<(), imgly_pixelcut::PixelError>(())
    /// ```
    pub fn parse_hex(hex: &str) -> Result<Rgb> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(PixelError::invalid_parameter(
                "Color must be in #RRGGBB or #RGB format",
            ));
        }

        let component = |range: std::ops::Range<usize>, name: &str| -> Result<u8> {
            let digits = hex.get(range).unwrap_or_default();
            u8::from_str_radix(digits, 16).map_err(|_| {
                PixelError::invalid_parameter(format!("Invalid {} component in hex color", name))
            })
        };

        match hex.len() {
            6 => Ok(Rgb::new(
                component(0..2, "red")?,
                component(2..4, "green")?,
                component(4..6, "blue")?,
            )),
            // #RGB expands each digit to a byte (0xF -> 0xFF)
            3 => Ok(Rgb::new(
                component(0..1, "red")? * 17,
                component(1..2, "green")? * 17,
                component(2..3, "blue")? * 17,
            )),
            _ => Err(PixelError::invalid_parameter(
                "Color must be in #RRGGBB or #RGB format",
            )),
        }
    }
}
