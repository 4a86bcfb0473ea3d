//! Numeric validation utilities
//!
//! Parameter domains for the engines. Values outside a domain are reported,
//! never silently clamped.

use crate::error::{PixelError, Result};

/// Validator for numeric tool parameters
pub struct NumericValidator;

impl NumericValidator {
    /// Validate a color-distance tolerance
    ///
    /// Any non-negative value is accepted; values above the maximum RGB
    /// distance simply match every pixel.
    pub fn validate_tolerance(value: f32) -> Result<f32> {
        Self::validate_non_negative(value, "tolerance")
    }

    /// Validate a feather width
    pub fn validate_feather(value: f32) -> Result<f32> {
        Self::validate_non_negative(value, "feather")
    }

    /// Validate that a float is neither NaN nor negative
    pub fn validate_non_negative(value: f32, name: &str) -> Result<f32> {
        if value.is_nan() {
            return Err(PixelError::invalid_parameter(format!(
                "{} must be a number, got NaN",
                name
            )));
        }
        if value < 0.0 {
            return Err(PixelError::config_value_error(name, value, ">= 0"));
        }
        Ok(value)
    }

    /// Validate numeric range (inclusive)
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(PixelError::config_value_error(
                name,
                value,
                &format!("{}-{}", min, max),
            ));
        }
        Ok(value)
    }

    /// Validate that a value is positive
    pub fn validate_positive<T>(value: T, name: &str) -> Result<T>
    where
        T: PartialOrd + std::fmt::Display + Copy + Default,
    {
        if value <= T::default() {
            return Err(PixelError::invalid_parameter(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }
        Ok(value)
    }
}
