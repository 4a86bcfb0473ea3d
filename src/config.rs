//! Configuration types for compression operations

use crate::{
    error::{PixelError, Result},
    types::Quality,
    utils::NumericValidator,
};
use serde::{Deserialize, Serialize};

/// Target encoding for compression requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionFormat {
    /// Lossy JPEG (alpha is dropped)
    Jpeg,
    /// Lossy WebP with alpha
    WebP,
    /// Lossless PNG with alpha
    Png,
}

impl CompressionFormat {
    /// Whether the format exposes a quality axis to search over
    #[must_use]
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::WebP)
    }

    /// File extension without the dot
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Png => "png",
        }
    }
}

impl Default for CompressionFormat {
    fn default() -> Self {
        Self::Jpeg
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
            Self::Png => write!(f, "png"),
        }
    }
}

impl std::str::FromStr for CompressionFormat {
    type Err = PixelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            "png" => Ok(Self::Png),
            other => Err(PixelError::unsupported_format(other)),
        }
    }
}

/// JPEG encoder strategy switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpegOptions {
    /// Build per-image Huffman tables (smaller output, slower encode)
    pub optimize: bool,
    /// Progressive scan ordering
    pub progressive: bool,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            progressive: false,
        }
    }
}

/// Lossy WebP tuning knobs, ranges as in libwebp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebPOptions {
    /// Speed/compression trade-off (0 = fast, 6 = slowest)
    pub method: u8,
    /// Deblocking filter strength (0-100)
    pub filter_strength: u8,
    /// Deblocking filter sharpness (0-7)
    pub filter_sharpness: u8,
    /// Spatial noise shaping strength (0-100)
    pub sns_strength: u8,
}

impl Default for WebPOptions {
    fn default() -> Self {
        Self {
            method: 4,
            filter_strength: 60,
            filter_sharpness: 0,
            sns_strength: 50,
        }
    }
}

impl WebPOptions {
    pub fn validate(&self) -> Result<()> {
        NumericValidator::validate_range(self.method, 0, 6, "WebP method")?;
        NumericValidator::validate_range(self.filter_strength, 0, 100, "WebP filter_strength")?;
        NumericValidator::validate_range(self.filter_sharpness, 0, 7, "WebP filter_sharpness")?;
        NumericValidator::validate_range(self.sns_strength, 0, 100, "WebP sns_strength")?;
        Ok(())
    }
}

/// Deflate effort for PNG output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// Map a 1-100 quality hint onto an effort level
    #[must_use]
    pub fn from_quality(quality: Quality) -> Self {
        match quality.get() {
            0..=49 => Self::Fast,
            50..=89 => Self::Default,
            _ => Self::Best,
        }
    }
}

/// PNG encoder options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PngOptions {
    /// Fixed effort; `None` derives it from the requested quality
    pub compression: Option<PngCompression>,
}

impl PngOptions {
    #[must_use]
    pub fn effort_for(&self, quality: Quality) -> PngCompression {
        self.compression
            .unwrap_or_else(|| PngCompression::from_quality(quality))
    }
}

/// Per-format encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub jpeg: JpegOptions,
    pub webp: WebPOptions,
    pub png: PngOptions,
}

impl EncoderSettings {
    /// Create a new settings builder
    #[must_use]
    pub fn builder() -> EncoderSettingsBuilder {
        EncoderSettingsBuilder::new()
    }

    /// Check every option against its documented range
    pub fn validate(&self) -> Result<()> {
        self.webp.validate()
    }

    /// Load settings from a JSON document, validating them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).map_err(|e| {
            PixelError::invalid_parameter(format!("Failed to parse encoder settings: {}", e))
        })?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Builder for [`EncoderSettings`]
#[derive(Debug, Default)]
pub struct EncoderSettingsBuilder {
    settings: EncoderSettings,
}

impl EncoderSettingsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn jpeg_optimize(mut self, optimize: bool) -> Self {
        self.settings.jpeg.optimize = optimize;
        self
    }

    #[must_use]
    pub fn jpeg_progressive(mut self, progressive: bool) -> Self {
        self.settings.jpeg.progressive = progressive;
        self
    }

    #[must_use]
    pub fn webp_method(mut self, method: u8) -> Self {
        self.settings.webp.method = method;
        self
    }

    #[must_use]
    pub fn webp_filter_strength(mut self, strength: u8) -> Self {
        self.settings.webp.filter_strength = strength;
        self
    }

    #[must_use]
    pub fn webp_filter_sharpness(mut self, sharpness: u8) -> Self {
        self.settings.webp.filter_sharpness = sharpness;
        self
    }

    #[must_use]
    pub fn webp_sns_strength(mut self, strength: u8) -> Self {
        self.settings.webp.sns_strength = strength;
        self
    }

    #[must_use]
    pub fn png_compression(mut self, compression: PngCompression) -> Self {
        self.settings.png.compression = Some(compression);
        self
    }

    /// Build and validate the settings
    pub fn build(self) -> Result<EncoderSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EncoderSettings::default();
        assert!(settings.jpeg.optimize);
        assert!(!settings.jpeg.progressive);
        assert_eq!(settings.webp.method, 4);
        assert_eq!(settings.png.compression, None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_out_of_range_webp() {
        assert!(EncoderSettings::builder().webp_method(7).build().is_err());
        assert!(EncoderSettings::builder()
            .webp_filter_sharpness(8)
            .build()
            .is_err());
        assert!(EncoderSettings::builder()
            .webp_sns_strength(101)
            .build()
            .is_err());

        let settings = EncoderSettings::builder()
            .webp_method(6)
            .jpeg_progressive(true)
            .build()
            .unwrap();
        assert_eq!(settings.webp.method, 6);
        assert!(settings.jpeg.progressive);
    }

    #[test]
    fn test_png_effort_mapping() {
        let q = |v| Quality::new(v).unwrap();
        assert_eq!(PngCompression::from_quality(q(1)), PngCompression::Fast);
        assert_eq!(PngCompression::from_quality(q(50)), PngCompression::Default);
        assert_eq!(PngCompression::from_quality(q(90)), PngCompression::Best);

        let fixed = PngOptions {
            compression: Some(PngCompression::Fast),
        };
        assert_eq!(fixed.effort_for(q(100)), PngCompression::Fast);
    }

    #[test]
    fn test_settings_from_json() {
        let settings =
            EncoderSettings::from_json(r#"{"jpeg": {"progressive": true}, "webp": {"method": 2}}"#)
                .unwrap();
        assert!(settings.jpeg.progressive);
        assert!(settings.jpeg.optimize);
        assert_eq!(settings.webp.method, 2);
        assert_eq!(settings.webp.sns_strength, 50);

        assert!(EncoderSettings::from_json(r#"{"webp": {"method": 9}}"#).is_err());
        assert!(EncoderSettings::from_json("not json").is_err());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JPG".parse::<CompressionFormat>().unwrap(), CompressionFormat::Jpeg);
        assert_eq!("webp".parse::<CompressionFormat>().unwrap(), CompressionFormat::WebP);
        assert!("tiff".parse::<CompressionFormat>().is_err());
        assert!(CompressionFormat::Jpeg.is_lossy());
        assert!(!CompressionFormat::Png.is_lossy());
    }
}
