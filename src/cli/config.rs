//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, EncoderArgs, LogFormat};
use crate::config::EncoderSettings;
use crate::tracing_config::{TracingConfig, TracingFormat};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Convert CLI arguments to validated [`EncoderSettings`] and [`TracingConfig`]
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Subscriber setup from `-v`, `--log-format` and `--log-file`
    pub(crate) fn tracing_config(cli: &Cli) -> Result<TracingConfig> {
        let config = TracingConfig::new()
            .with_verbosity(cli.verbose)
            .with_format(Self::tracing_format(cli.log_format)?);
        match &cli.log_file {
            Some(path) => Self::with_log_file(config, path),
            None => Ok(config),
        }
    }

    fn tracing_format(format: LogFormat) -> Result<TracingFormat> {
        match format {
            LogFormat::Console => Ok(TracingFormat::Console),
            LogFormat::Compact => Ok(TracingFormat::Compact),
            #[cfg(feature = "tracing-json")]
            LogFormat::Json => Ok(TracingFormat::Json),
            #[cfg(not(feature = "tracing-json"))]
            LogFormat::Json => {
                anyhow::bail!("--log-format json needs a build with the tracing-json feature")
            },
        }
    }

    #[cfg(feature = "tracing-files")]
    fn with_log_file(config: TracingConfig, path: &Path) -> Result<TracingConfig> {
        use crate::tracing_config::TracingOutput;
        Ok(config.with_output(TracingOutput::Both(path.to_path_buf())))
    }

    #[cfg(not(feature = "tracing-files"))]
    fn with_log_file(_config: TracingConfig, path: &Path) -> Result<TracingConfig> {
        anyhow::bail!(
            "--log-file {} needs a build with the tracing-files feature",
            path.display()
        )
    }

    /// Settings file (or defaults) with per-flag overrides applied on top
    pub(crate) fn encoder_settings(cli: &Cli, overrides: &EncoderArgs) -> Result<EncoderSettings> {
        let mut settings = match &cli.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings file {}", path.display()))?;
                EncoderSettings::from_json(&json)
                    .with_context(|| format!("Invalid settings file {}", path.display()))?
            },
            None => EncoderSettings::default(),
        };

        Self::apply_overrides(&mut settings, overrides);
        settings
            .validate()
            .context("Invalid encoder settings from command line")?;
        debug!(?settings, "resolved encoder settings");
        Ok(settings)
    }

    fn apply_overrides(settings: &mut EncoderSettings, overrides: &EncoderArgs) {
        if overrides.jpeg_progressive {
            settings.jpeg.progressive = true;
        }
        if overrides.jpeg_no_optimize {
            settings.jpeg.optimize = false;
        }
        if let Some(method) = overrides.webp_method {
            settings.webp.method = method;
        }
    }
}
