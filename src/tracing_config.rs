//! Tracing subscriber configuration for the CLI
//!
//! The library only emits events and spans; this module is where the binary
//! decides how they are filtered, formatted and where they go.

#[cfg(feature = "tracing-files")]
use std::path::PathBuf;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Configuration for tracing output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable console output with colors
    Console,
    /// Compact console output without colors, for CI logs
    Compact,
    /// JSON structured logging
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Configuration for tracing output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracingOutput {
    /// Write to stderr (default)
    Console,
    /// Write to a file
    #[cfg(feature = "tracing-files")]
    File(PathBuf),
    /// Write to stderr and a file
    #[cfg(feature = "tracing-files")]
    Both(PathBuf),
}

/// Keeps buffered writers alive; flushes on drop
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct TracingGuard {
    #[cfg(feature = "tracing-files")]
    _file: Option<tracing_appender::non_blocking::WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    pub format: TracingFormat,
    pub output: TracingOutput,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            output: TracingOutput::Console,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity level (0-2+)
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",  // Default: per-command summaries
            1 => "debug", // -v: per-round and per-probe statistics
            _ => "trace", // -vv+: individual encodes
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Invalid filter directive
    /// - A global subscriber is already installed
    pub fn init(self) -> anyhow::Result<TracingGuard> {
        let filter = match &self.env_filter {
            Some(directives) => EnvFilter::try_new(directives)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };

        #[allow(unused_mut)]
        let mut guard = TracingGuard::default();
        let mut layers: Vec<BoxedLayer> = Vec::new();

        match &self.output {
            TracingOutput::Console => layers.push(layer_for(self.format, true, std::io::stderr)),
            #[cfg(feature = "tracing-files")]
            TracingOutput::File(path) => {
                let (writer, file_guard) = file_writer(path);
                layers.push(layer_for(self.format, false, writer));
                guard._file = Some(file_guard);
            },
            #[cfg(feature = "tracing-files")]
            TracingOutput::Both(path) => {
                layers.push(layer_for(self.format, true, std::io::stderr));
                let (writer, file_guard) = file_writer(path);
                layers.push(layer_for(self.format, false, writer));
                guard._file = Some(file_guard);
            },
        }

        Registry::default().with(layers).with(filter).try_init()?;
        Ok(guard)
    }
}

fn layer_for<W>(format: TracingFormat, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        TracingFormat::Console => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .with_level(true)
            .compact()
            .boxed(),
        TracingFormat::Compact => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .compact()
            .boxed(),
        #[cfg(feature = "tracing-json")]
        TracingFormat::Json => fmt::layer()
            .with_writer(writer)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

#[cfg(feature = "tracing-files")]
fn file_writer(
    path: &std::path::Path,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    let directory = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("imgly-pixelcut.log"));
    tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
}

/// Span helpers for CLI operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span covering one CLI command on one input file
    pub fn file_processing(command: &str, file_path: &std::path::Path) -> Span {
        tracing::span!(
            Level::INFO,
            "file_processing",
            command = %command,
            file_path = %file_path.display()
        )
    }
}
