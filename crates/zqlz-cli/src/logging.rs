//! Logging setup for the command line tools.
//!
//! Output goes to stderr so stdout stays clean for tables and JSON. The
//! `RUST_LOG` environment variable takes precedence over the configured
//! filter.

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,

    /// Emit JSON lines instead of human readable output
    pub json: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log span open/close events
    pub enable_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn".to_string(),
            json: false,
            include_location: false,
            enable_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Configuration for a `--log-level` value such as `debug`.
    ///
    /// Debug and trace levels also log spans with their source location.
    pub fn for_level(level: &str) -> Self {
        let verbose = matches!(level, "debug" | "trace");
        Self {
            default_filter: level.to_string(),
            include_location: verbose,
            enable_spans: verbose,
            ..Self::default()
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Initialize the logging system with the given configuration
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?;

    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = if config.json {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events)
            .json()
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events)
            .with_ansi(true)
            .compact()
            .with_filter(env_filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).try_init()?;

    tracing::debug!(filter = %config.default_filter, json = config.json, "logging initialized");
    Ok(())
}
