//! Logging and tracing configuration
//!
//! Logs go to stderr so `--stdout` output stays clean. With a log directory
//! set, a JSON copy is also written to daily rolling files.

use crate::types::CliArgs;
use std::io;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Prefix of rolling log file names
pub const LOG_FILE_PREFIX: &str = "locker-wall-simulator";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Format of console log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for the simulator's own events
    pub level: Level,
    /// Console format
    pub format: LogFormat,
    /// Directory for daily rolling JSON log files
    pub log_directory: Option<PathBuf>,
    /// Log span creation and close
    pub span_events: bool,
    /// Colored console output (text format only)
    pub ansi: bool,
    /// Filter directive replacing the level-based default
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Text,
            log_directory: None,
            span_events: false,
            ansi: true,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive logging from the command line: WARN by default, INFO with
    /// `--verbose`, DEBUG plus span events with `--debug`.
    pub fn from_cli_args(args: &CliArgs) -> Self {
        let mut config = if args.debug {
            Self::new().with_level(Level::DEBUG).with_span_events()
        } else if args.verbose {
            Self::new().with_level(Level::INFO)
        } else {
            Self::new()
        };

        if args.json_logs {
            config = config.with_json_format();
        }
        if let Some(dir) = &args.log_dir {
            config = config.with_file_logging(dir);
        }
        config
    }

    /// Set the log level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Emit console logs as JSON
    pub fn with_json_format(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Also write logs to daily rolling files in `directory`
    pub fn with_file_logging(mut self, directory: impl Into<PathBuf>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Enable span events
    pub fn with_span_events(mut self) -> Self {
        self.span_events = true;
        self
    }

    /// Disable ANSI colors
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Set custom environment filter
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Filter directive used when neither a custom filter nor `RUST_LOG` is set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        match &self.env_filter {
            Some(filter) => Ok(EnvFilter::try_new(filter)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn console_layer(&self) -> BoxedLayer {
        let layer = fmt::layer().with_writer(io::stderr).with_span_events(self.fmt_span());
        match self.format {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Text => layer.with_ansi(self.ansi).boxed(),
        }
    }

    /// Initialize the global tracing subscriber
    pub fn init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = self.filter()?;
        let mut layers = vec![self.console_layer()];

        let guard = self.log_directory.as_ref().map(|dir| {
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            layers.push(
                fmt::layer().json().with_writer(writer).with_span_events(self.fmt_span()).boxed(),
            );
            guard
        });

        Registry::default().with(layers).with(filter).try_init()?;

        // Keep the file writer alive until the process exits
        if let Some(guard) = guard {
            std::mem::forget(guard);
        }

        info!(level = %self.level, format = ?self.format, file = self.log_directory.is_some(), "Logging initialized");
        Ok(())
    }
}

/// Macro for creating structured log events with fleet context
#[macro_export]
macro_rules! fleet_event {
    ($level:ident, $message:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::$level!(message = $message, component = "fleet", $($key = $value),+)
    };
    ($level:ident, $message:expr) => {
        tracing::$level!(message = $message, component = "fleet")
    };
}
