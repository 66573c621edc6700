//! Logger configuration presets and construction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

use crate::error::{LogError, Result};
use crate::logger::Logger;
use crate::observer::{ObservedLogs, ObserverWriter};
use crate::report::ErrorReportMakeWriter;
use crate::service::ServiceContext;

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line JSON, the shape ingestion pipelines consume.
    Json,
    /// Compact single-line console format.
    Compact,
    /// Single-line console format with all fields (default).
    #[default]
    Full,
    /// Human-readable multi-line format.
    Pretty,
}

/// Log output target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to stdout.
    #[default]
    Stdout,
    /// Log to stderr.
    Stderr,
    /// Route entries to the test harness capture.
    Test,
    /// Log to rotated files in the given directory.
    File(PathBuf),
}

/// File rotation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    /// Rotate daily.
    #[default]
    Daily,
    /// Rotate hourly.
    Hourly,
    /// Rotate every minute (for testing).
    Minutely,
    /// Never rotate.
    Never,
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Daily => Rotation::DAILY,
            FileRotation::Hourly => Rotation::HOURLY,
            FileRotation::Minutely => Rotation::MINUTELY,
            FileRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
    /// Log target.
    #[serde(default)]
    pub target: LogTarget,
    /// File name prefix (used when the target is a file).
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Rotation strategy (used when the target is a file).
    #[serde(default)]
    pub rotation: FileRotation,
    /// Whether to use ANSI colors.
    #[serde(default = "default_true")]
    pub ansi: bool,
    /// Whether to capture the caller's file and line on every entry.
    #[serde(default = "default_true")]
    pub caller: bool,
    /// Whether to include thread names.
    #[serde(default)]
    pub thread_names: bool,
    /// Directive overrides (e.g., `my_crate=trace`).
    #[serde(default)]
    pub directives: Vec<String>,
    /// Logger name, injected into JSON entries.
    #[serde(default)]
    pub name: Option<String>,
    /// Service identity; when set, error entries are decorated for
    /// error-report ingestion.
    #[serde(default)]
    pub error_report: Option<ServiceContext>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "cloudlog".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file_prefix: default_file_prefix(),
            rotation: FileRotation::default(),
            ansi: true,
            caller: true,
            thread_names: false,
            directives: Vec::new(),
            name: None,
            error_report: None,
        }
    }
}

impl LogConfig {
    /// Create a new log config with the specified level.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// The default production configuration: JSON to stdout at debug level,
    /// caller capture on, colors off.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Json,
            target: LogTarget::Stdout,
            ansi: false,
            ..Default::default()
        }
    }

    /// The default development configuration: console output to stdout at
    /// debug level with colorized levels.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Full,
            target: LogTarget::Stdout,
            ansi: true,
            ..Default::default()
        }
    }

    /// The default test configuration: console output routed to the test
    /// harness capture.
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Full,
            target: LogTarget::Test,
            ansi: false,
            ..Default::default()
        }
    }

    /// Set the log format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the log target.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Configure rotated file logging.
    #[must_use]
    pub fn with_file_logging(
        mut self,
        directory: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        self.target = LogTarget::File(directory.into());
        self.file_prefix = prefix.into();
        // Colors never belong in files.
        self.ansi = false;
        self
    }

    /// Set the rotation strategy for file logging.
    #[must_use]
    pub fn with_rotation(mut self, rotation: FileRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add a directive override.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Name the logger.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Decorate error entries for error-report ingestion as the given
    /// service. Requires the JSON format.
    #[must_use]
    pub fn with_error_reporting(mut self, service_context: ServiceContext) -> Self {
        self.error_report = Some(service_context);
        self
    }

    /// Include thread names.
    #[must_use]
    pub fn with_thread_names(mut self) -> Self {
        self.thread_names = true;
        self
    }

    /// Disable ANSI colors.
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    /// Disable caller capture.
    #[must_use]
    pub fn without_caller(mut self) -> Self {
        self.caller = false;
        self
    }

    /// Build a logger for this configuration.
    ///
    /// Building never touches process-global state; see [`LogConfig::init`]
    /// and [`crate::install_global`] for installation.
    ///
    /// # Errors
    ///
    /// Returns an error if the level or a directive does not parse, if error
    /// reporting is requested on a non-JSON format, or if the file target
    /// cannot be created.
    pub fn build(&self) -> Result<Logger> {
        self.build_with_observer(None)
    }

    /// Build a logger that additionally tees every entry into an in-memory
    /// observer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`LogConfig::build`].
    pub fn build_observed(&self) -> Result<(Logger, ObservedLogs)> {
        let (tee, logs) = ObserverWriter::pair();
        let logger = self.build_with_observer(Some(tee))?;
        Ok((logger, logs))
    }

    /// Build a logger writing to the given sink instead of the configured
    /// target.
    ///
    /// # Errors
    ///
    /// Same conditions as [`LogConfig::build`], minus the target handling.
    pub fn build_with_writer<W>(&self, writer: W) -> Result<Logger>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        self.validate()?;
        let filter = self.build_filter()?;
        let dispatch = self.dispatch_for(filter, writer, None);
        Ok(Logger::from_parts(self.name.clone(), dispatch))
    }

    /// Build a logger and install it as the process default collector and as
    /// the crate global.
    ///
    /// # Errors
    ///
    /// Build errors, plus an error if another collector already claimed the
    /// process default.
    pub fn init(self) -> Result<Logger> {
        let logger = self.build()?;
        tracing::dispatcher::set_global_default(logger.dispatch().clone())
            .map_err(|e| LogError::Init(e.to_string()))?;
        crate::global::replace_global(logger.clone());
        Ok(logger)
    }

    fn validate(&self) -> Result<()> {
        if self.error_report.is_some() && self.format != LogFormat::Json {
            return Err(LogError::Config(
                "error reporting requires the json format".to_string(),
            ));
        }
        Ok(())
    }

    fn build_with_observer(&self, observer: Option<ObserverWriter>) -> Result<Logger> {
        self.validate()?;
        let filter = self.build_filter()?;

        let dispatch = match &self.target {
            LogTarget::Stdout => self.dispatch_for(filter, std::io::stdout, observer),
            LogTarget::Stderr => self.dispatch_for(filter, std::io::stderr, observer),
            LogTarget::Test => self.dispatch_for(filter, fmt::TestWriter::default(), observer),
            LogTarget::File(directory) => {
                std::fs::create_dir_all(directory)?;
                let appender =
                    RollingFileAppender::new(self.rotation.into(), directory, &self.file_prefix);
                self.dispatch_for(filter, appender, observer)
            }
        };

        Ok(Logger::from_parts(self.name.clone(), dispatch))
    }

    /// Build the env filter from config.
    fn build_filter(&self) -> Result<EnvFilter> {
        let mut filter =
            EnvFilter::try_new(&self.level).map_err(|e| LogError::Config(e.to_string()))?;

        for directive in &self.directives {
            filter = filter.add_directive(directive.parse().map_err(
                |e: tracing_subscriber::filter::ParseError| LogError::Config(e.to_string()),
            )?);
        }

        Ok(filter)
    }

    fn dispatch_for<W>(
        &self,
        filter: EnvFilter,
        writer: W,
        observer: Option<ObserverWriter>,
    ) -> Dispatch
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let observer = observer.map(|tee| {
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_target(true)
                .with_file(self.caller)
                .with_line_number(self.caller)
                .with_ansi(false)
                .with_writer(tee)
        });

        match self.format {
            LogFormat::Json => {
                let mut make_writer = ErrorReportMakeWriter::new(writer);
                if let Some(service_context) = &self.error_report {
                    make_writer = make_writer.with_service_context(service_context.clone());
                }
                if let Some(name) = &self.name {
                    make_writer = make_writer.with_logger_name(name.clone());
                }
                let layer = fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_target(true)
                    .with_file(self.caller)
                    .with_line_number(self.caller)
                    .with_thread_names(self.thread_names)
                    .with_ansi(false)
                    .with_writer(make_writer);
                Dispatch::new(Registry::default().with(filter).with(observer).with(layer))
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_file(self.caller)
                    .with_line_number(self.caller)
                    .with_thread_names(self.thread_names)
                    .with_ansi(self.ansi)
                    .with_writer(writer);
                Dispatch::new(Registry::default().with(filter).with(observer).with(layer))
            }
            LogFormat::Full => {
                let layer = fmt::layer()
                    .with_target(true)
                    .with_file(self.caller)
                    .with_line_number(self.caller)
                    .with_thread_names(self.thread_names)
                    .with_ansi(self.ansi)
                    .with_writer(writer);
                Dispatch::new(Registry::default().with(filter).with(observer).with(layer))
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_file(self.caller)
                    .with_line_number(self.caller)
                    .with_thread_names(self.thread_names)
                    .with_ansi(self.ansi)
                    .with_writer(writer);
                Dispatch::new(Registry::default().with(filter).with(observer).with(layer))
            }
        }
    }
}
