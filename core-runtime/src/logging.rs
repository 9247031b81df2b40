//! # Logging & Tracing Infrastructure
//!
//! Structured logging for the audio output core, built on `tracing`:
//! - pretty, JSON and compact output on stderr
//! - per-crate filtering, overridable from the environment
//! - forwarding to the host's [`LoggerSink`]
//!
//! ## Session spans
//!
//! Every output controller logs inside an `audio_output{session=..}` span.
//! Entries forwarded to the sink carry the fields of the spans they were
//! recorded in, so a host can tell player sessions apart without parsing
//! the formatted output. Fields recorded on the event itself take
//! precedence over inherited span fields.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LoggingConfig};
//! use bridge_traits::time::{ConsoleLogger, LogLevel};
//! use std::sync::Arc;
//!
//! let config = LoggingConfig::from_env()
//!     .with_level(LogLevel::Debug)
//!     .with_logger_sink(Arc::new(ConsoleLogger::default()));
//!
//! init_logging(config)?;
//! ```
//!
//! ## Sink delivery
//!
//! Inside a tokio runtime the forward is spawned; otherwise it is driven to
//! completion on the logging thread. The sample thread logs at `debug` and
//! `trace` only, so a sink kept at `info` never blocks it.

use crate::error::{Error, Result};

use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::format::FmtSpan,
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

/// Environment variable holding a filter directive that replaces the default.
pub const LOG_FILTER_ENV: &str = "AUDIO_OUTPUT_LOG";

/// Environment variable selecting the output format (`pretty`, `json`, `compact`).
pub const LOG_FORMAT_ENV: &str = "AUDIO_OUTPUT_LOG_FORMAT";

/// Crates covered by the default filter.
const CORE_TARGETS: [&str; 4] = [
    "core_output",
    "core_runtime",
    "bridge_traits",
    "audio_output_workspace",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// One JSON object per line
    Json,
    /// Single-line output
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Compact
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(Error::InvalidSetting {
                field: "log_format",
                reason: format!("unknown format `{}`", other),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        })
    }
}

/// Logging configuration
#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level applied to the core crates by the default filter
    pub level: LogLevel,
    /// Filter directive replacing the default (e.g. "core_output=trace,warn")
    pub filter: Option<String>,
    /// Host transport receiving a copy of every event
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Emit span open/close events
    pub enable_spans: bool,
    pub display_target: bool,
    /// Thread ids and names, to tell the sample thread from the control path
    pub display_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            logger_sink: None,
            enable_spans: false,
            display_target: true,
            display_thread_info: false,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("logger_sink", &self.logger_sink.is_some())
            .field("enable_spans", &self.enable_spans)
            .field("display_target", &self.display_target)
            .field("display_thread_info", &self.display_thread_info)
            .finish()
    }
}

impl LoggingConfig {
    /// Defaults overridden by [`LOG_FILTER_ENV`] and [`LOG_FORMAT_ENV`].
    ///
    /// An unparsable format is ignored with a note on stderr, since the
    /// logger that would report it is not installed yet.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(filter) = std::env::var(LOG_FILTER_ENV) {
            if !filter.trim().is_empty() {
                config.filter = Some(filter);
            }
        }

        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            match format.parse() {
                Ok(format) => config.format = format,
                Err(err) => eprintln!("Ignoring {}: {}", LOG_FORMAT_ENV, err),
            }
        }

        config
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.enable_spans = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }

    pub fn with_thread_info(mut self, display: bool) -> Self {
        self.display_thread_info = display;
        self
    }

    /// Filter directive this configuration installs.
    pub fn filter_directive(&self) -> String {
        if let Some(custom) = &self.filter {
            return custom.clone();
        }

        let level = self.level.as_str().to_ascii_lowercase();
        let targets: Vec<String> = CORE_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect();
        format!("warn,{}", targets.join(","))
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`Error::Config`] if the filter does not parse or a global
/// subscriber is already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    tracing_subscriber::registry()
        .with(fmt_layer(&config))
        .with(LoggerSinkLayer::new(config.logger_sink.clone()))
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(config.filter_directive())
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

fn fmt_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_target(config.display_target)
        .with_thread_ids(config.display_thread_info)
        .with_thread_names(config.display_thread_info)
        .with_writer(io::stderr);

    match config.format {
        LogFormat::Pretty => layer.pretty().with_span_events(span_events).boxed(),
        LogFormat::Compact => layer.compact().with_span_events(span_events).boxed(),
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(config.enable_spans)
            .boxed(),
    }
}

// ============================================================================
// LoggerSink forwarding
// ============================================================================

/// Fields recorded on a span, kept in the span's extensions.
#[derive(Default)]
struct SpanFields(HashMap<String, String>);

/// Layer that forwards events to a `LoggerSink` implementation.
struct LoggerSinkLayer {
    sink: Option<Arc<dyn LoggerSink>>,
}

impl LoggerSinkLayer {
    fn new(sink: Option<Arc<dyn LoggerSink>>) -> Self {
        Self { sink }
    }
}

impl<S> Layer<S> for LoggerSinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        if self.sink.is_none() {
            return;
        }
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<SpanFields>() {
            fields.0.extend(visitor.fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        let metadata = event.metadata();
        let level = sink_level(metadata.level());
        if level < sink.min_level() {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = visitor
            .message
            .take()
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);
        entry.fields = visitor.fields;

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if entry.span_id.is_none() {
                    entry.span_id = Some(span.name().to_string());
                }
                if let Some(fields) = span.extensions().get::<SpanFields>() {
                    for (key, value) in &fields.0 {
                        entry
                            .fields
                            .entry(key.clone())
                            .or_insert_with(|| value.clone());
                    }
                }
            }
        }

        deliver(Arc::clone(sink), entry);
    }
}

fn deliver(sink: Arc<dyn LoggerSink>, entry: LogEntry) {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(async move {
            if let Err(err) = sink.log(entry).await {
                eprintln!("LoggerSink error: {}", err);
            }
        });
        return;
    }

    if let Err(err) = futures::executor::block_on(sink.log(entry)) {
        eprintln!("LoggerSink error: {}", err);
    }
}

/// Collects event and span fields as strings.
///
/// Numbers, booleans and errors reach `record_debug` through the default
/// `Visit` methods, which renders them the same as `Display` would.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{:?}", value));
    }
}

impl FieldVisitor {
    fn store(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            name => {
                self.fields.insert(name.to_owned(), value);
            }
        }
    }
}

fn sink_level(level: &tracing::Level) -> LogLevel {
    if *level == tracing::Level::ERROR {
        LogLevel::Error
    } else if *level == tracing::Level::WARN {
        LogLevel::Warn
    } else if *level == tracing::Level::INFO {
        LogLevel::Info
    } else if *level == tracing::Level::DEBUG {
        LogLevel::Debug
    } else {
        LogLevel::Trace
    }
}
