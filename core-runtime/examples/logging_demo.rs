//! Logging system demonstration
//!
//! Shows the log formats, the session span layout used by output controllers
//! and forwarding to a host `LoggerSink`.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run -p core-runtime --example logging_demo
//!
//! # JSON format
//! cargo run -p core-runtime --example logging_demo -- json
//!
//! # Compact format with a custom filter
//! cargo run -p core-runtime --example logging_demo -- compact "logging_demo=trace"
//! ```

use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, span, trace, warn, Level};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace)
        .with_spans(true)
        .with_target(true)
        .with_thread_info(true)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(err) = init_logging(config) {
        eprintln!("Failed to initialize logging: {}", err);
        return;
    }

    info!("=== Logging System Demo ===");
    info!(format = ?format, "Logging initialized");

    demo_log_levels();
    demo_session_span();
    demo_instrumentation().await;

    // Give the sink tasks a moment to drain.
    tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    info!("=== Demo Complete ===");
}

/// The level each kind of output event is logged at.
fn demo_log_levels() {
    let span = span!(Level::INFO, "log_levels");
    let _enter = span.enter();

    trace!(timestamp_ms = 1_520, "Presenting audio frame");
    debug!(error = "device removed", "Submitting samples failed");
    info!(sample_rate = 48_000, channels = 2, "Initializing audio output");
    warn!(mode = "exclusive", "Output mode not registered, trying shared");
    error!(reason = "shared device refused the format", "Audio disabled for this session");
}

/// Every controller logs inside its own session span.
fn demo_session_span() {
    let session = span!(Level::INFO, "audio_output", session = "4f1c2a9e");
    let _enter = session.enter();

    info!(device = "{speakers}:Speakers", mode = "shared", "Initializing audio output");

    {
        let backend = span!(Level::DEBUG, "wasapi_shared");
        let _inner = backend.enter();
        debug!(buffer_ms = 40, "Device opened");
    }

    info!(device = "{headphones}:Headphones", "Switching output device");
}

#[instrument]
async fn demo_instrumentation() {
    info!("Instrumented functions create spans automatically");
    reopen_device(44_100, 6).await;
}

#[instrument(fields(ticks_per_sample = 10_000_000.0 / sample_rate as f64))]
async fn reopen_device(sample_rate: u32, channels: u16) {
    debug!("Re-opening device");
    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    info!("Device re-opened");
}
