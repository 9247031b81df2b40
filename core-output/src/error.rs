//! # Output Error Types
//!
//! Failures raised while bringing an output backend up or feeding it samples.
//!
//! None of these escape the controller's public surface: each one is logged
//! and turned into a degraded state (audio disabled for the session, or the
//! backend buffer cleared).

use bridge_traits::OutputMode;
use thiserror::Error;

/// Errors that can occur inside the output controller.
#[derive(Error, Debug)]
pub enum OutputError {
    /// The decoder reported a format change without a usable sample rate.
    #[error("Sample rate of audio stream {stream_index} could not be determined")]
    FormatUnresolved { stream_index: i32 },

    /// No factory is registered for the requested mode (nor for the fallback).
    #[error("No output backend registered for mode `{0}`")]
    BackendNotRegistered(OutputMode),

    /// The backend failed (or panicked) while opening the device.
    #[error("Failed to open {mode} output: {reason}")]
    BackendOpenFailed { mode: OutputMode, reason: String },

    /// The backend failed while accepting samples, usually because the device
    /// was removed.
    #[error("Audio device lost: {0}")]
    DeviceLost(String),
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
