//! # Host Bridge Traits
//!
//! Contracts that must be implemented by the application embedding the audio
//! output core.
//!
//! ## Overview
//!
//! This crate defines the boundary between the core output controller and
//! everything it does not own: OS-specific output backends, the decoder that
//! produces the audio stream, the player that drives playback and the host's
//! logging transport.
//!
//! ## Traits
//!
//! ### Audio output
//! - [`AudioOutput`](output::AudioOutput) - Backend contract (open, push, clear, volume)
//! - [`AudioEngine`](output::AudioEngine) - Engine-wide default device and failure flag
//!
//! ### Playback integration
//! - [`DecoderContext`](decoder::DecoderContext) - Open/close and describe the audio stream
//! - [`PlayerHost`](player::PlayerHost) - Playback state and controls
//!
//! ### Utilities
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All fallible bridge calls use [`BridgeError`](error::BridgeError). The
//! output controller never propagates these to its own callers; backend
//! failures turn into a degraded (silent) state instead.
//!
//! ## Thread Safety
//!
//! Backends must be `Send` (they are moved into the controller and used from
//! both the sample thread and the control path under a lock). Every other
//! bridge must be `Send + Sync` as it is shared through `Arc`.

pub mod decoder;
pub mod error;
pub mod output;
pub mod player;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use decoder::{AudioStreamInfo, DecoderContext};
pub use output::{AudioBitDepth, AudioEndpoint, AudioEngine, AudioOutput, OutputMode};
pub use player::PlayerHost;
pub use time::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
