//! # Core Configuration Module
//!
//! Provides configuration management for an audio output session.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding the bridges a controller needs plus the user-facing [`AudioConfig`]
//! settings. It enforces fail-fast validation so a player session cannot be
//! created with a missing bridge or an unusable setting.
//!
//! ## Required Dependencies
//!
//! - `DecoderContext` - Opens/closes and describes the audio stream
//! - `PlayerHost` - Playback state and controls
//! - `AudioEngine` - Default device and engine-level failure flag
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{AudioConfig, CoreConfig};
//! use bridge_traits::OutputMode;
//!
//! let config = CoreConfig::builder()
//!     .decoder(decoder)
//!     .player(player)
//!     .engine(engine)
//!     .audio(AudioConfig::default().with_output_mode(OutputMode::Exclusive))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Missing bridges produce [`Error::CapabilityMissing`] naming the bridge;
//! invalid settings produce [`Error::InvalidSetting`] naming the field.

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioBitDepth, AudioEngine, DecoderContext, OutputMode, PlayerHost};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Highest channel count accepted as an explicit override.
pub const MAX_CHANNELS: u16 = 32;

// ============================================================================
// Audio settings
// ============================================================================

/// User-facing audio settings for a player session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Whether audio output is enabled for the session.
    ///
    /// Cleared at runtime when no backend can be brought up.
    ///
    /// Default: true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Backend family to use.
    ///
    /// Default: `OutputMode::Shared`.
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Explicit output channel count; 0 lets the decoder decide.
    ///
    /// Default: 0.
    #[serde(default)]
    pub channels: u16,

    /// Sample format requested from the device.
    ///
    /// Default: 16-bit integer.
    #[serde(default)]
    pub bit_depth: AudioBitDepth,

    /// Upper bound of the volume scale (100 = unity, higher amplifies).
    ///
    /// Default: 150.
    #[serde(default = "default_volume_max")]
    pub volume_max: u32,

    /// Volume applied when the session starts; `None` means half of `volume_max`.
    ///
    /// Default: None.
    #[serde(default)]
    pub initial_volume: Option<u32>,

    /// Start playback as soon as an audio stream is enabled.
    ///
    /// Default: true.
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            output_mode: OutputMode::default(),
            channels: 0,
            bit_depth: AudioBitDepth::default(),
            volume_max: default_volume_max(),
            initial_volume: None,
            autoplay: default_autoplay(),
        }
    }
}

impl AudioConfig {
    /// Set the backend family.
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Force an output channel count (0 = automatic).
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Set the device sample format.
    pub fn with_bit_depth(mut self, bit_depth: AudioBitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Set the upper bound of the volume scale.
    pub fn with_volume_max(mut self, volume_max: u32) -> Self {
        self.volume_max = volume_max;
        self
    }

    /// Set the starting volume.
    pub fn with_initial_volume(mut self, volume: u32) -> Self {
        self.initial_volume = Some(volume);
        self
    }

    /// Enable or disable autoplay on stream enable.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Enable or disable audio output.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Volume the session starts with.
    pub fn starting_volume(&self) -> u32 {
        self.initial_volume.unwrap_or(self.volume_max / 2)
    }

    /// Master gain pushed into a freshly created backend.
    pub fn default_master_volume(&self) -> f32 {
        self.volume_max as f32 / 100.0
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.volume_max == 0 {
            return Err(Error::InvalidSetting {
                field: "volume_max",
                reason: "must be greater than 0".to_string(),
            });
        }

        if let Some(volume) = self.initial_volume {
            if volume > self.volume_max {
                return Err(Error::InvalidSetting {
                    field: "initial_volume",
                    reason: format!("{} exceeds volume_max ({})", volume, self.volume_max),
                });
            }
        }

        if self.channels > MAX_CHANNELS {
            return Err(Error::InvalidSetting {
                field: "channels",
                reason: format!("{} exceeds the maximum of {}", self.channels, MAX_CHANNELS),
            });
        }

        if let OutputMode::Custom(tag) = &self.output_mode {
            if tag.trim().is_empty() {
                return Err(Error::InvalidSetting {
                    field: "output_mode",
                    reason: "custom mode tag cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_volume_max() -> u32 {
    150
}

fn default_autoplay() -> bool {
    true
}

// ============================================================================
// Session configuration
// ============================================================================

/// Everything an output controller needs to run a player session.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Decoder context owning the audio stream (required)
    pub decoder: Arc<dyn DecoderContext>,

    /// Player driving playback (required)
    pub player: Arc<dyn PlayerHost>,

    /// Engine-wide audio facts (required)
    pub engine: Arc<dyn AudioEngine>,

    /// Audio settings
    pub audio: AudioConfig,

    /// Per-subscriber buffer of the state event bus
    pub event_buffer_size: usize,

    /// Per-subscriber buffer of the frame notification channel
    pub frame_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("decoder", &"DecoderContext { ... }")
            .field("player", &"PlayerHost { ... }")
            .field("engine", &"AudioEngine { ... }")
            .field("audio", &self.audio)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("frame_buffer_size", &self.frame_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.frame_buffer_size == 0 {
            return Err(Error::Config(
                "Frame buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    decoder: Option<Arc<dyn DecoderContext>>,
    player: Option<Arc<dyn PlayerHost>>,
    engine: Option<Arc<dyn AudioEngine>>,
    audio: Option<AudioConfig>,
    event_buffer_size: Option<usize>,
    frame_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the decoder context (required).
    pub fn decoder(mut self, decoder: Arc<dyn DecoderContext>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the player host (required).
    pub fn player(mut self, player: Arc<dyn PlayerHost>) -> Self {
        self.player = Some(player);
        self
    }

    /// Sets the audio engine (required).
    pub fn engine(mut self, engine: Arc<dyn AudioEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the audio settings (defaults to [`AudioConfig::default`]).
    pub fn audio(mut self, audio: AudioConfig) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Sets the state event buffer size (default 100).
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Sets the frame notification buffer size (default 16).
    pub fn frame_buffer_size(mut self, size: usize) -> Self {
        self.frame_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required bridge is missing (DecoderContext, PlayerHost, AudioEngine)
    /// - A setting is invalid
    pub fn build(self) -> Result<CoreConfig> {
        let decoder = self.decoder.ok_or_else(|| {
            missing(
                "DecoderContext",
                "A decoder context is required to open and describe the audio stream. \
                 Inject the player's decoder through .decoder().",
            )
        })?;

        let player = self.player.ok_or_else(|| {
            missing(
                "PlayerHost",
                "A player host is required to resync and resume playback. \
                 Inject it through .player().",
            )
        })?;

        let engine = self.engine.ok_or_else(|| {
            missing(
                "AudioEngine",
                "An audio engine is required to resolve the default device. \
                 Inject it through .engine().",
            )
        })?;

        let config = CoreConfig {
            decoder,
            player,
            engine,
            audio: self.audio.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            frame_buffer_size: self.frame_buffer_size.unwrap_or(16),
        };

        config.validate()?;

        Ok(config)
    }
}
