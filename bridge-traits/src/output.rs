//! Audio output bridge traits and supporting types.
//!
//! These abstractions describe what a host must provide for the core output
//! controller to drive a sound device: the backend contract implemented by
//! each OS-specific output family, the endpoint identity used to pick a
//! device, and the engine-level facts (default device, global failure flag)
//! that live outside any single player session.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of the sentinel endpoint that always maps to the system default
/// device without enumerating devices.
pub const DEFAULT_DEVICE_ID: &str = "default";

/// Tag selecting a backend family.
///
/// `Shared` is the designated fallback mode: a host must register it before
/// any controller initializes, and the controller falls back to it whenever
/// the requested mode is missing or fails to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Shared device access through the OS mixer.
    Shared,
    /// Exclusive device access (bit-perfect, bypasses the OS mixer).
    Exclusive,
    /// Embedder-defined backend family.
    Custom(String),
}

impl OutputMode {
    /// The mode that is always attempted when the requested one is unavailable.
    pub const FALLBACK: OutputMode = OutputMode::Shared;

    /// Returns `true` if this is the designated fallback mode.
    pub fn is_fallback(&self) -> bool {
        *self == Self::FALLBACK
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Shared => write!(f, "shared"),
            OutputMode::Exclusive => write!(f, "exclusive"),
            OutputMode::Custom(tag) => write!(f, "custom:{}", tag),
        }
    }
}

/// An output device as reported by the host's device enumeration.
///
/// Endpoints are immutable values compared by `id` only; the display name is
/// informational and may differ between enumerations of the same device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioEndpoint {
    /// Platform-specific device identifier
    pub id: String,
    /// Human-readable device name
    pub name: String,
}

impl AudioEndpoint {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The sentinel endpoint standing for "whatever the system default is".
    pub fn system_default() -> Self {
        Self::new(DEFAULT_DEVICE_ID, "Default")
    }

    /// Returns `true` if this is the sentinel default endpoint.
    pub fn is_system_default(&self) -> bool {
        self.id == DEFAULT_DEVICE_ID
    }
}

impl PartialEq for AudioEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AudioEndpoint {}

impl fmt::Display for AudioEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.name)
    }
}

/// Sample format requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioBitDepth {
    #[default]
    Int16,
    Int24,
    Int32,
    Float32,
}

impl AudioBitDepth {
    /// Bits occupied by one sample of this format.
    pub fn bits(&self) -> u16 {
        match self {
            AudioBitDepth::Int16 => 16,
            AudioBitDepth::Int24 => 24,
            AudioBitDepth::Int32 | AudioBitDepth::Float32 => 32,
        }
    }
}

/// Backend contract implemented by every output family.
///
/// An instance is exclusively owned by one output controller, which
/// serializes every call under its own lock. Dropping the instance releases
/// the device; drop must be safe after a failed `open` and after the device
/// disappeared.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::output::{AudioOutput, AudioEndpoint, AudioBitDepth};
///
/// fn start(output: &mut dyn AudioOutput) -> bridge_traits::error::Result<()> {
///     output.set_volume(75);
///     output.open(48_000, 2, AudioBitDepth::Int16, &AudioEndpoint::system_default())
/// }
/// ```
pub trait AudioOutput: Send {
    /// Open (or re-open) the device with the given format.
    ///
    /// May fail; must not block indefinitely.
    fn open(
        &mut self,
        sample_rate: u32,
        channels: u16,
        bit_depth: AudioBitDepth,
        device: &AudioEndpoint,
    ) -> Result<()>;

    /// Queue raw interleaved PCM bytes for playback.
    ///
    /// Fails when the device has gone away.
    fn push_samples(&mut self, data: &[u8]) -> Result<()>;

    /// Discard any buffered audio. Must not fail.
    fn clear(&mut self);

    /// Audio queued in the backend but not played yet.
    fn buffered_duration(&self) -> Duration;

    /// Latency between submission and audible output reported by the device.
    fn device_delay(&self) -> Duration;

    /// Current volume on the player's scale (0 ..= configured maximum).
    fn volume(&self) -> u32;

    fn set_volume(&mut self, volume: u32);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Gain applied on top of the volume (1.0 = unity).
    fn master_volume(&self) -> f32;

    fn set_master_volume(&mut self, gain: f32);
}

/// Engine-wide audio facts shared by every player session.
pub trait AudioEngine: Send + Sync {
    /// `true` when the engine could not bring up audio at all (no audio
    /// subsystem, failed device enumeration at startup).
    fn failed(&self) -> bool;

    /// The device currently acting as the system default.
    fn default_device(&self) -> AudioEndpoint {
        AudioEndpoint::system_default()
    }
}
