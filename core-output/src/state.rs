//! Lifecycle state of an output controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a controller is in its open/close lifecycle.
///
/// ```text
/// Closed ──enable──▶ Opening ──▶ Open | OpenDegraded
///                                   │        ▲
///                     mode/device/format change
///                                   ▼        │
///                              Reconfiguring
/// Open | OpenDegraded ──disable──▶ Closing ──▶ Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputState {
    /// No audio stream is open.
    #[default]
    Closed,
    /// Enable is asking the decoder for a stream.
    Opening,
    /// Stream open and a backend is live.
    Open,
    /// Stream open but no backend is live (not initialized yet, or audio
    /// disabled after a failure).
    OpenDegraded,
    /// A backend is being created or re-opened.
    Reconfiguring,
    /// Disable is closing the decoder's stream.
    Closing,
}

impl OutputState {
    /// The state a controller settles in once no operation is in flight.
    pub fn resting(stream_open: bool, backend_live: bool) -> Self {
        match (stream_open, backend_live) {
            (false, _) => OutputState::Closed,
            (true, true) => OutputState::Open,
            (true, false) => OutputState::OpenDegraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputState::Closed => "closed",
            OutputState::Opening => "opening",
            OutputState::Open => "open",
            OutputState::OpenDegraded => "open_degraded",
            OutputState::Reconfiguring => "reconfiguring",
            OutputState::Closing => "closing",
        }
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
