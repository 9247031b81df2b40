//! Stream state mirrored from the decoder.

use bridge_traits::AudioStreamInfo;
use serde::{Deserialize, Serialize};

/// Format and counters of the current audio stream as last seen by the
/// controller.
///
/// The controller owns the only mutable copy; callers receive clones taken
/// under the controller lock, so a snapshot is never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamStateSnapshot {
    /// Container stream index; -1 when no stream is selected
    pub stream_index: i32,
    pub codec: String,
    /// Average bitrate in kbps
    pub bit_rate: f64,
    pub bit_depth: u16,
    /// Source channel count
    pub channels: u16,
    pub channel_layout: String,
    pub sample_format: String,
    /// Sample rate in Hz; kept across a reset
    pub sample_rate: u32,
    /// Frames handed to the output since the last refresh
    pub frames_displayed: u64,
    /// Frames the player skipped since the last refresh
    pub frames_dropped: u64,
    /// `true` while the decoder's audio stream is open
    pub is_open: bool,
}

impl Default for StreamStateSnapshot {
    fn default() -> Self {
        Self {
            stream_index: -1,
            codec: String::new(),
            bit_rate: 0.0,
            bit_depth: 0,
            channels: 0,
            channel_layout: String::new(),
            sample_format: String::new(),
            sample_rate: 0,
            frames_displayed: 0,
            frames_dropped: 0,
            is_open: false,
        }
    }
}

impl StreamStateSnapshot {
    /// Copy the decoder's view of the stream and restart the frame counters.
    pub fn apply(&mut self, info: &AudioStreamInfo, is_open: bool) {
        self.stream_index = info.stream_index;
        self.codec = info.codec.clone();
        self.bit_rate = info.bit_rate;
        self.bit_depth = info.bit_depth;
        self.channels = info.channels;
        self.channel_layout = info.channel_layout.clone();
        self.sample_format = info.sample_format.clone();
        self.sample_rate = info.sample_rate;
        self.is_open = is_open;
        self.clear_counters();
    }

    /// Forget the stream. The sample rate survives so a reopen of the same
    /// format does not force a device re-open.
    pub fn reset(&mut self) {
        *self = Self {
            sample_rate: self.sample_rate,
            frames_displayed: self.frames_displayed,
            frames_dropped: self.frames_dropped,
            ..Self::default()
        };
    }

    pub fn clear_counters(&mut self) {
        self.frames_displayed = 0;
        self.frames_dropped = 0;
    }

    /// `true` when the stream is open with a usable sample rate.
    pub fn is_playable(&self) -> bool {
        self.is_open && self.sample_rate > 0
    }
}
