//! Decoder-side bridge used by the output controller.
//!
//! Demuxing, decoding and format discovery happen in the host's decoder
//! context. The controller only needs to ask it to open/close the audio
//! stream and to read back what it currently reports.

use serde::{Deserialize, Serialize};

/// Format and metrics of the decoder's current audio stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    /// Index of the stream inside its container
    pub stream_index: i32,
    /// Codec name (e.g. "aac", "flac")
    pub codec: String,
    /// Average bitrate in kbps
    pub bit_rate: f64,
    /// Bits per sample of the source
    pub bit_depth: u16,
    /// Channel count of the source
    pub channels: u16,
    /// Channel layout description (e.g. "stereo", "5.1(side)")
    pub channel_layout: String,
    /// Sample format description (e.g. "fltp", "s16")
    pub sample_format: String,
    /// Sample rate in Hz; 0 when it could not be determined without probing
    pub sample_rate: u32,
}

impl AudioStreamInfo {
    /// Returns `true` if the stream reports a usable sample rate.
    pub fn has_sample_rate(&self) -> bool {
        self.sample_rate > 0
    }
}

/// Host decoder context driving the audio stream.
///
/// Calls are made from the control path without holding the controller
/// lock, so implementations may call back into the controller (for example
/// to report a codec change through `refresh(true)`).
pub trait DecoderContext: Send + Sync {
    /// Information about the currently selected audio stream, if any.
    fn audio_stream(&self) -> Option<AudioStreamInfo>;

    /// `true` while the audio decoder for the current stream is open.
    fn is_audio_decoder_open(&self) -> bool;

    /// Channel count the audio decoder converts to, when it has one.
    fn output_channels(&self) -> Option<u16>;

    /// Open the audio stream that best matches the user's preferences.
    fn open_suggested_audio(&self);

    /// Close the current audio stream.
    fn close_audio(&self);

    /// Rebuild the decoder's output conversion after the device format changed.
    fn reconfigure_output(&self) {}
}
