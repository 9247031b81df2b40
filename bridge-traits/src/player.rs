//! Player-side bridge used by the output controller.

/// The player owning an output controller.
///
/// Only the handful of playback controls the audio path needs when a stream
/// is enabled or disabled are exposed here.
pub trait PlayerHost: Send + Sync {
    /// `true` while playback is running.
    fn is_playing(&self) -> bool;

    /// Re-align the freshly opened audio stream with the current playback
    /// position.
    fn resync_audio(&self);

    /// Start (or resume) playback.
    fn play(&self);

    /// Called after the audio stream was closed so the player can pick a new
    /// main demuxer and update whether anything is left to play.
    fn audio_closed(&self);
}
