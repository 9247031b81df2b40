//! # Audio Output Controller
//!
//! Owns the output backend of one player session and keeps it in step with
//! the decoder's audio stream.
//!
//! ## Overview
//!
//! The controller is driven from two sides:
//! - the **control path** (player, decoder, UI) enabling/disabling the
//!   stream, reporting format changes and changing device, mode or levels
//! - the **sample path** handing decoded frames to [`AudioController::add_samples`]
//!
//! A single `parking_lot::Mutex` serializes both. Backends are created,
//! opened, fed and dropped only while that lock is held, so a sample push can
//! never reach a backend that a concurrent re-initialization has released.
//!
//! Bridge calls into the decoder and the player are made with the lock
//! released: the decoder is allowed to call [`AudioController::refresh`]
//! from inside `open_suggested_audio` or `close_audio`.
//!
//! ## Failure policy
//!
//! No operation returns an error. A backend that cannot be created or opened
//! falls back to the shared mode on the default device; if that fails too,
//! audio is disabled for the session and the stream keeps running silently.
//! A failed sample push clears the backend buffer and playback continues.
//!
//! ## Volume and mute
//!
//! Volume and mute are two views of one audible level: setting the volume
//! to 0 mutes, and setting a nonzero volume while muted unmutes.

use crate::error::{OutputError, Result};
use crate::frame::AudioFrame;
use crate::registry::OutputRegistry;
use crate::snapshot::StreamStateSnapshot;
use crate::state::OutputState;
use bridge_traits::{
    AudioBitDepth, AudioEndpoint, AudioEngine, AudioOutput, DecoderContext, OutputMode,
    PlayerHost,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, OutputEvent, StreamEvent};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace, warn, Span};
use uuid::Uuid;

/// Channel count used when neither the configuration nor the decoder names one.
pub const DEFAULT_CHANNELS: u16 = 2;

/// Master gain reported while no backend is live.
pub const NEUTRAL_MASTER_VOLUME: f32 = 1.0;

/// 100 ns ticks per millisecond, times 1000.
const TICKS_PER_SECOND: f64 = 1000.0 * 10000.0;

/// Duration ticks per sample at `sample_rate`.
pub fn timebase_for(sample_rate: u32) -> f64 {
    TICKS_PER_SECOND / sample_rate as f64
}

/// Output channel count: explicit override, then the decoder's, then stereo.
pub fn resolve_channels(channels_override: u16, decoder_channels: Option<u16>) -> u16 {
    if channels_override > 0 {
        return channels_override;
    }
    decoder_channels
        .filter(|channels| *channels > 0)
        .unwrap_or(DEFAULT_CHANNELS)
}

struct LiveOutput {
    mode: OutputMode,
    output: Box<dyn AudioOutput>,
}

#[derive(Clone, Copy)]
struct Levels {
    volume: u32,
    muted: bool,
    master_volume: f32,
}

struct Inner {
    live: Option<LiveOutput>,
    configured_mode: OutputMode,
    device: AudioEndpoint,
    channels_override: u16,
    enabled: bool,
    volume: u32,
    muted: bool,
    master_volume: f32,
    timebase: f64,
    last_initialized_sample_rate: Option<u32>,
    snapshot: StreamStateSnapshot,
    state: OutputState,
}

impl Inner {
    fn levels(&self) -> Levels {
        Levels {
            volume: self.volume,
            muted: self.muted,
            master_volume: self.master_volume,
        }
    }

    fn needs_initialize(&self, sample_rate: u32) -> bool {
        self.last_initialized_sample_rate != Some(sample_rate)
            || self
                .live
                .as_ref()
                .is_some_and(|live| live.mode != self.configured_mode)
    }
}

/// Audio output controller of one player session.
pub struct AudioController {
    decoder: Arc<dyn DecoderContext>,
    player: Arc<dyn PlayerHost>,
    engine: Arc<dyn AudioEngine>,
    registry: Arc<OutputRegistry>,
    events: EventBus,
    frames: broadcast::Sender<AudioFrame>,
    span: Span,
    session_id: Uuid,
    volume_max: u32,
    bit_depth: AudioBitDepth,
    autoplay: bool,
    inner: Mutex<Inner>,
}

impl AudioController {
    /// Create a controller publishing on its own event bus.
    pub fn new(config: CoreConfig, registry: Arc<OutputRegistry>) -> Self {
        let events = EventBus::new(config.event_buffer_size);
        Self::with_event_bus(config, registry, events)
    }

    /// Create a controller publishing on a bus shared with the host.
    pub fn with_event_bus(config: CoreConfig, registry: Arc<OutputRegistry>, events: EventBus) -> Self {
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("audio_output", session = %session_id);
        let (frames, _) = broadcast::channel(config.frame_buffer_size);

        let audio = &config.audio;
        let volume = audio.starting_volume();
        let inner = Inner {
            live: None,
            configured_mode: audio.output_mode.clone(),
            device: config.engine.default_device(),
            channels_override: audio.channels,
            enabled: audio.enabled,
            volume,
            muted: volume == 0,
            master_volume: audio.default_master_volume(),
            timebase: 0.0,
            last_initialized_sample_rate: None,
            snapshot: StreamStateSnapshot::default(),
            state: OutputState::Closed,
        };

        span.in_scope(|| {
            debug!(
                mode = %inner.configured_mode,
                volume,
                volume_max = audio.volume_max,
                "Audio controller created"
            )
        });

        Self {
            decoder: config.decoder,
            player: config.player,
            engine: config.engine,
            registry,
            events,
            frames,
            span,
            session_id,
            volume_max: audio.volume_max,
            bit_depth: audio.bit_depth,
            autoplay: audio.autoplay,
            inner: Mutex::new(inner),
        }
    }

    // ------------------------------------------------------------------------
    // Stream lifecycle
    // ------------------------------------------------------------------------

    /// Open the decoder's best audio stream and resume playback if it was
    /// running or autoplay is on.
    ///
    /// When the decoder has no audio stream the controller stays `Closed`.
    pub fn enable(&self) {
        let _entered = self.span.enter();
        let was_playing = self.player.is_playing();

        {
            let mut inner = self.inner.lock();
            self.set_state(&mut inner, OutputState::Opening);
        }

        self.decoder.open_suggested_audio();
        self.player.resync_audio();
        self.refresh(false);

        if was_playing || self.autoplay {
            self.player.play();
        }
    }

    /// Close the decoder's audio stream. No-op when no stream is open.
    ///
    /// The backend stays alive until the next initialization or
    /// [`shutdown`](Self::shutdown).
    pub fn disable(&self) {
        let _entered = self.span.enter();

        {
            let mut inner = self.inner.lock();
            if !inner.snapshot.is_open {
                return;
            }
            self.set_state(&mut inner, OutputState::Closing);
        }

        self.decoder.close_audio();
        self.player.audio_closed();

        let mut inner = self.inner.lock();
        inner.snapshot.reset();
        inner.snapshot.clear_counters();
        if let Some(live) = inner.live.as_mut() {
            live.output.clear();
        }
        self.publish(CoreEvent::Stream(StreamEvent::Closed));
        self.settle(&mut inner);
        info!("Audio stream closed");
    }

    /// Mirror the decoder's current stream into the snapshot.
    ///
    /// `from_codec` marks a format change reported by the audio decoder: an
    /// unresolved sample rate closes the stream, a new sample rate or a
    /// pending mode switch re-initializes the output.
    pub fn refresh(&self, from_codec: bool) {
        let _entered = self.span.enter();

        let Some(info) = self.decoder.audio_stream() else {
            self.reset();
            return;
        };
        let is_open = self.decoder.is_audio_decoder_open();
        let decoder_channels = self.decoder.output_channels();

        let fell_back = {
            let mut inner = self.inner.lock();
            inner.snapshot.apply(&info, is_open);
            if info.has_sample_rate() {
                inner.timebase = timebase_for(info.sample_rate);
            }

            self.publish(CoreEvent::Stream(StreamEvent::Refreshed {
                stream_index: info.stream_index,
                codec: info.codec.clone(),
                sample_rate: info.sample_rate,
                channels: info.channels,
                is_open,
            }));
            debug!(
                stream_index = info.stream_index,
                codec = %info.codec,
                sample_rate = info.sample_rate,
                channels = info.channels,
                from_codec,
                "Audio stream refreshed"
            );

            if from_codec && !info.has_sample_rate() {
                self.settle(&mut inner);
                None
            } else if from_codec && inner.needs_initialize(info.sample_rate) {
                Some(self.initialize_locked(&mut inner, decoder_channels))
            } else {
                self.settle(&mut inner);
                Some(false)
            }
        };

        match fell_back {
            None => {
                let err = OutputError::FormatUnresolved {
                    stream_index: info.stream_index,
                };
                warn!(error = %err, "Closing audio stream");
                self.publish(CoreEvent::Stream(StreamEvent::FormatUnresolved {
                    stream_index: info.stream_index,
                }));
                self.disable();
            }
            Some(true) => self.decoder.reconfigure_output(),
            Some(false) => {}
        }
    }

    /// Forget the current stream and drop any buffered audio.
    ///
    /// The last sample rate is kept.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.snapshot.reset();
        if let Some(live) = inner.live.as_mut() {
            live.output.clear();
        }
        self.publish(CoreEvent::Stream(StreamEvent::Reset));
        self.settle(&mut inner);
    }

    /// (Re)create and open the backend for the current stream format.
    pub fn initialize(&self) {
        let _entered = self.span.enter();
        self.reconfigure(|_| true);
    }

    /// Release the live backend. Used on session teardown.
    pub fn shutdown(&self) {
        let _entered = self.span.enter();
        let mut inner = self.inner.lock();
        if let Some(live) = inner.live.take() {
            info!(mode = %live.mode, "Releasing output backend");
        }
        inner.last_initialized_sample_rate = None;
        self.settle(&mut inner);
    }

    // ------------------------------------------------------------------------
    // Sample path
    // ------------------------------------------------------------------------

    /// Hand a decoded frame to the backend.
    ///
    /// Never fails: a backend error clears the backend buffer and the frame
    /// is lost.
    pub fn add_samples(&self, frame: AudioFrame) {
        let mut inner = self.inner.lock();
        trace!(parent: &self.span, timestamp_ms = frame.timestamp.as_millis() as u64, "Presenting audio frame");

        inner.snapshot.frames_displayed += 1;
        let _ = self.frames.send(frame.clone());

        let Some(live) = inner.live.as_mut() else {
            return;
        };

        if let Err(reason) = guarded(|| live.output.push_samples(&frame.data)) {
            let err = OutputError::DeviceLost(reason);
            debug!(parent: &self.span, error = %err, "Submitting samples failed");
            live.output.clear();
            self.publish(CoreEvent::Output(OutputEvent::DeviceLost {
                message: err.to_string(),
            }));
        }
    }

    /// Count frames the player skipped instead of presenting.
    pub fn add_dropped_frames(&self, count: u64) {
        self.inner.lock().snapshot.frames_dropped += count;
    }

    pub fn clear_buffer(&self) {
        if let Some(live) = self.inner.lock().live.as_mut() {
            live.output.clear();
        }
    }

    /// Audio queued in the backend; zero when no backend is live.
    pub fn buffered_duration(&self) -> Duration {
        self.inner
            .lock()
            .live
            .as_ref()
            .map_or(Duration::ZERO, |live| live.output.buffered_duration())
    }

    /// Device latency; zero when no backend is live.
    pub fn device_delay(&self) -> Duration {
        self.inner
            .lock()
            .live
            .as_ref()
            .map_or(Duration::ZERO, |live| live.output.device_delay())
    }

    // ------------------------------------------------------------------------
    // Levels
    // ------------------------------------------------------------------------

    pub fn volume(&self) -> u32 {
        let inner = self.inner.lock();
        match &inner.live {
            Some(live) if !inner.muted => live.output.volume(),
            _ => inner.volume,
        }
    }

    /// Set the volume, clamped to `0..=volume_max`.
    ///
    /// 0 mutes. A nonzero value while muted unmutes.
    pub fn set_volume(&self, volume: u32) {
        let volume = volume.min(self.volume_max);
        let mut inner = self.inner.lock();

        if volume == 0 {
            self.apply_mute(&mut inner, true);
        } else if inner.muted {
            if let Some(live) = inner.live.as_mut() {
                live.output.set_volume(volume);
            }
            inner.volume = volume;
            self.apply_mute(&mut inner, false);
        } else if let Some(live) = inner.live.as_mut() {
            live.output.set_volume(volume);
        }

        inner.volume = volume;
        debug!(parent: &self.span, volume, "Volume changed");
        self.publish(CoreEvent::Output(OutputEvent::VolumeChanged { volume }));
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().muted
    }

    pub fn set_muted(&self, muted: bool) {
        let mut inner = self.inner.lock();
        self.apply_mute(&mut inner, muted);
    }

    /// Backend gain; [`NEUTRAL_MASTER_VOLUME`] when no backend is live.
    pub fn master_volume(&self) -> f32 {
        self.inner
            .lock()
            .live
            .as_ref()
            .map_or(NEUTRAL_MASTER_VOLUME, |live| live.output.master_volume())
    }

    /// Set the backend gain. The value is also used for backends created
    /// later. Negative and non-finite gains are ignored.
    pub fn set_master_volume(&self, gain: f32) {
        if !gain.is_finite() || gain < 0.0 {
            warn!(parent: &self.span, gain, "Ignoring invalid master volume");
            return;
        }

        let mut inner = self.inner.lock();
        if let Some(live) = inner.live.as_mut() {
            live.output.set_master_volume(gain);
        }
        inner.master_volume = gain;
    }

    pub fn volume_max(&self) -> u32 {
        self.volume_max
    }

    // ------------------------------------------------------------------------
    // Device, mode and settings
    // ------------------------------------------------------------------------

    pub fn device(&self) -> AudioEndpoint {
        self.inner.lock().device.clone()
    }

    /// Switch to `device`, or to the engine's default device for `None`.
    ///
    /// Selecting the device already in use is a no-op.
    pub fn set_device(&self, device: Option<AudioEndpoint>) {
        let _entered = self.span.enter();
        let default_device = self.engine.default_device();

        self.reconfigure(|inner| {
            let target = match device {
                None if inner.device == default_device => return false,
                None => default_device,
                Some(device) if device == inner.device => return false,
                Some(device) => device,
            };

            info!(device = %target, "Switching output device");
            self.publish(CoreEvent::Output(OutputEvent::DeviceChanged {
                device_id: target.id.clone(),
                device_name: target.name.clone(),
            }));
            inner.device = target;
            true
        });
    }

    /// Mode requested for new backends.
    pub fn output_mode(&self) -> OutputMode {
        self.inner.lock().configured_mode.clone()
    }

    /// Request a different backend family and re-initialize.
    pub fn set_output_mode(&self, mode: OutputMode) {
        let _entered = self.span.enter();
        self.reconfigure(|inner| {
            if inner.configured_mode == mode {
                return false;
            }
            info!(from = %inner.configured_mode, to = %mode, "Output mode changed");
            inner.configured_mode = mode;
            true
        });
    }

    /// Force the output channel count (0 = automatic) and re-open.
    pub fn set_channels_override(&self, channels: u16) {
        let _entered = self.span.enter();
        self.reconfigure(|inner| {
            if inner.channels_override == channels {
                return false;
            }
            inner.channels_override = channels;
            true
        });
    }

    /// Effective output channel count.
    pub fn channels_out(&self) -> u16 {
        let decoder_channels = self.decoder.output_channels();
        resolve_channels(self.inner.lock().channels_override, decoder_channels)
    }

    /// `false` once audio was disabled for the session.
    pub fn is_enabled(&self) -> bool {
        self.inner.lock().enabled
    }

    /// Turn audio output on or off for the session.
    ///
    /// Turning it off releases the backend; turning it on re-initializes.
    pub fn set_enabled(&self, enabled: bool) {
        let _entered = self.span.enter();
        self.reconfigure(|inner| {
            if inner.enabled == enabled {
                return false;
            }
            inner.enabled = enabled;
            if enabled {
                return true;
            }

            inner.live = None;
            inner.last_initialized_sample_rate = None;
            info!("Audio output turned off");
            self.publish(CoreEvent::Output(OutputEvent::AudioDisabled {
                reason: "turned off".to_string(),
            }));
            self.settle(inner);
            false
        });
    }

    // ------------------------------------------------------------------------
    // Queries and observers
    // ------------------------------------------------------------------------

    /// Consistent copy of the stream state.
    pub fn snapshot(&self) -> StreamStateSnapshot {
        self.inner.lock().snapshot.clone()
    }

    pub fn state(&self) -> OutputState {
        self.inner.lock().state
    }

    /// Mode of the live backend; `None` when no backend is live.
    pub fn current_mode(&self) -> Option<OutputMode> {
        self.inner.lock().live.as_ref().map(|live| live.mode.clone())
    }

    /// Duration ticks (100 ns) per millisecond of samples, scaled by the
    /// sample rate.
    pub fn timebase(&self) -> f64 {
        self.inner.lock().timebase
    }

    /// Sample rate of the last successful device open.
    pub fn last_initialized_sample_rate(&self) -> Option<u32> {
        self.inner.lock().last_initialized_sample_rate
    }

    /// State and lifecycle events of this session.
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Every frame passed to [`add_samples`](Self::add_samples), for meters
    /// and visualizers.
    pub fn subscribe_frames(&self) -> broadcast::Receiver<AudioFrame> {
        self.frames.subscribe()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Apply a settings change under the lock and re-initialize if `apply`
    /// asks for it.
    fn reconfigure<F>(&self, apply: F)
    where
        F: FnOnce(&mut Inner) -> bool,
    {
        let decoder_channels = self.decoder.output_channels();
        let fell_back = {
            let mut inner = self.inner.lock();
            apply(&mut *inner) && self.initialize_locked(&mut inner, decoder_channels)
        };

        if fell_back {
            self.decoder.reconfigure_output();
        }
    }

    /// Returns `true` when the device was opened through the fallback after
    /// the requested backend failed to open.
    fn initialize_locked(&self, inner: &mut Inner, decoder_channels: Option<u16>) -> bool {
        let fell_back = self.try_initialize(inner, decoder_channels);
        self.settle(inner);
        fell_back
    }

    fn try_initialize(&self, inner: &mut Inner, decoder_channels: Option<u16>) -> bool {
        if self.engine.failed() {
            if inner.enabled || inner.live.is_some() {
                self.disable_audio(inner, "audio engine unavailable");
            }
            return false;
        }

        if !inner.enabled {
            debug!("Audio output is off, skipping initialization");
            return false;
        }

        if !inner.snapshot.is_playable() {
            return false;
        }

        self.set_state(inner, OutputState::Reconfiguring);
        match self.bring_up(inner, decoder_channels) {
            Ok(fell_back) => fell_back,
            Err(err) => {
                self.disable_audio(inner, &err.to_string());
                false
            }
        }
    }

    fn bring_up(&self, inner: &mut Inner, decoder_channels: Option<u16>) -> Result<bool> {
        let sample_rate = inner.snapshot.sample_rate;

        let mut live = match inner.live.take() {
            Some(live) if live.mode == inner.configured_mode => live,
            stale => {
                drop(stale);
                self.create_backend(&inner.configured_mode)?
            }
        };

        let channels = resolve_channels(inner.channels_override, decoder_channels);
        inner.timebase = timebase_for(sample_rate);
        let levels = inner.levels();

        info!(
            sample_rate,
            channels,
            device = %inner.device,
            mode = %live.mode,
            "Initializing audio output"
        );

        let err = match self.open_backend(&mut live, levels, sample_rate, channels, &inner.device) {
            Ok(()) => {
                let device = inner.device.clone();
                self.mark_initialized(inner, live, sample_rate, channels, device);
                return Ok(false);
            }
            Err(err) => err,
        };

        error!(error = %err, "Output initialization failed");
        let failed_mode = live.mode.clone();
        drop(live);

        if failed_mode.is_fallback() {
            return Err(err);
        }

        let factory = self
            .registry
            .resolve(&OutputMode::FALLBACK)
            .ok_or(OutputError::BackendNotRegistered(OutputMode::FALLBACK))?;

        warn!(from = %failed_mode, "Falling back to {} output on the default device", OutputMode::FALLBACK);
        self.publish(CoreEvent::Output(OutputEvent::FallbackEngaged {
            requested: failed_mode.to_string(),
            fallback: OutputMode::FALLBACK.to_string(),
            reason: err.to_string(),
        }));

        let mut live = LiveOutput {
            mode: OutputMode::FALLBACK,
            output: factory(&self.span),
        };

        let device = self.engine.default_device();
        self.open_backend(&mut live, levels, sample_rate, channels, &device)?;
        self.mark_initialized(inner, live, sample_rate, channels, device);
        Ok(true)
    }

    fn create_backend(&self, requested: &OutputMode) -> Result<LiveOutput> {
        if let Some(factory) = self.registry.resolve(requested) {
            return Ok(LiveOutput {
                mode: requested.clone(),
                output: factory(&self.span),
            });
        }

        if requested.is_fallback() {
            return Err(OutputError::BackendNotRegistered(requested.clone()));
        }

        warn!(mode = %requested, "Output mode not registered, trying {}", OutputMode::FALLBACK);
        let factory = self
            .registry
            .resolve(&OutputMode::FALLBACK)
            .ok_or(OutputError::BackendNotRegistered(OutputMode::FALLBACK))?;

        self.publish(CoreEvent::Output(OutputEvent::FallbackEngaged {
            requested: requested.to_string(),
            fallback: OutputMode::FALLBACK.to_string(),
            reason: OutputError::BackendNotRegistered(requested.clone()).to_string(),
        }));

        Ok(LiveOutput {
            mode: OutputMode::FALLBACK,
            output: factory(&self.span),
        })
    }

    fn open_backend(
        &self,
        live: &mut LiveOutput,
        levels: Levels,
        sample_rate: u32,
        channels: u16,
        device: &AudioEndpoint,
    ) -> Result<()> {
        let output = &mut live.output;
        output.set_volume(levels.volume);
        output.set_muted(levels.muted);
        output.set_master_volume(levels.master_volume);

        guarded(|| output.open(sample_rate, channels, self.bit_depth, device)).map_err(|reason| {
            OutputError::BackendOpenFailed {
                mode: live.mode.clone(),
                reason,
            }
        })
    }

    fn mark_initialized(
        &self,
        inner: &mut Inner,
        live: LiveOutput,
        sample_rate: u32,
        channels: u16,
        device: AudioEndpoint,
    ) {
        self.publish(CoreEvent::Output(OutputEvent::Initialized {
            mode: live.mode.to_string(),
            device_id: device.id,
            sample_rate,
            channels,
        }));
        inner.last_initialized_sample_rate = Some(sample_rate);
        inner.live = Some(live);
    }

    fn disable_audio(&self, inner: &mut Inner, reason: &str) {
        inner.live = None;
        inner.last_initialized_sample_rate = None;
        inner.enabled = false;
        error!(reason, "Audio disabled for this session");
        self.publish(CoreEvent::Output(OutputEvent::AudioDisabled {
            reason: reason.to_string(),
        }));
    }

    fn apply_mute(&self, inner: &mut Inner, muted: bool) {
        if let Some(live) = inner.live.as_mut() {
            live.output.set_muted(muted);
            // Unmuted, the backend level is audible again; keep the cache on it.
            if !muted {
                inner.volume = live.output.volume();
            }
        }
        if inner.muted != muted {
            inner.muted = muted;
            self.publish(CoreEvent::Output(OutputEvent::MuteChanged { muted }));
        }
    }

    fn settle(&self, inner: &mut Inner) {
        let resting = OutputState::resting(inner.snapshot.is_open, inner.live.is_some());
        self.set_state(inner, resting);
    }

    fn set_state(&self, inner: &mut Inner, to: OutputState) {
        if inner.state == to {
            return;
        }
        let from = std::mem::replace(&mut inner.state, to);
        debug!(parent: &self.span, %from, %to, "Output state changed");
        self.publish(CoreEvent::Output(OutputEvent::StateChanged {
            from: from.to_string(),
            to: to.to_string(),
        }));
    }

    fn publish(&self, event: CoreEvent) {
        self.events.emit(event);
    }
}

impl fmt::Debug for AudioController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AudioController")
            .field("session_id", &self.session_id)
            .field("state", &inner.state)
            .field("configured_mode", &inner.configured_mode)
            .field("current_mode", &inner.live.as_ref().map(|live| &live.mode))
            .field("device", &inner.device)
            .field("enabled", &inner.enabled)
            .finish()
    }
}

/// Run a backend call, turning both errors and panics into a message.
fn guarded<T>(call: impl FnOnce() -> bridge_traits::error::Result<T>) -> std::result::Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("backend panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("backend panicked: {}", message)
    } else {
        "backend panicked".to_string()
    }
}
