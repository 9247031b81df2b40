//! Fakes shared by the controller integration tests.

#![allow(dead_code)]

use bridge_traits::error::Result;
use bridge_traits::{
    AudioBitDepth, AudioEndpoint, AudioEngine, AudioOutput, AudioStreamInfo, BridgeError,
    DecoderContext, OutputMode, PlayerHost,
};
use core_output::{AudioController, OutputFactory, OutputRegistry};
use core_runtime::config::{AudioConfig, CoreConfig};
use mockall::mock;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tracing::Span;

// ============================================================================
// Backend fake
// ============================================================================

/// How a fake backend reacts to `open` and `push_samples`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Healthy,
    FailOpen,
    PanicOpen,
    FailPush,
}

#[derive(Debug, Clone)]
pub struct OpenCall {
    pub backend: usize,
    pub mode: OutputMode,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: AudioBitDepth,
    pub device: AudioEndpoint,
    pub volume: u32,
    pub muted: bool,
    pub master_volume: f32,
}

/// Everything the fake backends did, in order.
#[derive(Debug, Default)]
pub struct BackendLog {
    pub created: Vec<OutputMode>,
    pub disposed: Vec<usize>,
    pub opens: Vec<OpenCall>,
    pub pushes: Vec<(usize, usize)>,
    pub clears: usize,
    pub volumes: Vec<(usize, u32)>,
    pub mutes: Vec<(usize, bool)>,
    pub violations: Vec<String>,
    pub max_live: usize,
    live: HashSet<usize>,
}

impl BackendLog {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

pub type SharedLog = Arc<Mutex<BackendLog>>;

pub struct FakeOutput {
    id: usize,
    mode: OutputMode,
    behavior: Behavior,
    log: SharedLog,
    volume: u32,
    muted: bool,
    master_volume: f32,
    buffered: Duration,
}

impl FakeOutput {
    fn new(mode: OutputMode, behavior: Behavior, log: SharedLog) -> Self {
        let id = {
            let mut log = log.lock();
            let id = log.created.len();
            log.created.push(mode.clone());
            log.live.insert(id);
            if log.live.len() > 1 {
                let message = format!("{} backends live at once", log.live.len());
                log.violations.push(message);
            }
            log.max_live = log.max_live.max(log.live.len());
            id
        };

        Self {
            id,
            mode,
            behavior,
            log,
            volume: 0,
            muted: false,
            master_volume: 1.0,
            buffered: Duration::ZERO,
        }
    }

    fn check_live(&self, call: &str) {
        let mut log = self.log.lock();
        if !log.live.contains(&self.id) {
            log.violations.push(format!("{} on released backend {}", call, self.id));
        }
    }
}

impl AudioOutput for FakeOutput {
    fn open(
        &mut self,
        sample_rate: u32,
        channels: u16,
        bit_depth: AudioBitDepth,
        device: &AudioEndpoint,
    ) -> Result<()> {
        self.check_live("open");
        self.log.lock().opens.push(OpenCall {
            backend: self.id,
            mode: self.mode.clone(),
            sample_rate,
            channels,
            bit_depth,
            device: device.clone(),
            volume: self.volume,
            muted: self.muted,
            master_volume: self.master_volume,
        });

        match self.behavior {
            Behavior::FailOpen => Err(BridgeError::FormatRejected {
                sample_rate,
                channels,
                reason: format!("{} device refused the format", self.mode),
            }),
            Behavior::PanicOpen => panic!("{} driver crashed", self.mode),
            Behavior::Healthy | Behavior::FailPush => Ok(()),
        }
    }

    fn push_samples(&mut self, data: &[u8]) -> Result<()> {
        self.check_live("push_samples");
        self.log.lock().pushes.push((self.id, data.len()));

        if self.behavior == Behavior::FailPush {
            return Err(BridgeError::DeviceUnavailable("device removed".into()));
        }
        self.buffered += Duration::from_millis(10);
        Ok(())
    }

    fn clear(&mut self) {
        self.check_live("clear");
        self.log.lock().clears += 1;
        self.buffered = Duration::ZERO;
    }

    fn buffered_duration(&self) -> Duration {
        self.buffered
    }

    fn device_delay(&self) -> Duration {
        Duration::from_millis(30)
    }

    fn volume(&self) -> u32 {
        self.volume
    }

    fn set_volume(&mut self, volume: u32) {
        self.log.lock().volumes.push((self.id, volume));
        self.volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.log.lock().mutes.push((self.id, muted));
        self.muted = muted;
    }

    fn master_volume(&self) -> f32 {
        self.master_volume
    }

    fn set_master_volume(&mut self, gain: f32) {
        self.master_volume = gain;
    }
}

impl Drop for FakeOutput {
    fn drop(&mut self) {
        let mut log = self.log.lock();
        if !log.live.remove(&self.id) {
            log.violations.push(format!("backend {} released twice", self.id));
        }
        log.disposed.push(self.id);
    }
}

pub fn fake_factory(mode: OutputMode, behavior: Behavior, log: &SharedLog) -> OutputFactory {
    let log = Arc::clone(log);
    Arc::new(move |_: &Span| {
        Box::new(FakeOutput::new(mode.clone(), behavior, Arc::clone(&log))) as Box<dyn AudioOutput>
    })
}

// ============================================================================
// Decoder fake
// ============================================================================

#[derive(Debug, Default)]
struct DecoderState {
    stream: Option<AudioStreamInfo>,
    open: bool,
    output_channels: Option<u16>,
    suggested: Option<AudioStreamInfo>,
    opens: usize,
    closes: usize,
    reconfigures: usize,
}

/// Decoder whose stream is set by the test.
///
/// When attached to a controller it reports format changes back through
/// `refresh(true)` the way a real audio decoder does after opening a codec.
#[derive(Default)]
pub struct FakeDecoder {
    state: Mutex<DecoderState>,
    controller: OnceLock<Weak<AudioController>>,
}

impl FakeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select and open `info` as the current stream.
    pub fn open_stream(&self, info: AudioStreamInfo) {
        let mut state = self.state.lock();
        state.stream = Some(info);
        state.open = true;
    }

    /// Stream returned by the next `open_suggested_audio`.
    pub fn suggest(&self, info: AudioStreamInfo) {
        self.state.lock().suggested = Some(info);
    }

    pub fn set_output_channels(&self, channels: Option<u16>) {
        self.state.lock().output_channels = channels;
    }

    pub fn attach(&self, controller: &Arc<AudioController>) {
        let _ = self.controller.set(Arc::downgrade(controller));
    }

    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn reconfigures(&self) -> usize {
        self.state.lock().reconfigures
    }

    fn attached(&self) -> Option<Arc<AudioController>> {
        self.controller.get().and_then(Weak::upgrade)
    }
}

impl DecoderContext for FakeDecoder {
    fn audio_stream(&self) -> Option<AudioStreamInfo> {
        self.state.lock().stream.clone()
    }

    fn is_audio_decoder_open(&self) -> bool {
        self.state.lock().open
    }

    fn output_channels(&self) -> Option<u16> {
        self.state.lock().output_channels
    }

    fn open_suggested_audio(&self) {
        let opened = {
            let mut state = self.state.lock();
            state.opens += 1;
            match state.suggested.clone() {
                Some(info) => {
                    state.stream = Some(info);
                    state.open = true;
                    true
                }
                None => false,
            }
        };

        if opened {
            if let Some(controller) = self.attached() {
                controller.refresh(true);
            }
        }
    }

    fn close_audio(&self) {
        {
            let mut state = self.state.lock();
            state.closes += 1;
            state.stream = None;
            state.open = false;
        }

        if let Some(controller) = self.attached() {
            controller.refresh(false);
        }
    }

    fn reconfigure_output(&self) {
        self.state.lock().reconfigures += 1;
    }
}

// ============================================================================
// Engine fake and player mock
// ============================================================================

pub struct FakeEngine {
    failed: AtomicBool,
    default_device: Mutex<AudioEndpoint>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            failed: AtomicBool::new(false),
            default_device: Mutex::new(speakers()),
        }
    }

    pub fn set_failed(&self, failed: bool) {
        self.failed.store(failed, Ordering::SeqCst);
    }
}

impl AudioEngine for FakeEngine {
    fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn default_device(&self) -> AudioEndpoint {
        self.default_device.lock().clone()
    }
}

mock! {
    pub Player {}

    impl PlayerHost for Player {
        fn is_playing(&self) -> bool;
        fn resync_audio(&self);
        fn play(&self);
        fn audio_closed(&self);
    }
}

/// Player that accepts any call and reports it is not playing.
pub fn idle_player() -> MockPlayer {
    let mut player = MockPlayer::new();
    player.expect_is_playing().return_const(false);
    player.expect_resync_audio().return_const(());
    player.expect_play().return_const(());
    player.expect_audio_closed().return_const(());
    player
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn speakers() -> AudioEndpoint {
    AudioEndpoint::new("{speakers}", "Speakers (Realtek Audio)")
}

pub fn headphones() -> AudioEndpoint {
    AudioEndpoint::new("{headphones}", "Headphones (USB DAC)")
}

pub fn stereo_48k() -> AudioStreamInfo {
    AudioStreamInfo {
        stream_index: 1,
        codec: "aac".into(),
        bit_rate: 256.0,
        bit_depth: 16,
        channels: 2,
        channel_layout: "stereo".into(),
        sample_format: "fltp".into(),
        sample_rate: 48_000,
    }
}

pub fn surround_44k() -> AudioStreamInfo {
    AudioStreamInfo {
        stream_index: 2,
        codec: "ac3".into(),
        bit_rate: 640.0,
        bit_depth: 16,
        channels: 6,
        channel_layout: "5.1(side)".into(),
        sample_format: "fltp".into(),
        sample_rate: 44_100,
    }
}

/// A controller wired to fakes.
pub struct Harness {
    pub controller: Arc<AudioController>,
    pub decoder: Arc<FakeDecoder>,
    pub engine: Arc<FakeEngine>,
    pub registry: Arc<OutputRegistry>,
    pub log: SharedLog,
}

impl Harness {
    pub fn new(audio: AudioConfig, backends: &[(OutputMode, Behavior)]) -> Self {
        Self::with_player(audio, backends, idle_player())
    }

    pub fn with_player(
        audio: AudioConfig,
        backends: &[(OutputMode, Behavior)],
        player: MockPlayer,
    ) -> Self {
        let log = SharedLog::default();
        let registry = Arc::new(OutputRegistry::new());
        for (mode, behavior) in backends {
            registry.register(mode.clone(), fake_factory(mode.clone(), *behavior, &log));
        }

        let decoder = Arc::new(FakeDecoder::new());
        let engine = Arc::new(FakeEngine::new());
        let config = CoreConfig::builder()
            .decoder(decoder.clone())
            .player(Arc::new(player))
            .engine(engine.clone())
            .audio(audio)
            .build()
            .expect("valid test configuration");

        let controller = Arc::new(AudioController::new(config, Arc::clone(&registry)));
        decoder.attach(&controller);

        Self {
            controller,
            decoder,
            engine,
            registry,
            log,
        }
    }

    /// Open `info` on the decoder and report it as a codec format change.
    pub fn open_stream(&self, info: AudioStreamInfo) {
        self.decoder.open_stream(info);
        self.controller.refresh(true);
    }

    pub fn log(&self) -> parking_lot::MutexGuard<'_, BackendLog> {
        self.log.lock()
    }
}

pub fn shared_only() -> Vec<(OutputMode, Behavior)> {
    vec![(OutputMode::Shared, Behavior::Healthy)]
}
