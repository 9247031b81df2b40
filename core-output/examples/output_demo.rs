//! Audio output controller demonstration
//!
//! Drives a controller against a null backend that only tracks how much audio
//! it was given, requesting exclusive mode to show the fallback to shared.
//!
//! Run with:
//! ```bash
//! cargo run -p core-output --example output_demo
//!
//! # Show per-frame tracing
//! cargo run -p core-output --example output_demo -- "core_output=trace"
//! ```

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::time::LogLevel;
use bridge_traits::{
    AudioBitDepth, AudioEndpoint, AudioEngine, AudioOutput, AudioStreamInfo, DecoderContext,
    OutputMode, PlayerHost,
};
use core_output::{AudioController, AudioFrame, OutputRegistry};
use core_runtime::config::{AudioConfig, CoreConfig};
use core_runtime::events::CoreEvent;
use core_runtime::logging::{init_logging, LoggingConfig};
use parking_lot::Mutex;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Span};

/// Backend that accepts samples and discards them.
struct NullOutput {
    span: Span,
    bytes_per_second: u64,
    queued: u64,
    volume: u32,
    muted: bool,
    master_volume: f32,
}

impl NullOutput {
    fn new(span: &Span) -> Self {
        Self {
            span: span.clone(),
            bytes_per_second: 0,
            queued: 0,
            volume: 0,
            muted: false,
            master_volume: 1.0,
        }
    }
}

impl AudioOutput for NullOutput {
    fn open(
        &mut self,
        sample_rate: u32,
        channels: u16,
        bit_depth: AudioBitDepth,
        device: &AudioEndpoint,
    ) -> BridgeResult<()> {
        self.bytes_per_second = sample_rate as u64 * channels as u64 * bit_depth.bits() as u64 / 8;
        self.queued = 0;
        info!(parent: &self.span, %device, "Null output opened");
        Ok(())
    }

    fn push_samples(&mut self, data: &[u8]) -> BridgeResult<()> {
        self.queued += data.len() as u64;
        Ok(())
    }

    fn clear(&mut self) {
        self.queued = 0;
    }

    fn buffered_duration(&self) -> Duration {
        if self.bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.queued as f64 / self.bytes_per_second as f64)
    }

    fn device_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn volume(&self) -> u32 {
        self.volume
    }

    fn set_volume(&mut self, volume: u32) {
        self.volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn master_volume(&self) -> f32 {
        self.master_volume
    }

    fn set_master_volume(&mut self, gain: f32) {
        self.master_volume = gain;
    }
}

/// Decoder with one AAC stream that is opened on request.
#[derive(Default)]
struct DemoDecoder {
    stream: Mutex<Option<AudioStreamInfo>>,
}

impl DecoderContext for DemoDecoder {
    fn audio_stream(&self) -> Option<AudioStreamInfo> {
        self.stream.lock().clone()
    }

    fn is_audio_decoder_open(&self) -> bool {
        self.stream.lock().is_some()
    }

    fn output_channels(&self) -> Option<u16> {
        Some(2)
    }

    fn open_suggested_audio(&self) {
        *self.stream.lock() = Some(AudioStreamInfo {
            stream_index: 1,
            codec: "aac".into(),
            bit_rate: 192.0,
            bit_depth: 16,
            channels: 2,
            channel_layout: "stereo".into(),
            sample_format: "fltp".into(),
            sample_rate: 48_000,
        });
    }

    fn close_audio(&self) {
        *self.stream.lock() = None;
    }
}

#[derive(Default)]
struct DemoPlayer {
    playing: AtomicBool,
}

impl PlayerHost for DemoPlayer {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn resync_audio(&self) {}

    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn audio_closed(&self) {}
}

struct DemoEngine;

impl AudioEngine for DemoEngine {
    fn failed(&self) -> bool {
        false
    }
}

fn main() -> anyhow::Result<()> {
    let mut logging = LoggingConfig::default()
        .with_level(LogLevel::Debug)
        .with_spans(true);
    if let Some(filter) = env::args().nth(1) {
        logging = logging.with_filter(filter);
    }
    init_logging(logging)?;

    let registry = Arc::new(OutputRegistry::new());
    registry.register(
        OutputMode::Shared,
        Arc::new(|span: &Span| Box::new(NullOutput::new(span)) as Box<dyn AudioOutput>),
    );

    let config = CoreConfig::builder()
        .decoder(Arc::new(DemoDecoder::default()))
        .player(Arc::new(DemoPlayer::default()))
        .engine(Arc::new(DemoEngine))
        .audio(AudioConfig::default().with_output_mode(OutputMode::Exclusive))
        .build()?;

    let controller = AudioController::new(config, registry);
    let mut events = controller.subscribe();

    info!("=== Audio Output Demo ===");
    controller.enable();
    // The demo decoder does not report back, so announce the codec here.
    controller.refresh(true);

    // 20 ms of 48 kHz stereo s16 per frame.
    for n in 0..50u64 {
        controller.add_samples(AudioFrame::new(Duration::from_millis(n * 20), vec![0u8; 3840]));
    }

    info!(
        mode = ?controller.current_mode(),
        state = %controller.state(),
        buffered_ms = controller.buffered_duration().as_millis() as u64,
        "Samples submitted"
    );

    controller.set_volume(0);
    info!(muted = controller.is_muted(), "Volume set to 0");
    controller.set_volume(80);
    info!(muted = controller.is_muted(), volume = controller.volume(), "Volume restored");

    controller.disable();
    controller.shutdown();

    let published: Vec<CoreEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    for event in &published {
        info!(severity = ?event.severity(), "{}", event.description());
    }

    info!("=== Demo Complete ===");
    Ok(())
}
