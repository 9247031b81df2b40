//! # Output Events
//!
//! State changes of an output session, published for observers such as UI
//! property bindings or a diagnostics overlay.
//!
//! Events travel over a `tokio::sync::broadcast` channel. Publishing only
//! clones the event into each receiver's queue and never runs observer code,
//! so the controller may publish while holding its own lock. Publishing also
//! works without a tokio runtime, which keeps it usable from the sample
//! thread.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, OutputEvent};
//!
//! let bus = EventBus::new(16);
//! let mut observer = bus.subscribe();
//!
//! bus.emit(CoreEvent::Output(OutputEvent::MuteChanged { muted: true }));
//! assert_eq!(
//!     observer.try_recv().unwrap(),
//!     CoreEvent::Output(OutputEvent::MuteChanged { muted: true })
//! );
//! ```
//!
//! A receiver that falls more than the channel capacity behind gets
//! `RecvError::Lagged`. Every event describes current state, so a lagging
//! observer can re-read the controller instead of replaying history.

use bridge_traits::time::LogLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast::{self, error::TryRecvError};

pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Per-receiver queue length used when the configuration does not set one.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Anything published on an [`EventBus`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Stream(StreamEvent),
    Output(OutputEvent),
}

/// Changes to the decoder-side audio stream as seen by the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum StreamEvent {
    /// Format and metrics were copied from the decoder.
    Refreshed {
        stream_index: i32,
        codec: String,
        sample_rate: u32,
        channels: u16,
        is_open: bool,
    },
    /// The decoder has no audio stream; counters were cleared.
    Reset,
    Closed,
    /// The stream has no usable sample rate and cannot be played.
    FormatUnresolved { stream_index: i32 },
}

/// Changes to the backend, the device or the levels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum OutputEvent {
    Initialized {
        mode: String,
        device_id: String,
        sample_rate: u32,
        channels: u16,
    },
    /// `requested` could not be used and `fallback` was opened instead.
    FallbackEngaged {
        requested: String,
        fallback: String,
        reason: String,
    },
    /// No backend could be opened; the session stays silent.
    AudioDisabled { reason: String },
    /// A sample push failed, usually because the device went away.
    DeviceLost { message: String },
    DeviceChanged {
        device_id: String,
        device_name: String,
    },
    VolumeChanged { volume: u32 },
    MuteChanged { muted: bool },
    /// Lifecycle transition, with states in their `snake_case` form.
    StateChanged { from: String, to: String },
}

/// How much attention an event deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

impl EventSeverity {
    /// Level a host should log the event at.
    pub fn log_level(self) -> LogLevel {
        match self {
            EventSeverity::Debug => LogLevel::Debug,
            EventSeverity::Info => LogLevel::Info,
            EventSeverity::Warning => LogLevel::Warn,
            EventSeverity::Error => LogLevel::Error,
        }
    }
}

impl CoreEvent {
    pub fn severity(&self) -> EventSeverity {
        use CoreEvent::*;

        match self {
            Output(OutputEvent::AudioDisabled { .. }) => EventSeverity::Error,
            Output(OutputEvent::FallbackEngaged { .. })
            | Output(OutputEvent::DeviceLost { .. })
            | Stream(StreamEvent::FormatUnresolved { .. }) => EventSeverity::Warning,
            Output(OutputEvent::Initialized { .. }) | Output(OutputEvent::DeviceChanged { .. }) => {
                EventSeverity::Info
            }
            Output(_) | Stream(_) => EventSeverity::Debug,
        }
    }

    /// One-line summary including the event's payload.
    pub fn description(&self) -> String {
        self.to_string()
    }

    pub fn is_output(&self) -> bool {
        matches!(self, CoreEvent::Output(_))
    }
}

impl fmt::Display for CoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreEvent::Stream(event) => fmt::Display::fmt(event, f),
            CoreEvent::Output(event) => fmt::Display::fmt(event, f),
        }
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEvent::Refreshed {
                stream_index,
                codec,
                sample_rate,
                channels,
                is_open,
            } => write!(
                f,
                "Audio stream #{} refreshed: {} {} Hz {} ch ({})",
                stream_index,
                codec,
                sample_rate,
                channels,
                if *is_open { "open" } else { "closed" }
            ),
            StreamEvent::Reset => f.write_str("Audio stream reset"),
            StreamEvent::Closed => f.write_str("Audio stream closed"),
            StreamEvent::FormatUnresolved { stream_index } => {
                write!(f, "Audio stream #{} has no usable sample rate", stream_index)
            }
        }
    }
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEvent::Initialized {
                mode,
                device_id,
                sample_rate,
                channels,
            } => write!(
                f,
                "Opened {} output on {} at {} Hz, {} ch",
                mode, device_id, sample_rate, channels
            ),
            OutputEvent::FallbackEngaged {
                requested,
                fallback,
                reason,
            } => write!(f, "Using {} output instead of {}: {}", fallback, requested, reason),
            OutputEvent::AudioDisabled { reason } => write!(f, "Audio disabled: {}", reason),
            OutputEvent::DeviceLost { message } => write!(f, "Audio device lost: {}", message),
            OutputEvent::DeviceChanged {
                device_id,
                device_name,
            } => write!(f, "Output device set to {} ({})", device_name, device_id),
            OutputEvent::VolumeChanged { volume } => write!(f, "Volume {}", volume),
            OutputEvent::MuteChanged { muted: true } => f.write_str("Muted"),
            OutputEvent::MuteChanged { muted: false } => f.write_str("Unmuted"),
            OutputEvent::StateChanged { from, to } => write!(f, "Output {} -> {}", from, to),
        }
    }
}

/// Broadcast channel shared by a controller and its observers.
///
/// Clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// `capacity` bounds each receiver's queue; older events are overwritten
    /// once a receiver falls that far behind.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to every current receiver and return how many there were.
    pub fn emit(&self, event: CoreEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

type EventPredicate = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver that skips events an observer does not care about.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventSeverity, EventStream};
///
/// let bus = EventBus::default();
/// let problems = EventStream::new(bus.subscribe())
///     .min_severity(EventSeverity::Warning);
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    min_severity: EventSeverity,
    predicate: Option<EventPredicate>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            min_severity: EventSeverity::Debug,
            predicate: None,
        }
    }

    pub fn min_severity(mut self, severity: EventSeverity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    fn wants(&self, event: &CoreEvent) -> bool {
        event.severity() >= self.min_severity
            && self.predicate.as_ref().map_or(true, |keep| keep(event))
    }

    /// Next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` when `n` events were overwritten before being
    /// read, `RecvError::Closed` once every bus clone is gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.wants(&event) {
                return Ok(event);
            }
        }
    }

    /// Next matching event already queued, or `None`.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            };
            if self.wants(&event) {
                return Some(Ok(event));
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("min_severity", &self.min_severity)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}
