//! # Audio Output Core
//!
//! Output backend lifecycle for a media player session.
//!
//! ## Overview
//!
//! This crate handles:
//! - Registering backend factories per output mode ([`OutputRegistry`])
//! - Creating, opening and switching the backend of a session, with
//!   fallback to the shared mode ([`AudioController`])
//! - Forwarding decoded frames and publishing them to observers
//! - Volume, mute and master volume caching across backend switches
//! - Mirroring the decoder's stream format ([`StreamStateSnapshot`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_output::{AudioController, OutputRegistry};
//! use core_runtime::config::CoreConfig;
//!
//! let registry = Arc::new(OutputRegistry::new());
//! registry.register(OutputMode::Shared, shared_factory);
//!
//! let controller = AudioController::new(config, registry);
//! controller.enable();
//! controller.refresh(true);
//! controller.add_samples(frame);
//! ```

pub mod controller;
pub mod error;
pub mod frame;
pub mod registry;
pub mod snapshot;
pub mod state;

pub use controller::{AudioController, DEFAULT_CHANNELS, NEUTRAL_MASTER_VOLUME};
pub use error::{OutputError, Result};
pub use frame::AudioFrame;
pub use registry::{OutputFactory, OutputRegistry};
pub use snapshot::StreamStateSnapshot;
pub use state::OutputState;
