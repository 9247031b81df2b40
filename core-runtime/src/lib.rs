//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio output core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the output controller depends
//! on. It establishes the logging conventions, the validated configuration
//! handed to each player session, and the event broadcasting used to publish
//! state to UI observers.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
