//! Workspace facade crate.
//!
//! Host applications can depend on `audio-output-workspace` and enable the
//! `output` feature instead of wiring `core-output`, `core-runtime` and
//! `bridge-traits` individually.

#[cfg(feature = "output")]
pub use bridge_traits;
#[cfg(feature = "output")]
pub use core_output;
#[cfg(feature = "output")]
pub use core_runtime;
