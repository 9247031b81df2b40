//! Errors reported by host bridges.
//!
//! Backends return these from `open` and `push_samples`; the output
//! controller logs them and degrades instead of passing them on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The endpoint is gone or refuses connections (unplugged, disabled,
    /// held exclusively by another process).
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device rejected the requested stream format.
    #[error("Format rejected ({sample_rate} Hz, {channels} ch): {reason}")]
    FormatRejected {
        sample_rate: u32,
        channels: u16,
        reason: String,
    },

    /// The host lacks the requested capability (e.g. no exclusive access on
    /// this platform).
    #[error("Not supported by this host: {0}")]
    Unsupported(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
