//! Decoded audio frames handed to the controller.

use bytes::Bytes;
use std::time::Duration;

/// One buffer of interleaved PCM produced by the decoder.
///
/// The payload is reference counted, so the same frame can go to the backend
/// and to every "frame submitted" observer without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// Presentation time of the first sample
    pub timestamp: Duration,
    /// Raw sample bytes in the device format
    pub data: Bytes,
}

impl AudioFrame {
    pub fn new(timestamp: Duration, data: impl Into<Bytes>) -> Self {
        Self {
            timestamp,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
