//! # Backend Registry
//!
//! Maps an [`OutputMode`] to the factory producing backends of that family.
//!
//! A registry is created by the embedding application, populated at
//! configuration time and shared with every controller through an `Arc`.
//! Its lock guards only the map: factories are cloned out before they are
//! invoked, so a slow backend constructor never blocks registration and the
//! registry never owns a backend instance.
//!
//! ```ignore
//! let registry = Arc::new(OutputRegistry::new());
//! registry.register(OutputMode::Shared, Arc::new(|span: &tracing::Span| {
//!     Box::new(WasapiShared::new(span.clone())) as Box<dyn AudioOutput>
//! }));
//! ```

use bridge_traits::{AudioOutput, OutputMode};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, Span};

/// Constructor of a backend instance.
///
/// Receives the session span of the controller asking for the backend so the
/// backend logs inside it.
pub type OutputFactory = Arc<dyn Fn(&Span) -> Box<dyn AudioOutput> + Send + Sync>;

/// Mode-keyed table of backend factories.
#[derive(Default)]
pub struct OutputRegistry {
    factories: RwLock<HashMap<OutputMode, OutputFactory>>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` for `mode`, replacing any previous registration.
    pub fn register(&self, mode: OutputMode, factory: OutputFactory) {
        let replaced = self.factories.write().insert(mode.clone(), factory).is_some();
        debug!(%mode, replaced, "Registered output backend factory");
    }

    /// Remove the factory for `mode`, returning whether one was registered.
    pub fn unregister(&self, mode: &OutputMode) -> bool {
        self.factories.write().remove(mode).is_some()
    }

    /// Look up the factory for `mode`.
    pub fn resolve(&self, mode: &OutputMode) -> Option<OutputFactory> {
        self.factories.read().get(mode).cloned()
    }

    pub fn is_registered(&self, mode: &OutputMode) -> bool {
        self.factories.read().contains_key(mode)
    }

    /// Registered modes, in no particular order.
    pub fn modes(&self) -> Vec<OutputMode> {
        self.factories.read().keys().cloned().collect()
    }
}

impl fmt::Debug for OutputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputRegistry")
            .field("modes", &self.modes())
            .finish()
    }
}
