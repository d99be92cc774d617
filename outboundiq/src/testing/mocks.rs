//! Instrumentation double for testing attribution.

use crate::identity::UserContext;
use crate::resolver::ResolverRegistry;
use parking_lot::Mutex;
use std::sync::Arc;

/// An outbound call as seen by the recording instrumentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCall {
    /// The called URL.
    pub url: String,
    /// The user context resolved when the call was made.
    pub user_context: Option<UserContext>,
}

/// Stands in for the HTTP instrumentation layer.
///
/// Each [`track`](Self::track) call resolves the user context through the
/// registry exactly as the real instrumentation does and records the result.
#[derive(Debug)]
pub struct RecordingInstrumentation {
    registry: Arc<ResolverRegistry>,
    calls: Mutex<Vec<TrackedCall>>,
}

impl RecordingInstrumentation {
    /// Creates an instrumentation double reading from `registry`.
    #[must_use]
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self {
            registry,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Records an outbound call to `url` and returns the attributed context.
    pub fn track(&self, url: impl Into<String>) -> Option<UserContext> {
        let user_context = self.registry.invoke();
        self.calls.lock().push(TrackedCall {
            url: url.into(),
            user_context: user_context.clone(),
        });
        user_context
    }

    /// Returns all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<TrackedCall> {
        self.calls.lock().clone()
    }

    /// Returns the recorded calls to `url`.
    #[must_use]
    pub fn calls_to(&self, url: &str) -> Vec<TrackedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.url == url)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clears recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}
