//! Progress reporting for dataset loads.
//!
//! The loader reports through [`ProgressCallback`] so that it does not care
//! whether progress ends up as a terminal bar, a log line, or nowhere.

use std::sync::Arc;

/// Receives progress updates from a dataset load.
///
/// Implementations must be `Send + Sync` so a single callback can be shared
/// behind an `Arc` across tasks.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units (rows read).
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] for server startup and tests.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
