//! Shared progress reporting for long-running session operations.
//!
//! Loading, saving and injecting game data may run on a worker thread while a UI
//! thread polls for a status line and a completion fraction. [`Progress`] holds that
//! pair behind a single mutex so the reader always observes a status and fraction
//! that were written together.
//!
//! # Thread Safety
//!
//! [`Progress`] is `Send + Sync` and is shared through an `Arc`. Only the thread
//! running the operation writes to it; any number of threads may read.

use std::sync::Mutex;

#[derive(Debug, Default, Clone, PartialEq)]
struct ProgressState {
    status: String,
    fraction: f64,
}

/// A `(status, fraction)` pair updated by a worker and polled by observers.
///
/// The fraction is clamped to `0.0..=1.0`.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use romkit::utils::Progress;
///
/// let progress = Arc::new(Progress::default());
/// progress.set("Loading rooms", 0.25);
/// let (status, fraction) = progress.get();
/// assert_eq!(status, "Loading rooms");
/// assert_eq!(fraction, 0.25);
/// ```
#[derive(Debug, Default)]
pub struct Progress {
    state: Mutex<ProgressState>,
}

impl Progress {
    /// Create an empty progress pair at `0.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both the status line and the completion fraction.
    pub fn set(&self, status: impl Into<String>, fraction: f64) {
        let mut state = lock!(self.state);
        state.status = status.into();
        state.fraction = fraction.clamp(0.0, 1.0);
    }

    /// Replace the status line, keeping the current fraction.
    pub fn set_status(&self, status: impl Into<String>) {
        lock!(self.state).status = status.into();
    }

    /// Snapshot the current status line and fraction.
    #[must_use]
    pub fn get(&self) -> (String, f64) {
        let state = lock!(self.state);
        (state.status.clone(), state.fraction)
    }

    /// The current status line.
    #[must_use]
    pub fn status(&self) -> String {
        lock!(self.state).status.clone()
    }

    /// The current completion fraction.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        lock!(self.state).fraction
    }
}
