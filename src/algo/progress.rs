//! Progress reporting and cancellation for long-running algorithms.
//!
//! A [`Progress`] bundles an optional callback, an optional [`CancelToken`]
//! and an optional deadline. Algorithms call [`Progress::checkpoint`] between
//! rounds; it reports progress and turns a raised token or an elapsed deadline
//! into [`MeshError::Cancelled`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use harmonica::algo::progress::{CancelToken, Progress};
//!
//! let token = CancelToken::new();
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! })
//! .with_cancel(token.clone())
//! .with_timeout(Duration::from_secs(5));
//!
//! assert!(progress.checkpoint(0, 10, "diffusion").is_ok());
//! token.cancel();
//! assert!(progress.checkpoint(1, 10, "diffusion").is_err());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{MeshError, Result};

/// A shared flag another thread can raise to abandon a computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A progress callback plus cancellation state.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
            cancel: None,
            deadline: None,
        }
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Give up once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Give up at a fixed instant.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// True once the token is raised or the deadline has passed.
    pub fn should_stop(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Report progress, then fail with [`MeshError::Cancelled`] if the caller
    /// asked to stop.
    pub fn checkpoint(&self, current: usize, total: usize, message: &str) -> Result<()> {
        self.report(current, total, message);
        if self.should_stop() {
            tracing::debug!(current, total, step = message, "computation cancelled");
            return Err(MeshError::Cancelled);
        }
        Ok(())
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("cancel", &self.cancel)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
