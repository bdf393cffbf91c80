use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs an action at most once per interval, dropping calls in between.
///
/// The first call after a quiet window runs the action immediately and
/// starts a cooling period of `limit`. Calls made while cooling are
/// discarded together with their arguments; they are neither queued nor
/// delayed. This is the opposite trade-off to [`Debounce`](super::Debounce),
/// which guarantees that the *last* call of a burst eventually runs.
pub struct Throttle<T> {
    limit: Duration,
    action: Box<dyn Fn(T) + Send + Sync>,
    cooling: Arc<AtomicBool>,
    timer: Option<JoinHandle<()>>,
    disposed: bool,
}

impl<T> Throttle<T> {
    /// Create a throttle which lets `action` run at most once per `limit`.
    pub fn new<F>(limit: Duration, action: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            limit,
            action: Box::new(action),
            cooling: Arc::new(AtomicBool::new(false)),
            timer: None,
            disposed: false,
        }
    }

    /// Run `action(args)` unless the throttle is cooling down.
    ///
    /// Returns `true` if the action ran and `false` if the call was dropped.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn call(&mut self, args: T) -> bool {
        if self.disposed || self.is_cooling() {
            log::trace!("Throttle dropped a call");
            return false;
        }

        self.cooling.store(true, Ordering::Release);
        (self.action)(args);

        let cooling = Arc::clone(&self.cooling);
        let limit = self.limit;
        if let Some(previous) = self.timer.replace(tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            cooling.store(false, Ordering::Release);
        })) {
            previous.abort();
        }
        true
    }

    /// Returns `true` while calls are being dropped
    #[must_use]
    pub fn is_cooling(&self) -> bool {
        self.cooling.load(Ordering::Acquire)
    }

    /// Minimum time between two invocations
    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Abort the cooling timer and refuse all further calls.
    pub fn dispose(&mut self) {
        self.disposed = true;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T> Drop for Throttle<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T> Debug for Throttle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("limit", &self.limit)
            .field("cooling", &self.is_cooling())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
