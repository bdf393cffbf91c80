use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

type Action<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Delays an action until its input has been quiet for a fixed interval.
///
/// Every [`Debounce::call`] aborts the timer of the previous call and starts
/// a new one carrying the new arguments, so a burst of calls collapses into
/// a single invocation with the arguments of the *last* call. Nothing is
/// queued: superseded arguments are dropped.
///
/// The pending timer is a spawned tokio task. It is aborted on
/// [`Debounce::dispose`] and when the debouncer is dropped, so an action can
/// never run against state that has already been torn down.
pub struct Debounce<T> {
    wait: Duration,
    action: Action<T>,
    pending: Option<JoinHandle<()>>,
    disposed: bool,
}

impl<T: Send + 'static> Debounce<T> {
    /// Create a debouncer which runs `action` once `wait` has passed without
    /// another call.
    pub fn new<F>(wait: Duration, action: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            wait,
            action: Arc::new(action),
            pending: None,
            disposed: false,
        }
    }

    /// Schedule `action(args)`, replacing any call that has not fired yet.
    ///
    /// Calls made after [`Debounce::dispose`] are ignored.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn call(&mut self, args: T) {
        if self.disposed {
            log::trace!("Ignoring call on disposed debouncer");
            return;
        }
        self.cancel();

        let action = Arc::clone(&self.action);
        let wait = self.wait;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            action(args);
        }));
    }
}

impl<T> Debounce<T> {
    /// Returns `true` while a call is waiting for its quiet period to pass
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Quiet period before the action runs
    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Abort the pending call, if any, and refuse all further calls.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for Debounce<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> Debug for Debounce<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce")
            .field("wait", &self.wait)
            .field("pending", &self.is_pending())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::{Instant, sleep, sleep_until};

    use super::Debounce;

    const fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + ms(2),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_into_last_call() {
        let start = Instant::now();
        let (send, mut recv) = unbounded_channel();
        let mut debounce = Debounce::new(ms(200), move |value: &'static str| {
            send.send((value, Instant::now())).unwrap();
        });

        for (offset, value) in [(0, "a"), (50, "ab"), (100, "abc"), (150, "abcd")] {
            sleep_until(start + ms(offset)).await;
            debounce.call(value);
        }

        let (value, fired_at) = recv.recv().await.unwrap();
        assert_eq!(value, "abcd");
        assert_near(fired_at - start, ms(350));

        sleep(ms(1_000)).await;
        assert!(recv.try_recv().is_err(), "debounce fired more than once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_fire_separately() {
        let (send, mut recv) = unbounded_channel();
        let mut debounce = Debounce::new(ms(100), move |value: u32| send.send(value).unwrap());

        debounce.call(1);
        sleep(ms(150)).await;
        debounce.call(2);
        sleep(ms(150)).await;

        assert_eq!(recv.try_recv().unwrap(), 1);
        assert_eq!(recv.try_recv().unwrap(), 2);
        assert!(recv.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_wait_collapses_calls_in_same_tick() {
        let (send, mut recv) = unbounded_channel();
        let mut debounce = Debounce::new(Duration::ZERO, move |value: u32| send.send(value).unwrap());

        debounce.call(1);
        debounce.call(2);
        debounce.call(3);
        sleep(ms(1)).await;

        assert_eq!(recv.try_recv().unwrap(), 3);
        assert!(recv.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_call() {
        let (send, mut recv) = unbounded_channel();
        let mut debounce = Debounce::new(ms(100), move |value: u32| send.send(value).unwrap());

        debounce.call(1);
        assert!(debounce.is_pending());
        debounce.dispose();
        assert!(!debounce.is_pending());

        debounce.call(2);
        sleep(ms(500)).await;
        assert!(recv.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_call() {
        let (send, mut recv) = unbounded_channel();
        let mut debounce = Debounce::new(ms(100), move |value: u32| send.send(value).unwrap());

        debounce.call(1);
        drop(debounce);
        sleep(ms(500)).await;
        assert!(recv.recv().await.is_none());
    }
}
