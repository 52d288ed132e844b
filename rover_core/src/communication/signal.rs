use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Generation counter that wakes waiters whenever an attached mailbox is
/// published to.
///
/// Lets a task block until its inputs change instead of spinning on
/// `peek_updated`.
#[derive(Clone, Default)]
pub struct UpdateSignal {
    inner: Arc<(Mutex<u64>, Condvar)>,
}

impl UpdateSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the generation and wake every waiter
    pub fn notify(&self) {
        let (generation, condvar) = &*self.inner;
        *generation.lock() += 1;
        condvar.notify_all();
    }

    pub fn generation(&self) -> u64 {
        *self.inner.0.lock()
    }

    /// Block until the generation differs from `seen` or `timeout` elapses.
    ///
    /// Returns the generation observed on wake-up; equal to `seen` on timeout.
    pub fn wait_for_change(&self, seen: u64, timeout: Duration) -> u64 {
        let (generation, condvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut current = generation.lock();
        while *current == seen {
            if condvar.wait_until(&mut current, deadline).timed_out() {
                break;
            }
        }
        *current
    }
}

impl std::fmt::Debug for UpdateSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateSignal")
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wait_times_out_without_notify() {
        let signal = UpdateSignal::new();
        let start = Instant::now();
        let seen = signal.wait_for_change(0, Duration::from_millis(30));
        assert_eq!(seen, 0);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_returns_immediately_if_already_changed() {
        let signal = UpdateSignal::new();
        signal.notify();
        let seen = signal.wait_for_change(0, Duration::from_secs(5));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_notify_wakes_waiter() {
        let signal = UpdateSignal::new();
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait_for_change(0, Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        signal.notify();
        assert_eq!(waiter.join().unwrap(), 1);
    }
}
