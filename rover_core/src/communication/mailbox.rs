use crate::communication::signal::UpdateSignal;
use crate::core::LogSummary;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free counters for mailbox monitoring
#[derive(Debug, Default)]
pub struct AtomicMailboxMetrics {
    pub publishes: AtomicU64,
    pub reads: AtomicU64,
}

impl AtomicMailboxMetrics {
    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MailboxMetrics {
        MailboxMetrics {
            publishes: self.publishes.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
        }
    }
}

/// Plain metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxMetrics {
    pub publishes: u64,
    pub reads: u64,
}

struct Slot<T> {
    value: Option<T>,
    updated: bool,
}

/// Last-value-wins single slot shared between tasks.
///
/// A publish overwrites whatever is stored; readers copy the current value
/// out. Nothing is queued, so a reader may see the same value twice or miss
/// an intermediate one. The updated flag is set by the first publish and is
/// never cleared by reads or peeks.
///
/// Cloning a `Mailbox` yields another handle to the same slot.
pub struct Mailbox<T> {
    slot: Arc<Mutex<Slot<T>>>,
    signals: Arc<Mutex<Vec<UpdateSignal>>>,
    topic_name: Arc<str>,
    metrics: Arc<AtomicMailboxMetrics>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            signals: self.signals.clone(),
            topic_name: self.topic_name.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

// Manual Debug implementation to avoid a T: Debug requirement
impl<T> std::fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("topic_name", &self.topic_name)
            .field("updated", &self.peek_updated())
            .finish_non_exhaustive()
    }
}

impl<T> Mailbox<T> {
    /// Create an empty mailbox for the given topic
    pub fn new(topic_name: &str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                value: None,
                updated: false,
            })),
            signals: Arc::new(Mutex::new(Vec::new())),
            topic_name: Arc::from(topic_name),
            metrics: Arc::new(AtomicMailboxMetrics::default()),
        }
    }

    /// Bump `signal` on every future publish (wake-on-publish)
    pub fn attach_signal(&self, signal: &UpdateSignal) {
        self.signals.lock().push(signal.clone());
    }

    /// Builder form of [`attach_signal`](Mailbox::attach_signal)
    pub fn with_signal(self, signal: &UpdateSignal) -> Self {
        self.attach_signal(signal);
        self
    }

    /// Whether anything was ever published. Does not clear the flag.
    pub fn peek_updated(&self) -> bool {
        self.slot.lock().updated
    }

    /// Get the topic name for this mailbox
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// Get current metrics snapshot (lock-free)
    pub fn metrics(&self) -> MailboxMetrics {
        self.metrics.snapshot()
    }
}

impl<T: Clone> Mailbox<T> {
    /// Overwrite the stored value and set the updated flag
    pub fn publish(&self, value: T)
    where
        T: LogSummary,
    {
        log::trace!(target: "rover::mailbox", "'{}' <- {}", self.topic_name, value.log_summary());
        {
            let mut slot = self.slot.lock();
            slot.value = Some(value);
            slot.updated = true;
        }
        self.metrics.publishes.fetch_add(1, Ordering::Relaxed);

        // Slot lock is released before any signal lock is taken
        let signals = self.signals.lock().clone();
        for signal in &signals {
            signal.notify();
        }
    }

    /// Copy of the stored value, `None` if nothing was published yet
    pub fn try_read(&self) -> Option<T> {
        self.metrics.reads.fetch_add(1, Ordering::Relaxed);
        self.slot.lock().value.clone()
    }

    /// Copy of the stored value, or `default` if nothing was published yet
    pub fn read_or(&self, default: T) -> T {
        self.try_read().unwrap_or(default)
    }

    /// Copy of the stored value, or `T::default()` if nothing was published yet
    pub fn read(&self) -> T
    where
        T: Default,
    {
        self.try_read().unwrap_or_default()
    }
}

/// The subscriber list of one publisher on one logical channel.
///
/// Every wired mailbox receives its own copy of each published value.
pub struct Fanout<T> {
    channel: String,
    subscribers: Vec<Mailbox<T>>,
}

impl<T: Clone + LogSummary> Fanout<T> {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            subscribers: Vec::new(),
        }
    }

    /// Wire another mailbox to this channel
    pub fn subscribe(&mut self, mailbox: Mailbox<T>) -> &mut Self {
        self.subscribers.push(mailbox);
        self
    }

    /// Publish `value` to every subscriber
    pub fn publish(&self, value: T) {
        if let Some((last, rest)) = self.subscribers.split_last() {
            for mailbox in rest {
                mailbox.publish(value.clone());
            }
            last.publish(value);
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> std::fmt::Debug for Fanout<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fanout")
            .field("channel", &self.channel)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_last_value_wins() {
        let mailbox: Mailbox<String> = Mailbox::new("goal");
        mailbox.publish("v1".to_string());
        mailbox.publish("v2".to_string());

        assert_eq!(mailbox.read(), "v2");
        // Repeated reads see the same value
        assert_eq!(mailbox.read(), "v2");
    }

    #[test]
    fn test_updated_flag_lifecycle() {
        let mailbox: Mailbox<f64> = Mailbox::new("velocity");
        assert!(!mailbox.peek_updated());
        assert!(!mailbox.peek_updated());

        mailbox.publish(1.5);
        assert!(mailbox.peek_updated());

        // Reading and peeking never clear the flag
        let _ = mailbox.read();
        let _ = mailbox.try_read();
        assert!(mailbox.peek_updated());
    }

    #[test]
    fn test_read_defaults_on_empty_slot() {
        let mailbox: Mailbox<f64> = Mailbox::new("velocity");
        assert_eq!(mailbox.try_read(), None);
        assert_eq!(mailbox.read(), 0.0);
        assert_eq!(mailbox.read_or(-1.0), -1.0);
    }

    #[test]
    fn test_clone_shares_slot() {
        let a: Mailbox<f64> = Mailbox::new("shared");
        let b = a.clone();
        b.publish(2.5);
        assert!(a.peek_updated());
        assert_eq!(a.read(), 2.5);
        assert_eq!(a.metrics().publishes, 1);
    }

    #[test]
    fn test_concurrent_publishers_and_readers() {
        let mailbox: Mailbox<f64> = Mailbox::new("stress");

        let publishers: Vec<_> = (0..4)
            .map(|p| {
                let mb = mailbox.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        mb.publish((p * 1000 + i) as f64);
                    }
                })
            })
            .collect();

        let reader = {
            let mb = mailbox.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let v = mb.read_or(-1.0);
                    assert!(v == -1.0 || (0.0..4000.0).contains(&v));
                }
            })
        };

        for handle in publishers {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(mailbox.metrics().publishes, 2000);
        // The final value is the last write of one of the publishers
        let last = mailbox.read();
        assert_eq!(last as u64 % 1000, 499);
    }

    #[test]
    fn test_publish_bumps_attached_signal() {
        let signal = UpdateSignal::new();
        let mailbox: Mailbox<f64> = Mailbox::new("state").with_signal(&signal);
        let seen = signal.generation();
        mailbox.publish(1.0);
        assert_eq!(signal.generation(), seen + 1);
    }

    #[test]
    fn test_fanout_reaches_every_subscriber() {
        let planner: Mailbox<f64> = Mailbox::new("planner/v");
        let follower: Mailbox<f64> = Mailbox::new("follower/v");

        let mut fanout = Fanout::new("v");
        fanout.subscribe(planner.clone()).subscribe(follower.clone());
        assert_eq!(fanout.len(), 2);

        fanout.publish(0.75);
        assert_eq!(planner.read(), 0.75);
        assert_eq!(follower.read(), 0.75);
    }

    #[test]
    fn test_empty_fanout_publish_is_noop() {
        let fanout: Fanout<f64> = Fanout::new("nobody");
        assert!(fanout.is_empty());
        fanout.publish(1.0);
    }
}
