use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Unbounded FIFO shared by many producers and many consumers.
///
/// [`pop_wait`](CommandQueue::pop_wait) blocks while the queue is empty and
/// open. Closing wakes every blocked consumer; items still queued are drained
/// before consumers see `None`.
pub struct CommandQueue<T> {
    inner: Arc<(Mutex<QueueState<T>>, Condvar)>,
    name: Arc<str>,
}

impl<T> Clone for CommandQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: self.name.clone(),
        }
    }
}

impl<T> std::fmt::Debug for CommandQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandQueue")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> CommandQueue<T> {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Arc::new((
                Mutex::new(QueueState {
                    items: VecDeque::new(),
                    closed: false,
                }),
                Condvar::new(),
            )),
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append at the tail and wake one waiter.
    ///
    /// Items pushed after [`close`](CommandQueue::close) are dropped.
    pub fn push(&self, item: T) {
        let (state, condvar) = &*self.inner;
        {
            let mut state = state.lock();
            if state.closed {
                log::debug!(target: "rover::queue", "'{}' is closed, dropping item", self.name);
                return;
            }
            state.items.push_back(item);
        }
        condvar.notify_one();
    }

    /// Remove the head, blocking while the queue is empty and open.
    ///
    /// Returns `None` only once the queue is closed and drained.
    pub fn pop_wait(&self) -> Option<T> {
        let (state, condvar) = &*self.inner;
        let mut state = state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            condvar.wait(&mut state);
        }
    }

    /// Remove the head without blocking
    pub fn try_pop(&self) -> Option<T> {
        self.inner.0.lock().items.pop_front()
    }

    /// Close the queue and wake every blocked consumer
    pub fn close(&self) {
        let (state, condvar) = &*self.inner;
        state.lock().closed = true;
        condvar.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.0.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.0.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new("requests");
        queue.push("A".to_string());
        queue.push("B".to_string());
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_wait().as_deref(), Some("A"));
        assert_eq!(queue.pop_wait().as_deref(), Some("B"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue: CommandQueue<String> = CommandQueue::new("requests");
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop_wait())
        };
        thread::sleep(Duration::from_millis(30));
        queue.push("X".to_string());
        assert_eq!(consumer.join().unwrap().as_deref(), Some("X"));
    }

    #[test]
    fn test_close_wakes_blocked_consumers() {
        let queue: CommandQueue<String> = CommandQueue::new("responses");
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.pop_wait())
            })
            .collect();
        thread::sleep(Duration::from_millis(30));
        queue.close();
        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
    }

    #[test]
    fn test_close_drains_remaining_items() {
        let queue = CommandQueue::new("requests");
        queue.push(1u32);
        queue.close();
        queue.push(2u32);
        assert!(queue.is_closed());
        assert_eq!(queue.pop_wait(), Some(1));
        assert_eq!(queue.pop_wait(), None);
    }

    #[test]
    fn test_try_pop_on_empty() {
        let queue: CommandQueue<u32> = CommandQueue::new("empty");
        assert_eq!(queue.try_pop(), None);
    }
}
