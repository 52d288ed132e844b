use crate::core::{Task, TaskMetrics, TaskState};
use crate::error::{RoverError, RoverResult};
use crate::scheduling::runner::{run_task, TaskOutcome, TaskReport};
use crate::scheduling::CancellationToken;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Fixed-size pool of worker threads, one long-running task per worker.
///
/// Tasks are expected to loop until cancelled, so a worker is occupied for
/// the whole lifetime of the task it runs.
#[derive(Debug)]
pub struct WorkerPool {
    workers: usize,
    active: Arc<AtomicUsize>,
    handles: Vec<(String, JoinHandle<TaskReport>)>,
}

impl WorkerPool {
    /// Create a pool with `workers` threads (at least one)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            active: Arc::new(AtomicUsize::new(0)),
            handles: Vec::new(),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of tasks currently running
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Start `task` on a free worker.
    ///
    /// Fails with [`RoverError::PoolExhausted`] when every worker is busy.
    pub fn submit(&mut self, mut task: Box<dyn Task>, token: CancellationToken) -> RoverResult<()> {
        let claimed = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.workers).then_some(n + 1)
            })
            .is_ok();
        if !claimed {
            return Err(RoverError::PoolExhausted {
                workers: self.workers,
            });
        }

        let name = task.name().to_string();
        let active = self.active.clone();
        let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
            let report = run_task(task.as_mut(), &token);
            active.fetch_sub(1, Ordering::SeqCst);
            report
        });

        match spawned {
            Ok(handle) => {
                log::debug!(target: "rover::scheduler", "Submitted task '{}'", name);
                self.handles.push((name, handle));
                Ok(())
            }
            Err(e) => {
                self.active.fetch_sub(1, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Wait for every submitted task and collect their reports in
    /// submission order
    pub fn join(self) -> Vec<TaskReport> {
        self.handles
            .into_iter()
            .map(|(name, handle)| join_worker(name, handle))
            .collect()
    }

    /// Like [`join`](Self::join), but gives up on tasks still running after
    /// `timeout` and reports them as [`TaskOutcome::Detached`].
    ///
    /// Detached threads keep running until the process exits.
    pub fn join_timeout(self, timeout: Duration) -> Vec<TaskReport> {
        let deadline = Instant::now() + timeout;
        self.handles
            .into_iter()
            .map(|(name, handle)| {
                while !handle.is_finished() && Instant::now() < deadline {
                    thread::sleep(JOIN_POLL_INTERVAL);
                }
                if handle.is_finished() {
                    join_worker(name, handle)
                } else {
                    log::warn!(
                        target: "rover::scheduler",
                        "Task '{}' did not stop within {:?}, detaching",
                        name,
                        timeout
                    );
                    TaskReport {
                        name,
                        state: TaskState::Stopping,
                        metrics: TaskMetrics::default(),
                        outcome: TaskOutcome::Detached,
                    }
                }
            })
            .collect()
    }
}

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

fn join_worker(name: String, handle: JoinHandle<TaskReport>) -> TaskReport {
    handle.join().unwrap_or_else(|_| {
        // run_task catches tick panics; this is a panic in shutdown
        let message = "worker thread panicked".to_string();
        TaskReport {
            name: name.clone(),
            state: TaskState::Crashed(message.clone()),
            metrics: TaskMetrics::default(),
            outcome: TaskOutcome::Failed(RoverError::TaskPanicked {
                task: name,
                message,
            }),
        }
    })
}
