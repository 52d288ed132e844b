use crate::error::RoverResult;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types
///
/// Mailboxes log every publish at `trace` level; large messages (paths)
/// should only summarise their metadata here.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Task states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Uninitialized,
    Running,
    Stopping,
    Stopped,
    Crashed(String),
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Uninitialized => write!(f, "Uninitialized"),
            TaskState::Running => write!(f, "Running"),
            TaskState::Stopping => write!(f, "Stopping"),
            TaskState::Stopped => write!(f, "Stopped"),
            TaskState::Crashed(msg) => write!(f, "Crashed: {}", msg),
        }
    }
}

/// What a task wants the runner to do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Sleep for the cycle period, then tick again
    Continue,
    /// Leave the loop; other tasks keep running
    Finished,
}

/// Performance metrics for task execution
#[derive(Debug, Clone, Default)]
pub struct TaskMetrics {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub errors_count: u64,
    pub warnings_count: u64,
    pub uptime_seconds: f64,
}

/// Runtime context handed to a task on every call
pub struct TaskInfo {
    name: String,
    state: TaskState,
    metrics: TaskMetrics,
    creation_time: Instant,
    tick_start_time: Option<Instant>,
    last_error: Option<String>,
}

impl TaskInfo {
    pub fn new(task_name: &str) -> Self {
        Self {
            name: task_name.to_string(),
            state: TaskState::Uninitialized,
            metrics: TaskMetrics::default(),
            creation_time: Instant::now(),
            tick_start_time: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: TaskState) {
        if self.state != new_state {
            log::debug!(target: "rover::task", "[{}] {} -> {}", self.name, self.state, new_state);
            self.state = new_state;
        }
    }

    pub fn transition_to_crashed(&mut self, crash_msg: String) {
        self.log_error(&crash_msg);
        self.set_state(TaskState::Crashed(crash_msg));
    }

    // Tick management

    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.successful_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;
            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            // Running average over successful ticks
            let total_duration =
                self.metrics.avg_tick_duration_ms * (self.metrics.successful_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total_duration + duration_ms) / self.metrics.successful_ticks as f64;
        }
        self.metrics.uptime_seconds = self.creation_time.elapsed().as_secs_f64();
    }

    pub fn record_tick_failure(&mut self, error_msg: &str) {
        self.metrics.total_ticks += 1;
        self.metrics.failed_ticks += 1;
        if let Some(start_time) = self.tick_start_time.take() {
            self.metrics.last_tick_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        }
        self.log_error(error_msg);
    }

    // Logging, routed through the `log` facade with the task name as prefix

    pub fn log_info(&self, message: &str) {
        log::info!(target: "rover::task", "[{}] {}", self.name, message);
    }

    pub fn log_warning(&mut self, message: &str) {
        log::warn!(target: "rover::task", "[{}] {}", self.name, message);
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        log::error!(target: "rover::task", "[{}] {}", self.name, message);
        self.metrics.errors_count += 1;
        self.last_error = Some(message.to_string());
    }

    pub fn log_debug(&self, message: &str) {
        log::debug!(target: "rover::task", "[{}] {}", self.name, message);
    }

    // Getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &TaskMetrics {
        &self.metrics
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn uptime(&self) -> Duration {
        self.creation_time.elapsed()
    }
}

/// A unit of continuously running work executed on its own worker thread.
///
/// The runner drives the lifecycle: `init` once, `tick` every
/// [`cycle_period`](Task::cycle_period) until cancellation, then `shutdown`.
pub trait Task: Send {
    /// Get the task's name (must be unique within a server)
    fn name(&self) -> &'static str;

    /// Initialize the task (called once on the worker thread)
    fn init(&mut self, ctx: &mut TaskInfo) -> RoverResult<()> {
        ctx.log_info("Task initialized");
        Ok(())
    }

    /// One step of the task loop
    fn tick(&mut self, ctx: &mut TaskInfo) -> RoverResult<TickStatus>;

    /// Shutdown the task (called once after the loop exits)
    fn shutdown(&mut self, ctx: &mut TaskInfo) -> RoverResult<()> {
        ctx.log_info("Task shutdown");
        Ok(())
    }

    /// Sleep between two ticks
    fn cycle_period(&self) -> Duration {
        Duration::from_millis(100)
    }
}

// LogSummary implementations for primitive types
impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}
