use crate::core::{Task, TaskInfo, TaskMetrics, TaskState, TickStatus};
use crate::error::RoverError;
use crate::scheduling::CancellationToken;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Why a task loop ended
#[derive(Debug)]
pub enum TaskOutcome {
    /// The shared token was cancelled
    Cancelled,
    /// The task returned [`TickStatus::Finished`]
    Finished,
    /// A fatal error or panic; the token was cancelled on the way out
    Failed(RoverError),
    /// Still running when the pool stopped waiting for it
    Detached,
}

impl std::fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskOutcome::Cancelled => write!(f, "cancelled"),
            TaskOutcome::Finished => write!(f, "finished"),
            TaskOutcome::Failed(e) => write!(f, "failed: {}", e),
            TaskOutcome::Detached => write!(f, "detached"),
        }
    }
}

/// Final record of one task run
#[derive(Debug)]
pub struct TaskReport {
    pub name: String,
    pub state: TaskState,
    pub metrics: TaskMetrics,
    pub outcome: TaskOutcome,
}

impl TaskReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Failed(_))
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Drive `task` through its lifecycle on the current thread.
///
/// Recoverable tick errors are logged and the loop continues. A fatal error
/// or a panic crashes the task and cancels `token`, which stops every other
/// task sharing it.
pub fn run_task(task: &mut dyn Task, token: &CancellationToken) -> TaskReport {
    let mut ctx = TaskInfo::new(task.name());

    let init = catch_unwind(AssertUnwindSafe(|| task.init(&mut ctx))).unwrap_or_else(|payload| {
        Err(RoverError::TaskPanicked {
            task: task.name().to_string(),
            message: panic_message(payload),
        })
    });
    if let Err(e) = init {
        ctx.transition_to_crashed(format!("Initialization failed: {}", e));
        token.cancel();
        return finish(ctx, TaskOutcome::Failed(e));
    }
    ctx.set_state(TaskState::Running);

    let outcome = loop {
        if token.cancelled() {
            break TaskOutcome::Cancelled;
        }

        ctx.start_tick();
        let result = catch_unwind(AssertUnwindSafe(|| task.tick(&mut ctx)));
        match result {
            Ok(Ok(TickStatus::Continue)) => ctx.record_tick(),
            Ok(Ok(TickStatus::Finished)) => {
                ctx.record_tick();
                break TaskOutcome::Finished;
            }
            Ok(Err(e)) if e.is_fatal() => {
                ctx.record_tick_failure(&e.to_string());
                ctx.transition_to_crashed(e.to_string());
                token.cancel();
                break TaskOutcome::Failed(e);
            }
            Ok(Err(e)) => ctx.record_tick_failure(&e.to_string()),
            Err(payload) => {
                let e = RoverError::TaskPanicked {
                    task: task.name().to_string(),
                    message: panic_message(payload),
                };
                ctx.record_tick_failure(&e.to_string());
                ctx.transition_to_crashed(e.to_string());
                token.cancel();
                break TaskOutcome::Failed(e);
            }
        }

        if token.sleep(task.cycle_period()) {
            break TaskOutcome::Cancelled;
        }
    };

    if !matches!(ctx.state(), TaskState::Crashed(_)) {
        ctx.set_state(TaskState::Stopping);
    }
    if let Err(e) = task.shutdown(&mut ctx) {
        ctx.log_error(&format!("Shutdown failed: {}", e));
    }
    finish(ctx, outcome)
}

fn finish(mut ctx: TaskInfo, outcome: TaskOutcome) -> TaskReport {
    if !matches!(ctx.state(), TaskState::Crashed(_)) {
        ctx.set_state(TaskState::Stopped);
    }
    ctx.log_info(&format!(
        "Exited loop after {} ticks ({})",
        ctx.metrics().total_ticks,
        outcome
    ));
    TaskReport {
        name: ctx.name().to_string(),
        state: ctx.state().clone(),
        metrics: ctx.metrics().clone(),
        outcome,
    }
}
