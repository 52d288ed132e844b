//! # ROVER Core
//!
//! The concurrency runtime of the ROVER robot coordination server.
//!
//! ROVER runs a handful of long-lived tasks (state estimation, planning,
//! path following, command handling, the operator client) on a fixed worker
//! pool. This crate provides the building blocks they share:
//!
//! - **Tasks**: the `Task` trait and the runner that drives its lifecycle
//! - **Communication**: last-value mailboxes and a blocking command queue
//! - **Scheduling**: the worker pool and the cancellation token
//!
//! ## Quick Start
//!
//! ```rust
//! use rover_core::{CancellationToken, Mailbox, RoverResult, Task, TaskInfo, TickStatus, WorkerPool};
//!
//! struct Greeter {
//!     output: Mailbox<String>,
//! }
//!
//! impl Task for Greeter {
//!     fn name(&self) -> &'static str { "greeter" }
//!
//!     fn tick(&mut self, _ctx: &mut TaskInfo) -> RoverResult<TickStatus> {
//!         self.output.publish("Hello ROVER!".to_string());
//!         Ok(TickStatus::Finished)
//!     }
//! }
//!
//! let output = Mailbox::new("greeting");
//! let mut pool = WorkerPool::new(1);
//! pool.submit(Box::new(Greeter { output: output.clone() }), CancellationToken::new())?;
//! pool.join();
//! assert_eq!(output.read(), "Hello ROVER!");
//! # Ok::<(), rover_core::RoverError>(())
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::{CommandQueue, Fanout, Mailbox, MailboxMetrics, UpdateSignal};
pub use core::{LogSummary, Task, TaskInfo, TaskMetrics, TaskState, TickStatus};
pub use error::{RoverError, RoverResult};
pub use scheduling::{
    install_interrupt_handler, run_task, CancellationToken, TaskOutcome, TaskReport, WorkerPool,
};
