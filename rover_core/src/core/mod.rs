//! # Core types and traits for ROVER
//!
//! - **Task**: the base trait for every concurrently running unit of work
//! - **TaskInfo**: runtime context (state, metrics, logging) handed to tasks
//!
//! ## Task Lifecycle
//!
//! 1. **Construction** - the orchestrator builds the task with its mailbox handles
//! 2. **Initialization** - `init()` runs once on the worker thread
//! 3. **Execution** - `tick()` runs every cycle until cancellation
//! 4. **Shutdown** - `shutdown()` runs once after the loop exits

pub mod task;

pub use task::{LogSummary, Task, TaskInfo, TaskMetrics, TaskState, TickStatus};
