pub mod pool;
pub mod runner;
pub mod token;

pub use pool::WorkerPool;
pub use runner::{run_task, TaskOutcome, TaskReport};
pub use token::{install_interrupt_handler, CancellationToken};
