//! # Inter-task communication
//!
//! - **Mailbox**: last-value-wins slot for continuously refreshed data
//!   (state, goal, path, velocities)
//! - **Fanout**: one publisher writing into several subscribers' mailboxes
//! - **UpdateSignal**: wake-on-publish for tasks waiting on their inputs
//! - **CommandQueue**: blocking FIFO for discrete text commands

pub mod mailbox;
pub mod queue;
pub mod signal;

pub use mailbox::{Fanout, Mailbox, MailboxMetrics};
pub use queue::CommandQueue;
pub use signal::UpdateSignal;
