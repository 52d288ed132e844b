//! ROVER Tasks
//!
//! The five long-lived tasks of the coordination server. Each one is a thin
//! [`Task`](rover_core::Task) wrapper that owns its mailboxes and delegates the
//! actual work to an algorithm or collaborator trait.
//!
//! - `StateEstimatorTask` - fuses reference velocities and measurements into a `State`
//! - `PathPlannerTask` - A* from the robot to the goal whenever either moved
//! - `PathFollowerTask` - turns the latest `Path` into `CmdVel`
//! - `CommandProcessorTask` - applies `;`-delimited operator requests
//! - `ClientTask` - the operator console side of the protocol
//!
//! Tasks never look each other up. The server hands every task the exact
//! mailboxes and queues it needs through its `*Ports` struct.

pub mod client;
pub mod command_processor;
pub mod path_follower;
pub mod path_planner;
pub mod state_estimator;

pub use client::ClientTask;
pub use command_processor::{CommandPorts, CommandProcessorTask};
pub use path_follower::{FollowerPorts, PathFollowerTask};
pub use path_planner::{FailurePolicy, PathPlannerTask, PlannerConfig, PlannerPorts};
pub use state_estimator::{EstimatorPorts, StateEstimatorTask};
