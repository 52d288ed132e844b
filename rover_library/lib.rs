//! # ROVER Library
//!
//! Messages, map, algorithms and tasks of the ROVER coordination server.
//!
//! ## Structure
//!
//! ```text
//! rover_library/
//! ── messages/       # State, Goal, Path, CmdVel, Measurement, FollowerStatus
//! ── map/            # Graph map the planner searches
//! ── algorithms/     # A*, EKF, pure pursuit, differential drive
//! ── nodes/          # The five server tasks
//! ── audit/          # Path audit logs
//! ── console/        # Operator consoles
//! ── sim/            # Simulated vehicle (measurement source)
//! ── traits.rs       # Collaborator interfaces
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rover_library::algorithms::astar::{astar_search, reconstruct_path, Heuristic};
//! use rover_library::Map;
//!
//! let mut map = Map::grid(3, 3, 1.0);
//! map.block(4).unwrap();
//!
//! let predecessors = astar_search(&mut map, 0, 8, Heuristic::Euclidean.as_fn());
//! let ids = reconstruct_path(&predecessors, 0, 8).unwrap();
//! assert!(!ids.contains(&4));
//! ```

pub mod algorithms;
pub mod audit;
pub mod console;
pub mod map;
pub mod messages;
pub mod nodes;
pub mod sim;
pub mod traits;

// Re-export core traits needed for message types
pub use rover_core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use map::Map;
pub use nodes::{
    ClientTask, CommandProcessorTask, PathFollowerTask, PathPlannerTask, StateEstimatorTask,
};
pub use traits::{AuditLog, Console, ControlLaw, Estimator, MeasurementSource};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::LogSummary;

    pub use crate::messages::{
        CmdVel, FollowerStatus, Goal, Measurement, Path, Point2, State, Waypoint,
    };

    pub use crate::algorithms::astar::Heuristic;
    pub use crate::algorithms::ekf::DiffDriveEkf;
    pub use crate::algorithms::pure_pursuit::PurePursuit;
    pub use crate::audit::{JsonAuditLog, MemoryAuditLog, NullAuditLog};
    pub use crate::console::{ScriptedConsole, StdConsole};
    pub use crate::map::Map;
    pub use crate::nodes::*;
    pub use crate::sim::{SimulatedVehicle, VehicleParams};
    pub use crate::traits::*;
}
