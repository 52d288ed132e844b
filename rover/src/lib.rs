//! # ROVER - Robot Coordination Server
//!
//! ROVER runs a mobile robot's planning stack as five cooperating tasks on a
//! fixed worker pool:
//!
//! - **State estimator** fuses reference velocities and pose measurements
//! - **Path planner** runs A* over a graph map whenever goal or pose moved
//! - **Path follower** turns the latest path into velocity commands
//! - **Command processor** applies `;`-delimited operator requests
//! - **Client** is the operator console
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rover::config::ServerConfig;
//! use rover::server::Server;
//!
//! let server = Server::from_config(ServerConfig::default())?;
//! let report = server.run()?;
//! println!("{}", report);
//! # Ok::<(), rover::RoverError>(())
//! ```

// Re-export core components
pub use rover_core::{self, *};

// Re-export the task library with alias
pub use rover_library as library;

pub mod config;
pub mod server;

/// The ROVER prelude - everything needed to build and drive a server
pub mod prelude {
    pub use crate::config::ServerConfig;
    pub use crate::server::{Server, ServerHandles, ServerReport};

    pub use rover_core::{
        CancellationToken, CommandQueue, Fanout, Mailbox, RoverError, RoverResult, Task,
        TaskInfo, TaskState, TickStatus,
    };

    pub use rover_library::prelude::*;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
