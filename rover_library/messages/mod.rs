// Message types exchanged between ROVER tasks
pub mod cmd_vel;
pub mod geometry;
pub mod measurement;
pub mod path;
pub mod state;
pub mod status;

pub use cmd_vel::CmdVel;
pub use geometry::{Goal, Point2};
pub use measurement::Measurement;
pub use path::{Path, Waypoint};
pub use state::{ControlInput, State};
pub use status::FollowerStatus;
