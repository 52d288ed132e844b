//! Collaborator interfaces the tasks are built against.
//!
//! Each task receives boxed implementations at construction time, so tests
//! can swap in scripted or in-memory versions.

use crate::messages::{CmdVel, ControlInput, Measurement, Path, State};
use rover_core::RoverResult;

/// State estimator used by the state estimator task
pub trait Estimator: Send {
    /// Time update with the motion travelled since the last cycle
    fn predict(&mut self, control: &ControlInput);

    /// Measurement update
    fn update(&mut self, measurement: &Measurement);

    /// Current pose estimate; `v` and `w` are filled in by the caller
    fn state(&self) -> State;
}

/// Trajectory tracking law used by the path follower
pub trait ControlLaw: Send {
    fn compute(&mut self, path: &Path, state: &State, reference_speed: f64) -> CmdVel;

    /// Forget any progress along the previous path
    fn reset(&mut self);
}

/// Sink for every path the planner publishes
pub trait AuditLog: Send {
    fn record(&mut self, path: &Path, file_stem: &str) -> RoverResult<()>;
}

/// Produces pose observations while the robot executes velocity commands
pub trait MeasurementSource: Send {
    fn measure(&mut self, cmd: &CmdVel, dt: f64) -> Measurement;
}

/// Operator-facing text input and output.
///
/// Input methods return `None` at end of input.
pub trait Console: Send {
    fn prompt_value(&mut self, label: &str) -> Option<String>;

    fn read_command(&mut self) -> Option<String>;

    fn show(&mut self, text: &str);
}
