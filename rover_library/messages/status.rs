use crate::messages::geometry::Point2;
use rover_core::LogSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress report of the path follower
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum FollowerStatus {
    /// No path received yet
    #[default]
    Idle,
    /// Driving towards the final waypoint
    Tracking { remaining: f64 },
    /// The final waypoint of the current path was reached
    GoalReached { goal: Point2 },
}

impl FollowerStatus {
    /// Same variant, ignoring payloads
    pub fn same_kind(&self, other: &FollowerStatus) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for FollowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowerStatus::Idle => write!(f, "Idle"),
            FollowerStatus::Tracking { remaining } => {
                write!(f, "Tracking ({:.3} m remaining)", remaining)
            }
            FollowerStatus::GoalReached { goal } => write!(f, "Goal reached at {}", goal),
        }
    }
}

impl LogSummary for FollowerStatus {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}
