use crate::messages::geometry::Point2;
use rover_core::LogSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Robot pose and kinematics published by the state estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub x: f64,
    pub y: f64,
    pub theta: f64, // heading, rad
    pub v: f64,     // linear velocity, m/s
    pub w: f64,     // angular velocity, rad/s
}

impl State {
    pub fn new(x: f64, y: f64, theta: f64, v: f64, w: f64) -> Self {
        Self { x, y, theta, v, w }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State: x={:.3}, y={:.3}, theta={:.3}, v={:.3}, w={:.3}",
            self.x, self.y, self.theta, self.v, self.w
        )
    }
}

impl LogSummary for State {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

/// Motion increment applied by the estimator's prediction step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    /// Distance travelled along the heading
    pub distance: f64,
    /// Heading change
    pub rotation: f64,
}

impl ControlInput {
    /// Scale reference velocities by the elapsed time
    pub fn from_velocities(v: f64, w: f64, dt: f64) -> Self {
        Self {
            distance: v * dt,
            rotation: w * dt,
        }
    }
}
