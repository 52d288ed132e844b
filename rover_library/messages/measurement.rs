use rover_core::LogSummary;
use serde::{Deserialize, Serialize};

/// Pose observation fed to the state estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Measurement {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.theta]
    }
}

impl LogSummary for Measurement {
    fn log_summary(&self) -> String {
        format!(
            "Measurement(x={:.3}, y={:.3}, theta={:.3})",
            self.x, self.y, self.theta
        )
    }
}
