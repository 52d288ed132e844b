use rover_core::LogSummary;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Target point set by the operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub x: f64,
    pub y: f64,
}

impl Goal {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Goal: x={:.3}, y={:.3}", self.x, self.y)
    }
}

impl LogSummary for Goal {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_relative_eq!(a.distance(&b), 5.0);
        assert_relative_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_goal_display() {
        assert_eq!(Goal::new(3.0, 4.0).to_string(), "Goal: x=3.000, y=4.000");
    }
}
