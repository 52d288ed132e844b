use crate::messages::geometry::Point2;
use rover_core::LogSummary;
use serde::{Deserialize, Serialize};

/// One vertex of a planned path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: usize,
    pub position: Point2,
}

/// Ordered waypoints from the start vertex to the goal vertex
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub waypoints: Vec<Waypoint>,
}

impl Path {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    pub fn ids(&self) -> Vec<usize> {
        self.waypoints.iter().map(|w| w.id).collect()
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Euclidean length along the waypoints
    pub fn length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].position.distance(&pair[1].position))
            .sum()
    }
}

impl LogSummary for Path {
    fn log_summary(&self) -> String {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => format!(
                "Path({} waypoints, {} -> {}, length {:.3})",
                self.len(),
                first.id,
                last.id,
                self.length()
            ),
            _ => "Path(empty)".to_string(),
        }
    }
}
