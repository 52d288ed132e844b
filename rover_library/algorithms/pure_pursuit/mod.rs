//! Pure Pursuit Path Following Algorithm
//!
//! Geometric path tracking controller for mobile robots.
//!
//! # Features
//!
//! - Look-ahead distance control
//! - Suitable for differential drive robots
//! - Progress along the path is tracked so the robot never steers back to
//!   waypoints it already passed
//!
//! # Example
//!
//! ```rust
//! use rover_library::algorithms::pure_pursuit::PurePursuit;
//! use rover_library::messages::{Path, Point2, State, Waypoint};
//! use rover_library::traits::ControlLaw;
//!
//! let mut pursuit = PurePursuit::new(0.5); // 0.5m look-ahead
//!
//! let path = Path::new(vec![
//!     Waypoint { id: 0, position: Point2::new(0.0, 0.0) },
//!     Waypoint { id: 1, position: Point2::new(1.0, 0.0) },
//!     Waypoint { id: 2, position: Point2::new(1.0, 1.0) },
//! ]);
//!
//! let cmd = pursuit.compute(&path, &State::default(), 0.5);
//! assert_eq!(cmd.linear, 0.5);
//! ```

use crate::messages::{CmdVel, Path, Point2, State};
use crate::traits::ControlLaw;

/// Pure Pursuit Controller
#[derive(Debug, Clone)]
pub struct PurePursuit {
    look_ahead_distance: f64,
    min_look_ahead: f64,
    max_look_ahead: f64,
    goal_tolerance: f64,
    current_segment: usize,
    tracked_ids: Vec<usize>,
}

impl PurePursuit {
    /// Create new Pure Pursuit controller
    pub fn new(look_ahead_distance: f64) -> Self {
        Self {
            look_ahead_distance,
            min_look_ahead: 0.2,
            max_look_ahead: 2.0,
            goal_tolerance: 0.1,
            current_segment: 0,
            tracked_ids: Vec::new(),
        }
    }

    /// Set look-ahead distance
    pub fn set_look_ahead_distance(&mut self, distance: f64) {
        self.look_ahead_distance = distance.clamp(self.min_look_ahead, self.max_look_ahead);
    }

    /// Set goal tolerance
    pub fn set_goal_tolerance(&mut self, tolerance: f64) {
        self.goal_tolerance = tolerance;
    }

    pub fn current_segment(&self) -> usize {
        self.current_segment
    }

    fn find_look_ahead_point(&mut self, points: &[Point2], position: &Point2) -> Point2 {
        self.update_current_segment(points, position);

        points[self.current_segment..]
            .iter()
            .find(|p| p.distance(position) >= self.look_ahead_distance)
            .or(points.last())
            .copied()
            .unwrap_or(*position)
    }

    fn update_current_segment(&mut self, points: &[Point2], position: &Point2) {
        let mut min_dist = f64::INFINITY;
        let mut closest_idx = self.current_segment;

        for (i, point) in points.iter().enumerate().skip(self.current_segment) {
            let dist = point.distance(position);
            if dist < min_dist {
                min_dist = dist;
                closest_idx = i;
            }
        }

        self.current_segment = closest_idx;
    }

    fn compute_curvature(state: &State, target: &Point2) -> f64 {
        // Transform target to robot frame
        let dx = target.x - state.x;
        let dy = target.y - state.y;
        let (sin, cos) = state.theta.sin_cos();

        let target_x = dx * cos + dy * sin;
        let target_y = -dx * sin + dy * cos;

        let l_squared = target_x * target_x + target_y * target_y;
        if l_squared < 1e-6 {
            return 0.0;
        }

        2.0 * target_y / l_squared
    }
}

impl Default for PurePursuit {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ControlLaw for PurePursuit {
    fn compute(&mut self, path: &Path, state: &State, reference_speed: f64) -> CmdVel {
        let ids = path.ids();
        if ids != self.tracked_ids {
            self.reset();
            self.tracked_ids = ids;
        }

        let points: Vec<Point2> = path.waypoints.iter().map(|w| w.position).collect();
        let position = state.position();
        match points.last() {
            None => return CmdVel::zero(),
            Some(goal) if goal.distance(&position) < self.goal_tolerance => {
                return CmdVel::zero()
            }
            Some(_) => {}
        }

        let target = self.find_look_ahead_point(&points, &position);
        let curvature = Self::compute_curvature(state, &target);
        CmdVel::new(reference_speed, reference_speed * curvature)
    }

    fn reset(&mut self) {
        self.current_segment = 0;
        self.tracked_ids.clear();
    }
}
