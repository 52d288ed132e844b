//! Differential Drive Kinematics
//!
//! Forward and inverse kinematics for differential drive mobile robots.
//!
//! # Example
//!
//! ```rust
//! use rover_library::algorithms::differential_drive::DifferentialDrive;
//!
//! let dd = DifferentialDrive::new(0.5); // wheel_base
//!
//! let (left, right) = dd.inverse_kinematics(1.0, 0.5); // linear, angular
//! let (linear, angular) = dd.forward_kinematics(left, right);
//! assert!((linear - 1.0).abs() < 1e-12 && (angular - 0.5).abs() < 1e-12);
//! ```

/// Differential Drive Kinematics
#[derive(Debug, Clone, Copy)]
pub struct DifferentialDrive {
    wheel_base: f64,       // Distance between wheels (m)
    max_wheel_speed: f64,  // Saturation per wheel (m/s)
}

impl DifferentialDrive {
    pub fn new(wheel_base: f64) -> Self {
        Self {
            wheel_base,
            max_wheel_speed: f64::INFINITY,
        }
    }

    /// Limit each wheel to `max` m/s
    pub fn with_max_wheel_speed(mut self, max: f64) -> Self {
        self.max_wheel_speed = max.abs();
        self
    }

    /// Robot velocity to (left, right) wheel speeds in m/s
    pub fn inverse_kinematics(&self, linear: f64, angular: f64) -> (f64, f64) {
        let left = linear - (angular * self.wheel_base / 2.0);
        let right = linear + (angular * self.wheel_base / 2.0);
        (left, right)
    }

    /// Wheel speeds to (linear, angular) robot velocity
    pub fn forward_kinematics(&self, left_speed: f64, right_speed: f64) -> (f64, f64) {
        let linear = (left_speed + right_speed) / 2.0;
        let angular = (right_speed - left_speed) / self.wheel_base;
        (linear, angular)
    }

    /// Integrate a velocity command over `dt`, saturating the wheels.
    ///
    /// Returns the updated pose (x, y, theta).
    pub fn update_odometry(
        &self,
        pose: (f64, f64, f64),
        linear: f64,
        angular: f64,
        dt: f64,
    ) -> (f64, f64, f64) {
        let (left, right) = self.inverse_kinematics(linear, angular);
        let max = self.max_wheel_speed;
        let (linear, angular) =
            self.forward_kinematics(left.clamp(-max, max), right.clamp(-max, max));

        let (x, y, theta) = pose;

        let new_theta = theta + angular * dt;
        let new_x = x + linear * theta.cos() * dt;
        let new_y = y + linear * theta.sin() * dt;

        (new_x, new_y, new_theta)
    }

    pub fn wheel_base(&self) -> f64 {
        self.wheel_base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forward_motion() {
        let dd = DifferentialDrive::new(0.5);
        let (linear, angular) = dd.forward_kinematics(1.0, 1.0);
        assert_eq!(linear, 1.0);
        assert_eq!(angular, 0.0);
    }

    #[test]
    fn test_rotation_in_place() {
        let dd = DifferentialDrive::new(0.5);
        let (left, right) = dd.inverse_kinematics(0.0, 2.0);
        assert_abs_diff_eq!(left, -0.5);
        assert_abs_diff_eq!(right, 0.5);
    }

    #[test]
    fn test_odometry_straight() {
        let dd = DifferentialDrive::new(0.5);
        let (x, y, theta) = dd.update_odometry((0.0, 0.0, 0.0), 1.0, 0.0, 0.5);
        assert_abs_diff_eq!(x, 0.5);
        assert_abs_diff_eq!(y, 0.0);
        assert_abs_diff_eq!(theta, 0.0);
    }

    #[test]
    fn test_wheel_saturation() {
        let dd = DifferentialDrive::new(0.5).with_max_wheel_speed(0.2);
        let (x, _, _) = dd.update_odometry((0.0, 0.0, 0.0), 1.0, 0.0, 1.0);
        assert_abs_diff_eq!(x, 0.2);
    }
}
