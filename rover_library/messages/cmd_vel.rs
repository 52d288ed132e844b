use rover_core::LogSummary;
use serde::{Deserialize, Serialize};

/// Command velocity message for robot control
///
/// Produced by the path follower, consumed by the orchestrator which feeds it
/// to the measurement source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdVel {
    pub stamp_nanos: u64,
    pub linear: f64,  // m/s forward velocity
    pub angular: f64, // rad/s turning velocity
}

impl CmdVel {
    /// Create a new CmdVel message with current timestamp
    pub fn new(linear: f64, angular: f64) -> Self {
        Self {
            stamp_nanos: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64,
            linear,
            angular,
        }
    }

    /// Create a zero velocity command (stop)
    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Whether both components are exactly zero
    pub fn is_stop(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

impl Default for CmdVel {
    fn default() -> Self {
        Self::zero()
    }
}

impl LogSummary for CmdVel {
    fn log_summary(&self) -> String {
        format!("CmdVel(v={:.3}, w={:.3})", self.linear, self.angular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cmd_vel_creation() {
        let cmd = CmdVel::new(1.5, 0.8);
        assert_relative_eq!(cmd.linear, 1.5);
        assert_relative_eq!(cmd.angular, 0.8);
        assert!(cmd.stamp_nanos > 0);
    }

    #[test]
    fn test_cmd_vel_zero() {
        let cmd = CmdVel::zero();
        assert!(cmd.is_stop());
        assert!(!CmdVel::new(0.1, 0.0).is_stop());
    }
}
