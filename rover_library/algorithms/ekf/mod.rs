//! Extended Kalman Filter (EKF) for Differential Drive Localization
//!
//! Pose estimation from odometry-style control increments and direct pose
//! measurements.
//!
//! # Features
//!
//! - 2D pose estimation (x, y, theta)
//! - Nonlinear unicycle motion model with linearized covariance propagation
//! - Configurable process and measurement noise
//!
//! # Example
//!
//! ```rust
//! use rover_library::algorithms::ekf::DiffDriveEkf;
//! use rover_library::messages::{ControlInput, Measurement};
//! use rover_library::traits::Estimator;
//!
//! let mut ekf = DiffDriveEkf::new();
//!
//! // Drove 10cm straight ahead
//! ekf.predict(&ControlInput { distance: 0.1, rotation: 0.0 });
//!
//! // Pose fix
//! ekf.update(&Measurement::new(0.1, 0.0, 0.0));
//! ```

use crate::messages::{ControlInput, Measurement, State};
use crate::traits::Estimator;

pub type Matrix3 = [[f64; 3]; 3];

const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Extended Kalman Filter over the pose [x, y, theta]
#[derive(Debug, Clone)]
pub struct DiffDriveEkf {
    /// State vector: [x, y, theta]
    pose: [f64; 3],

    /// State covariance matrix (3x3)
    covariance: Matrix3,

    /// Process noise added per prediction (3x3)
    process_noise: Matrix3,

    /// Pose measurement noise (3x3)
    measurement_noise: Matrix3,
}

impl DiffDriveEkf {
    /// Create new EKF at the origin with default noise parameters
    pub fn new() -> Self {
        Self::with_pose([0.0; 3])
    }

    pub fn with_pose(pose: [f64; 3]) -> Self {
        Self {
            pose,
            covariance: IDENTITY,
            process_noise: diagonal([0.01, 0.01, 0.005]),
            measurement_noise: diagonal([0.05, 0.05, 0.02]),
        }
    }

    pub fn set_process_noise(&mut self, noise: [f64; 3]) {
        self.process_noise = diagonal(noise);
    }

    pub fn set_measurement_noise(&mut self, noise: [f64; 3]) {
        self.measurement_noise = diagonal(noise);
    }

    pub fn pose(&self) -> [f64; 3] {
        self.pose
    }

    pub fn covariance(&self) -> Matrix3 {
        self.covariance
    }

    /// Position uncertainty (std dev)
    pub fn position_uncertainty(&self) -> f64 {
        (self.covariance[0][0] + self.covariance[1][1]).sqrt()
    }

    /// Reset to the origin with unit covariance
    pub fn reset(&mut self) {
        self.pose = [0.0; 3];
        self.covariance = IDENTITY;
    }
}

impl Default for DiffDriveEkf {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for DiffDriveEkf {
    /// Unicycle model:
    /// x(k+1) = x(k) + d*cos(theta)
    /// y(k+1) = y(k) + d*sin(theta)
    /// theta(k+1) = theta(k) + r
    fn predict(&mut self, control: &ControlInput) {
        let theta = self.pose[2];
        let (sin, cos) = theta.sin_cos();

        self.pose[0] += control.distance * cos;
        self.pose[1] += control.distance * sin;
        self.pose[2] = normalize_angle(theta + control.rotation);

        // Motion Jacobian
        let f = [
            [1.0, 0.0, -control.distance * sin],
            [0.0, 1.0, control.distance * cos],
            [0.0, 0.0, 1.0],
        ];

        // P = F*P*F' + Q
        let fp = mat_mul(&f, &self.covariance);
        self.covariance = mat_add(&mat_mul(&fp, &transpose(&f)), &self.process_noise);
    }

    /// Direct pose observation: H = I
    fn update(&mut self, measurement: &Measurement) {
        let z = measurement.as_array();
        let mut innovation = [0.0; 3];
        for i in 0..3 {
            innovation[i] = z[i] - self.pose[i];
        }
        innovation[2] = normalize_angle(innovation[2]);

        // S = P + R, K = P * inv(S)
        let s = mat_add(&self.covariance, &self.measurement_noise);
        let kalman_gain = mat_mul(&self.covariance, &invert_3x3(s));

        for i in 0..3 {
            for j in 0..3 {
                self.pose[i] += kalman_gain[i][j] * innovation[j];
            }
        }
        self.pose[2] = normalize_angle(self.pose[2]);

        // P = (I - K) * P
        let mut i_k = IDENTITY;
        for i in 0..3 {
            for j in 0..3 {
                i_k[i][j] -= kalman_gain[i][j];
            }
        }
        self.covariance = mat_mul(&i_k, &self.covariance);
    }

    fn state(&self) -> State {
        State::new(self.pose[0], self.pose[1], self.pose[2], 0.0, 0.0)
    }
}

fn diagonal(values: [f64; 3]) -> Matrix3 {
    let mut m = [[0.0; 3]; 3];
    for i in 0..3 {
        m[i][i] = values[i];
    }
    m
}

fn mat_mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                out[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    out
}

fn mat_add(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = *a;
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] += b[i][j];
        }
    }
    out
}

fn transpose(m: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[j][i];
        }
    }
    out
}

/// Normalize angle to [-π, π]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > std::f64::consts::PI {
        a -= 2.0 * std::f64::consts::PI;
    }
    while a < -std::f64::consts::PI {
        a += 2.0 * std::f64::consts::PI;
    }
    a
}

/// Invert 3x3 matrix; identity if singular
fn invert_3x3(m: Matrix3) -> Matrix3 {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

    if det.abs() < 1e-10 {
        return IDENTITY;
    }

    let inv_det = 1.0 / det;

    [
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det,
        ],
    ]
}
