//! Pure computational algorithms used by the ROVER tasks
//!
//! No I/O and no shared state: every algorithm can be exercised in isolation.
//!
//! # Available Algorithms
//!
//! ## Motion Planning
//! - **astar**: A* search over a vertex graph, plus path reconstruction
//! - **pure_pursuit**: Path tracking controller for mobile robots
//!
//! ## Localization & State Estimation
//! - **ekf**: Extended Kalman Filter for 2D pose estimation
//!
//! ## Kinematics
//! - **differential_drive**: Differential drive kinematics and odometry

pub mod astar;
pub mod differential_drive;
pub mod ekf;
pub mod pure_pursuit;
