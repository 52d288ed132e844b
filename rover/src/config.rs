//! Configuration file support for ROVER
//!
//! Every setting has a default, so a config file only lists what it changes.
//! Files are looked up in the current directory, then `~/.rover/`, then
//! `/etc/rover/`.
use rover_core::{RoverError, RoverResult};
use rover_library::algorithms::astar::Heuristic;
use rover_library::map::Map;
use rover_library::nodes::{FailurePolicy, PlannerConfig};
use rover_library::sim::VehicleParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Number of tasks the server runs, one worker each
pub const TASK_COUNT: usize = 5;

/// Full server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub map: MapSection,
    pub planner: PlannerSection,
    pub follower: FollowerSection,
    pub estimator: EstimatorSection,
    pub vehicle: VehicleSection,
    pub audit: AuditSection,
    pub client: ClientSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Worker threads in the pool
    pub workers: usize,
    /// Period of the supervisory loop feeding measurements back
    pub supervisor_period_ms: u64,
    /// How long shutdown waits for each task before detaching it
    pub shutdown_grace_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            workers: TASK_COUNT,
            supervisor_period_ms: 100,
            shutdown_grace_ms: 2000,
        }
    }
}

impl ServerSection {
    pub fn supervisor_period(&self) -> Duration {
        Duration::from_millis(self.supervisor_period_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Uniform grid map with optional blocked vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSection {
    pub cols: usize,
    pub rows: usize,
    /// Distance between neighbouring vertices (m)
    pub spacing: f64,
    /// Ids of occupied vertices
    pub obstacles: Vec<usize>,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            cols: 10,
            rows: 10,
            spacing: 1.0,
            obstacles: Vec::new(),
        }
    }
}

impl MapSection {
    pub fn build(&self) -> RoverResult<Map> {
        let mut map = Map::grid(self.cols, self.rows, self.spacing);
        for &id in &self.obstacles {
            map.block(id)?;
        }
        Ok(map)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    pub search_radius: f64,
    pub goal_tolerance: f64,
    pub state_tolerance: f64,
    pub heuristic: Heuristic,
    pub failure_policy: FailurePolicy,
    pub cycle_period_ms: u64,
}

impl Default for PlannerSection {
    fn default() -> Self {
        let defaults = PlannerConfig::default();
        Self {
            search_radius: defaults.search_radius,
            goal_tolerance: defaults.goal_tolerance,
            state_tolerance: defaults.state_tolerance,
            heuristic: defaults.heuristic,
            failure_policy: defaults.failure_policy,
            cycle_period_ms: defaults.cycle_period.as_millis() as u64,
        }
    }
}

impl PlannerSection {
    pub fn to_planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            search_radius: self.search_radius,
            goal_tolerance: self.goal_tolerance,
            state_tolerance: self.state_tolerance,
            heuristic: self.heuristic,
            failure_policy: self.failure_policy,
            cycle_period: Duration::from_millis(self.cycle_period_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerSection {
    /// Distance to the final waypoint that counts as arrived (m)
    pub goal_tolerance: f64,
    /// Pure pursuit look-ahead distance (m)
    pub look_ahead: f64,
    pub cycle_period_ms: u64,
}

impl Default for FollowerSection {
    fn default() -> Self {
        Self {
            goal_tolerance: 0.15,
            look_ahead: 0.5,
            cycle_period_ms: 100,
        }
    }
}

impl FollowerSection {
    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSection {
    /// Initial `[x, y, theta]`
    pub initial_pose: [f64; 3],
    pub process_noise: [f64; 3],
    pub measurement_noise: [f64; 3],
    pub cycle_period_ms: u64,
}

impl Default for EstimatorSection {
    fn default() -> Self {
        Self {
            initial_pose: [0.0; 3],
            process_noise: [0.01, 0.01, 0.005],
            measurement_noise: [0.05, 0.05, 0.02],
            cycle_period_ms: 100,
        }
    }
}

impl EstimatorSection {
    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms)
    }
}

/// Simulated vehicle used as the measurement source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSection {
    pub wheel_base: f64,
    pub max_wheel_speed: f64,
    pub position_noise: f64,
    pub heading_noise: f64,
    pub seed: u64,
}

impl Default for VehicleSection {
    fn default() -> Self {
        let params = VehicleParams::default();
        Self {
            wheel_base: params.wheel_base,
            max_wheel_speed: params.max_wheel_speed,
            position_noise: params.position_noise,
            heading_noise: params.heading_noise,
            seed: params.seed,
        }
    }
}

impl VehicleSection {
    pub fn params(&self) -> VehicleParams {
        VehicleParams {
            wheel_base: self.wheel_base,
            max_wheel_speed: self.max_wheel_speed,
            position_noise: self.position_noise,
            heading_noise: self.heading_noise,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditKind {
    /// One JSON file per planned path
    #[default]
    Json,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    pub kind: AuditKind,
    pub dir: PathBuf,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            kind: AuditKind::Json,
            dir: PathBuf::from("rover_paths"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub cycle_period_ms: u64,
    /// Read operator input from this file instead of stdin
    pub script: Option<PathBuf>,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            cycle_period_ms: 100,
            script: None,
        }
    }
}

impl ClientSection {
    pub fn cycle_period(&self) -> Duration {
        Duration::from_millis(self.cycle_period_ms)
    }
}

impl ServerConfig {
    /// Load config from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RoverResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RoverError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse config from TOML string
    pub fn from_toml(contents: &str) -> RoverResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Find and load config file from standard search paths
    ///
    /// Search order:
    /// 1. ./rover.toml
    /// 2. ~/.rover/config.toml
    /// 3. /etc/rover/config.toml
    ///
    /// Fails with [`RoverError::NotFound`] when none of them exists.
    pub fn find_and_load() -> RoverResult<Self> {
        for path in Self::get_search_paths() {
            if path.exists() {
                log::info!(target: "rover::config", "Loading {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(RoverError::not_found(
            "No config file found in standard locations",
        ))
    }

    /// Get standard config file search paths
    pub fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("rover.toml")];

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".rover").join("config.toml"));
        }

        paths.push(PathBuf::from("/etc/rover/config.toml"));
        paths
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> RoverResult<()> {
        if self.server.workers < TASK_COUNT {
            return Err(RoverError::config(format!(
                "server.workers must be at least {} (one per task), got {}",
                TASK_COUNT, self.server.workers
            )));
        }
        if self.server.supervisor_period_ms == 0 {
            return Err(RoverError::config("server.supervisor_period_ms must be positive"));
        }
        // Periodic tasks scale motion by their period and sleep for it
        for (section, period_ms) in [
            ("estimator", self.estimator.cycle_period_ms),
            ("planner", self.planner.cycle_period_ms),
            ("follower", self.follower.cycle_period_ms),
            ("client", self.client.cycle_period_ms),
        ] {
            if period_ms == 0 {
                return Err(RoverError::config(format!(
                    "{}.cycle_period_ms must be positive",
                    section
                )));
            }
        }
        if self.map.cols == 0 || self.map.rows == 0 {
            return Err(RoverError::config("map must have at least one row and column"));
        }
        if self.map.spacing.is_nan() || self.map.spacing <= 0.0 {
            return Err(RoverError::config(format!(
                "map.spacing must be positive, got {}",
                self.map.spacing
            )));
        }
        let vertices = self.map.cols * self.map.rows;
        if let Some(id) = self.map.obstacles.iter().find(|&&id| id >= vertices) {
            return Err(RoverError::config(format!(
                "map.obstacles contains {} but the map has {} vertices",
                id, vertices
            )));
        }
        if self.planner.search_radius.is_nan() || self.planner.search_radius <= 0.0 {
            return Err(RoverError::config("planner.search_radius must be positive"));
        }
        Ok(())
    }
}
