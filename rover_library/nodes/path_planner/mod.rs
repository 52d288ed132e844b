use crate::algorithms::astar::{astar_search, reconstruct_path, Heuristic, SearchGraph};
use crate::audit::audit_file_stem;
use crate::map::Map;
use crate::messages::{Goal, Path, State, Waypoint};
use crate::traits::AuditLog;
use parking_lot::Mutex;
use rover_core::{
    CommandQueue, Fanout, Mailbox, RoverError, RoverResult, Task, TaskInfo, TickStatus,
    UpdateSignal,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// What the planner does when no path can be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Crash the planner, which stops the server
    #[default]
    Fatal,
    /// Push "No path found: <reason>" onto the responses queue and keep going
    Report,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Max distance between the robot (or goal) and its nearest vertex
    pub search_radius: f64,
    /// Goal displacement below which no replanning happens
    pub goal_tolerance: f64,
    /// Robot displacement below which no replanning happens
    pub state_tolerance: f64,
    pub heuristic: Heuristic,
    pub failure_policy: FailurePolicy,
    pub cycle_period: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_radius: 0.75,
            goal_tolerance: 1e-3,
            state_tolerance: 1e-1,
            heuristic: Heuristic::Euclidean,
            failure_policy: FailurePolicy::Fatal,
            cycle_period: Duration::from_millis(100),
        }
    }
}

pub struct PlannerPorts {
    pub goal: Mailbox<Goal>,
    pub state: Mailbox<State>,
    /// Bumped by publishes to `goal` and `state`
    pub inputs_changed: UpdateSignal,
    pub path: Fanout<Path>,
    pub responses: CommandQueue<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaitForInputs,
    Ready,
}

/// Path Planner Task - A* from the robot's vertex to the goal's vertex
///
/// Waits until both a goal and a state have been published at least once,
/// then replans whenever either moved beyond its tolerance.
pub struct PathPlannerTask {
    map: Arc<Mutex<Map>>,
    audit: Box<dyn AuditLog>,
    ports: PlannerPorts,
    config: PlannerConfig,
    phase: Phase,
    seen_generation: u64,
    previous: Option<(Goal, State)>,
    plans: u64,
}

impl PathPlannerTask {
    pub fn new(
        map: Arc<Mutex<Map>>,
        audit: Box<dyn AuditLog>,
        ports: PlannerPorts,
        config: PlannerConfig,
    ) -> Self {
        Self {
            map,
            audit,
            ports,
            config,
            phase: Phase::WaitForInputs,
            seen_generation: 0,
            previous: None,
            plans: 0,
        }
    }

    /// Number of paths published so far
    pub fn plans(&self) -> u64 {
        self.plans
    }

    fn inputs_ready(&self) -> bool {
        self.ports.goal.peek_updated() && self.ports.state.peek_updated()
    }

    fn unchanged(&self, goal: &Goal, state: &State) -> bool {
        self.previous.is_some_and(|(prev_goal, prev_state)| {
            goal.position().distance(&prev_goal.position()) < self.config.goal_tolerance
                && state.position().distance(&prev_state.position()) < self.config.state_tolerance
        })
    }

    /// Search a path for the given inputs
    pub fn plan(&self, goal: &Goal, state: &State) -> RoverResult<Path> {
        let radius = self.config.search_radius;
        let mut map = self.map.lock();

        let start = map.nearest_within(&state.position(), radius).ok_or_else(|| {
            RoverError::config(format!(
                "No vertex within {} of the robot at {}",
                radius,
                state.position()
            ))
        })?;
        let target = map.nearest_within(&goal.position(), radius).ok_or_else(|| {
            RoverError::config(format!(
                "No vertex within {} of the goal at {}",
                radius,
                goal.position()
            ))
        })?;

        let predecessors = astar_search(&mut *map, start, target, self.config.heuristic.as_fn());
        let ids = reconstruct_path(&predecessors, start, target)
            .map_err(|_| RoverError::EmptyPath { start, goal: target })?;

        Ok(Path::new(
            ids.into_iter()
                .map(|id| Waypoint {
                    id,
                    position: map.position(id),
                })
                .collect(),
        ))
    }

    fn wait_for_inputs(&mut self) -> bool {
        if self.inputs_ready() {
            return true;
        }
        self.seen_generation = self
            .ports
            .inputs_changed
            .wait_for_change(self.seen_generation, self.config.cycle_period);
        self.inputs_ready()
    }

    fn publish(&mut self, ctx: &mut TaskInfo, path: Path) {
        ctx.log_info(&format!(
            "Planned {} waypoints {:?}",
            path.len(),
            path.ids()
        ));
        if let Err(e) = self
            .audit
            .record(&path, &audit_file_stem(chrono::Local::now()))
        {
            ctx.log_warning(&format!("Audit log failed: {}", e));
        }
        self.ports.path.publish(path);
        self.plans += 1;
    }
}

impl Task for PathPlannerTask {
    fn name(&self) -> &'static str {
        "path_planner"
    }

    fn init(&mut self, ctx: &mut TaskInfo) -> RoverResult<()> {
        let vertices = self.map.lock().len();
        if vertices == 0 {
            return Err(RoverError::config("Map has no vertices"));
        }
        ctx.log_info(&format!(
            "Planning on {} vertices with {:?} heuristic",
            vertices, self.config.heuristic
        ));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TaskInfo) -> RoverResult<TickStatus> {
        if self.phase == Phase::WaitForInputs {
            if !self.wait_for_inputs() {
                return Ok(TickStatus::Continue);
            }
            ctx.log_debug("Goal and state available");
            self.phase = Phase::Ready;
        }

        let goal = self.ports.goal.read();
        let state = self.ports.state.read();
        if self.unchanged(&goal, &state) {
            return Ok(TickStatus::Continue);
        }

        match self.plan(&goal, &state) {
            Ok(path) => self.publish(ctx, path),
            Err(e) if self.config.failure_policy == FailurePolicy::Report && e.is_fatal() => {
                ctx.log_warning(&e.to_string());
                self.ports.responses.push(format!("No path found: {}", e));
            }
            Err(e) => return Err(e),
        }
        self.previous = Some((goal, state));
        Ok(TickStatus::Continue)
    }

    fn cycle_period(&self) -> Duration {
        // The input wait is the suspension point until both inputs arrived
        match self.phase {
            Phase::WaitForInputs => Duration::ZERO,
            Phase::Ready => self.config.cycle_period,
        }
    }
}
