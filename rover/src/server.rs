//! The ROVER server: wires the five tasks together, runs them on a worker
//! pool and closes the loop between commanded velocity and measurements.

use crate::config::{AuditKind, ServerConfig, TASK_COUNT};
use parking_lot::Mutex;
use rover_core::{
    CancellationToken, CommandQueue, Fanout, Mailbox, RoverResult, TaskReport, TaskState,
    UpdateSignal, WorkerPool,
};
use rover_library::algorithms::ekf::DiffDriveEkf;
use rover_library::algorithms::pure_pursuit::PurePursuit;
use rover_library::audit::{JsonAuditLog, NullAuditLog};
use rover_library::console::{ScriptedConsole, StdConsole};
use rover_library::map::Map;
use rover_library::messages::{CmdVel, FollowerStatus, Goal, Measurement, Path, State};
use rover_library::nodes::{
    ClientTask, CommandPorts, CommandProcessorTask, EstimatorPorts, FollowerPorts,
    PathFollowerTask, PathPlannerTask, PlannerPorts, StateEstimatorTask,
};
use rover_library::sim::SimulatedVehicle;
use rover_library::traits::{AuditLog, Console, MeasurementSource};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Requests the client answers before it starts reading commands
const BOOTSTRAP_REQUESTS: [&str; 4] = ["PRINT", "SET_GOAL", "V", "W"];

/// Every mailbox and queue of the server, created once.
///
/// Each task receives only the handles it uses; subscriptions are spelled out
/// in the `*_ports` methods.
struct Wiring {
    token: CancellationToken,
    requests: CommandQueue<String>,
    responses: CommandQueue<String>,

    estimator_v: Mailbox<f64>,
    estimator_w: Mailbox<f64>,
    estimator_measurement: Mailbox<Measurement>,

    planner_signal: UpdateSignal,
    planner_goal: Mailbox<Goal>,
    planner_state: Mailbox<State>,

    follower_path: Mailbox<Path>,
    follower_state: Mailbox<State>,
    follower_goal: Mailbox<Goal>,
    follower_v: Mailbox<f64>,

    command_goal: Mailbox<Goal>,
    command_state: Mailbox<State>,

    probe_path: Mailbox<Path>,
    probe_state: Mailbox<State>,
    probe_cmd_vel: Mailbox<CmdVel>,
    probe_status: Mailbox<FollowerStatus>,
}

impl Wiring {
    fn new() -> Self {
        let planner_signal = UpdateSignal::new();
        Self {
            token: CancellationToken::new(),
            requests: CommandQueue::new("requests"),
            responses: CommandQueue::new("responses"),
            estimator_v: Mailbox::new("state_estimator/reference_v"),
            estimator_w: Mailbox::new("state_estimator/reference_w"),
            estimator_measurement: Mailbox::new("state_estimator/measurement"),
            planner_goal: Mailbox::new("path_planner/goal").with_signal(&planner_signal),
            planner_state: Mailbox::new("path_planner/state").with_signal(&planner_signal),
            planner_signal,
            follower_path: Mailbox::new("path_follower/path"),
            follower_state: Mailbox::new("path_follower/state"),
            follower_goal: Mailbox::new("path_follower/goal"),
            follower_v: Mailbox::new("path_follower/reference_v"),
            command_goal: Mailbox::new("command_processor/goal"),
            command_state: Mailbox::new("command_processor/state"),
            probe_path: Mailbox::new("server/path"),
            probe_state: Mailbox::new("server/state"),
            probe_cmd_vel: Mailbox::new("server/cmd_vel"),
            probe_status: Mailbox::new("server/status"),
        }
    }

    fn estimator_ports(&self) -> EstimatorPorts {
        let mut state = Fanout::new("state");
        state
            .subscribe(self.planner_state.clone())
            .subscribe(self.follower_state.clone())
            .subscribe(self.command_state.clone())
            .subscribe(self.probe_state.clone());
        EstimatorPorts {
            reference_v: self.estimator_v.clone(),
            reference_w: self.estimator_w.clone(),
            measurement: self.estimator_measurement.clone(),
            state,
        }
    }

    fn planner_ports(&self) -> PlannerPorts {
        let mut path = Fanout::new("path");
        path.subscribe(self.follower_path.clone())
            .subscribe(self.probe_path.clone());
        PlannerPorts {
            goal: self.planner_goal.clone(),
            state: self.planner_state.clone(),
            inputs_changed: self.planner_signal.clone(),
            path,
            responses: self.responses.clone(),
        }
    }

    fn follower_ports(&self) -> FollowerPorts {
        let mut cmd_vel = Fanout::new("cmd_vel");
        cmd_vel.subscribe(self.probe_cmd_vel.clone());
        let mut status = Fanout::new("follower_status");
        status.subscribe(self.probe_status.clone());
        FollowerPorts {
            path: self.follower_path.clone(),
            state: self.follower_state.clone(),
            goal: self.follower_goal.clone(),
            reference_v: self.follower_v.clone(),
            cmd_vel,
            status,
        }
    }

    fn command_ports(&self) -> CommandPorts {
        let mut goal_out = Fanout::new("goal");
        goal_out
            .subscribe(self.planner_goal.clone())
            .subscribe(self.follower_goal.clone());
        let mut reference_v = Fanout::new("reference_v");
        reference_v
            .subscribe(self.estimator_v.clone())
            .subscribe(self.follower_v.clone());
        let mut reference_w = Fanout::new("reference_w");
        reference_w.subscribe(self.estimator_w.clone());
        CommandPorts {
            requests: self.requests.clone(),
            responses: self.responses.clone(),
            goal: self.command_goal.clone(),
            state: self.command_state.clone(),
            goal_out,
            reference_v,
            reference_w,
        }
    }

    fn measurement_fanout(&self) -> Fanout<Measurement> {
        let mut measurement = Fanout::new("measurement");
        measurement.subscribe(self.estimator_measurement.clone());
        measurement
    }
}

/// Handles for observing and driving a server from the outside
#[derive(Clone)]
pub struct ServerHandles {
    pub token: CancellationToken,
    pub requests: CommandQueue<String>,
    pub responses: CommandQueue<String>,
    pub path: Mailbox<Path>,
    pub state: Mailbox<State>,
    pub cmd_vel: Mailbox<CmdVel>,
    pub status: Mailbox<FollowerStatus>,
}

/// Outcome of one server run
#[derive(Debug)]
pub struct ServerReport {
    /// One report per task, in start order
    pub tasks: Vec<TaskReport>,
    pub supervisor_cycles: u64,
    pub uptime: Duration,
}

impl ServerReport {
    pub fn task(&self, name: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|report| report.name == name)
    }

    /// Tasks that crashed
    pub fn failures(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|report| report.is_failed())
    }

    pub fn is_failed(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn all_stopped(&self) -> bool {
        self.tasks
            .iter()
            .all(|report| report.state == TaskState::Stopped)
    }
}

impl fmt::Display for ServerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ROVER ran for {:.1}s ({} supervisor cycles)",
            self.uptime.as_secs_f64(),
            self.supervisor_cycles
        )?;
        for report in &self.tasks {
            writeln!(
                f,
                "  {:<18} {:<10} {:>6} ticks  {}",
                report.name,
                report.state.to_string(),
                report.metrics.total_ticks,
                report.outcome
            )?;
        }
        Ok(())
    }
}

/// Robot coordination server.
///
/// Built from a [`ServerConfig`] and a [`Map`]; the console, audit log and
/// measurement source can be replaced before [`run`](Server::run).
pub struct Server {
    config: ServerConfig,
    map: Arc<Mutex<Map>>,
    wiring: Wiring,
    console: Box<dyn Console>,
    audit: Box<dyn AuditLog>,
    measurement_source: Box<dyn MeasurementSource>,
}

impl Server {
    /// Server on `map` with collaborators chosen by `config`
    pub fn new(config: ServerConfig, map: Map) -> RoverResult<Self> {
        let console: Box<dyn Console> = match &config.client.script {
            Some(script) => Box::new(ScriptedConsole::from_file(script)?),
            None => Box::new(StdConsole::new()),
        };
        let audit: Box<dyn AuditLog> = match config.audit.kind {
            AuditKind::Json => Box::new(JsonAuditLog::new(config.audit.dir.clone())),
            AuditKind::None => Box::new(NullAuditLog),
        };
        let [x, y, theta] = config.estimator.initial_pose;
        let vehicle = SimulatedVehicle::new(config.vehicle.params()).with_pose(x, y, theta);

        Ok(Self {
            config,
            map: Arc::new(Mutex::new(map)),
            wiring: Wiring::new(),
            console,
            audit,
            measurement_source: Box::new(vehicle),
        })
    }

    /// Server on the grid map described by `config`
    pub fn from_config(config: ServerConfig) -> RoverResult<Self> {
        config.validate()?;
        let map = config.map.build()?;
        Self::new(config, map)
    }

    pub fn with_console(mut self, console: Box<dyn Console>) -> Self {
        self.console = console;
        self
    }

    pub fn with_audit_log(mut self, audit: Box<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_measurement_source(mut self, source: Box<dyn MeasurementSource>) -> Self {
        self.measurement_source = source;
        self
    }

    /// The shared cancellation token; cancelling it stops the server
    pub fn token(&self) -> CancellationToken {
        self.wiring.token.clone()
    }

    pub fn handles(&self) -> ServerHandles {
        ServerHandles {
            token: self.wiring.token.clone(),
            requests: self.wiring.requests.clone(),
            responses: self.wiring.responses.clone(),
            path: self.wiring.probe_path.clone(),
            state: self.wiring.probe_state.clone(),
            cmd_vel: self.wiring.probe_cmd_vel.clone(),
            status: self.wiring.probe_status.clone(),
        }
    }

    /// Run until the token is cancelled, then shut every task down.
    ///
    /// Cancellation comes from `EXIT`, a fatal task error, Ctrl+C or a
    /// caller holding the token.
    pub fn run(self) -> RoverResult<ServerReport> {
        let Server {
            config,
            map,
            wiring,
            console,
            audit,
            mut measurement_source,
        } = self;
        let started = Instant::now();

        for request in BOOTSTRAP_REQUESTS {
            wiring.requests.push(request.to_string());
        }

        let mut estimator = DiffDriveEkf::with_pose(config.estimator.initial_pose);
        estimator.set_process_noise(config.estimator.process_noise);
        estimator.set_measurement_noise(config.estimator.measurement_noise);
        let mut pursuit = PurePursuit::new(config.follower.look_ahead);
        pursuit.set_goal_tolerance(config.follower.goal_tolerance);

        let tasks: [Box<dyn rover_core::Task>; TASK_COUNT] = [
            Box::new(StateEstimatorTask::new(
                Box::new(estimator),
                wiring.estimator_ports(),
                config.estimator.cycle_period(),
            )),
            Box::new(PathPlannerTask::new(
                map,
                audit,
                wiring.planner_ports(),
                config.planner.to_planner_config(),
            )),
            Box::new(PathFollowerTask::new(
                Box::new(pursuit),
                wiring.follower_ports(),
                config.follower.goal_tolerance,
                config.follower.cycle_period(),
            )),
            Box::new(CommandProcessorTask::new(
                wiring.command_ports(),
                wiring.token.clone(),
            )),
            Box::new(ClientTask::new(
                console,
                wiring.requests.clone(),
                wiring.responses.clone(),
                config.client.cycle_period(),
            )),
        ];

        let mut pool = WorkerPool::new(config.server.workers);
        for task in tasks {
            if let Err(e) = pool.submit(task, wiring.token.clone()) {
                log::error!(target: "rover::server", "Failed to start task: {}", e);
                Self::shutdown(&wiring, pool, config.server.shutdown_grace());
                return Err(e);
            }
        }
        log::info!(
            target: "rover::server",
            "Started {} tasks on {} workers",
            pool.active(),
            pool.workers()
        );

        let period = config.server.supervisor_period();
        let measurement = wiring.measurement_fanout();
        let mut last_status: Option<FollowerStatus> = None;
        let mut supervisor_cycles = 0u64;
        loop {
            let cmd = wiring.probe_cmd_vel.read();
            measurement.publish(measurement_source.measure(&cmd, period.as_secs_f64()));

            if let Some(status) = wiring.probe_status.try_read() {
                if last_status.map_or(true, |last| !last.same_kind(&status)) {
                    log::info!(target: "rover::server", "Follower: {}", status);
                    last_status = Some(status);
                }
            }

            supervisor_cycles += 1;
            if pool.active() == 0 {
                log::info!(target: "rover::server", "All tasks finished");
                break;
            }
            if wiring.token.sleep(period) {
                break;
            }
        }

        let tasks = Self::shutdown(&wiring, pool, config.server.shutdown_grace());
        let report = ServerReport {
            tasks,
            supervisor_cycles,
            uptime: started.elapsed(),
        };
        for failure in report.failures() {
            log::error!(target: "rover::server", "Task '{}' {}", failure.name, failure.outcome);
        }
        Ok(report)
    }

    fn shutdown(wiring: &Wiring, pool: WorkerPool, grace: Duration) -> Vec<TaskReport> {
        log::info!(target: "rover::server", "Shutting down");
        wiring.token.cancel();
        // Wakes the command processor parked in pop_wait
        wiring.requests.close();
        wiring.responses.close();
        pool.join_timeout(grace)
    }
}
