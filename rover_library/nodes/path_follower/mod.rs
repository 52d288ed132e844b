use crate::messages::{CmdVel, FollowerStatus, Goal, Path, State};
use crate::traits::ControlLaw;
use rover_core::{Fanout, Mailbox, RoverResult, Task, TaskInfo, TickStatus};
use std::time::Duration;

pub struct FollowerPorts {
    pub path: Mailbox<Path>,
    pub state: Mailbox<State>,
    pub goal: Mailbox<Goal>,
    pub reference_v: Mailbox<f64>,
    pub cmd_vel: Fanout<CmdVel>,
    pub status: Fanout<FollowerStatus>,
}

/// Path Follower Task - drives along the latest path
///
/// Never blocks: without a path it reports `Idle`, near the final waypoint it
/// stops and reports `GoalReached` once per path.
pub struct PathFollowerTask {
    control: Box<dyn ControlLaw>,
    ports: FollowerPorts,
    goal_tolerance: f64,
    cycle_period: Duration,
    tracked_ids: Vec<usize>,
    reached: bool,
}

impl PathFollowerTask {
    pub fn new(
        control: Box<dyn ControlLaw>,
        ports: FollowerPorts,
        goal_tolerance: f64,
        cycle_period: Duration,
    ) -> Self {
        Self {
            control,
            ports,
            goal_tolerance,
            cycle_period,
            tracked_ids: Vec::new(),
            reached: false,
        }
    }

    fn track(&mut self, ctx: &mut TaskInfo, path: &Path) {
        let ids = path.ids();
        if ids != self.tracked_ids {
            ctx.log_debug(&format!("Following new path {:?}", ids));
            self.tracked_ids = ids;
            self.reached = false;
            self.control.reset();
        }
    }
}

impl Task for PathFollowerTask {
    fn name(&self) -> &'static str {
        "path_follower"
    }

    fn tick(&mut self, ctx: &mut TaskInfo) -> RoverResult<TickStatus> {
        let path = match self.ports.path.try_read() {
            Some(path) if !path.is_empty() => path,
            _ => {
                self.ports.status.publish(FollowerStatus::Idle);
                return Ok(TickStatus::Continue);
            }
        };
        self.track(ctx, &path);

        let state = self.ports.state.read();
        let last = match path.last() {
            Some(waypoint) => waypoint.position,
            None => return Ok(TickStatus::Continue),
        };
        let remaining = last.distance(&state.position());

        if self.reached || remaining < self.goal_tolerance {
            if !self.reached {
                self.reached = true;
                let goal = self.ports.goal.try_read();
                ctx.log_info(&format!(
                    "Goal reached at {} (requested {})",
                    last,
                    goal.map_or_else(|| "none".to_string(), |g| g.to_string())
                ));
                self.ports
                    .status
                    .publish(FollowerStatus::GoalReached { goal: last });
            }
            self.ports.cmd_vel.publish(CmdVel::zero());
            return Ok(TickStatus::Continue);
        }

        let reference_speed = self.ports.reference_v.read();
        let cmd = self.control.compute(&path, &state, reference_speed);
        self.ports.cmd_vel.publish(cmd);
        self.ports
            .status
            .publish(FollowerStatus::Tracking { remaining });

        Ok(TickStatus::Continue)
    }

    fn cycle_period(&self) -> Duration {
        self.cycle_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::pure_pursuit::PurePursuit;
    use crate::messages::{Point2, Waypoint};

    struct Fixture {
        task: PathFollowerTask,
        path: Mailbox<Path>,
        state: Mailbox<State>,
        v: Mailbox<f64>,
        cmd_vel: Mailbox<CmdVel>,
        status: Mailbox<FollowerStatus>,
    }

    fn fixture() -> Fixture {
        let path = Mailbox::new("follower/path");
        let state = Mailbox::new("follower/state");
        let v = Mailbox::new("follower/v");
        let cmd_vel = Mailbox::new("probe/cmd_vel");
        let status = Mailbox::new("probe/status");
        let mut cmd_fanout = Fanout::new("cmd_vel");
        cmd_fanout.subscribe(cmd_vel.clone());
        let mut status_fanout = Fanout::new("status");
        status_fanout.subscribe(status.clone());

        let task = PathFollowerTask::new(
            Box::new(PurePursuit::new(0.5)),
            FollowerPorts {
                path: path.clone(),
                state: state.clone(),
                goal: Mailbox::new("follower/goal"),
                reference_v: v.clone(),
                cmd_vel: cmd_fanout,
                status: status_fanout,
            },
            0.15,
            Duration::from_millis(100),
        );
        Fixture {
            task,
            path,
            state,
            v,
            cmd_vel,
            status,
        }
    }

    fn straight_path() -> Path {
        Path::new(
            (0..4)
                .map(|i| Waypoint {
                    id: i,
                    position: Point2::new(i as f64, 0.0),
                })
                .collect(),
        )
    }

    #[test]
    fn test_idle_without_path() {
        let mut f = fixture();
        let mut ctx = TaskInfo::new("path_follower");
        f.task.tick(&mut ctx).unwrap();

        assert_eq!(f.status.read(), FollowerStatus::Idle);
        assert!(!f.cmd_vel.peek_updated());
    }

    #[test]
    fn test_tracks_path() {
        let mut f = fixture();
        let mut ctx = TaskInfo::new("path_follower");
        f.path.publish(straight_path());
        f.state.publish(State::default());
        f.v.publish(0.5);

        f.task.tick(&mut ctx).unwrap();
        assert_eq!(f.cmd_vel.read().linear, 0.5);
        assert!(matches!(
            f.status.read(),
            FollowerStatus::Tracking { remaining } if (remaining - 3.0).abs() < 1e-9
        ));
    }

    #[test]
    fn test_goal_reached_once_per_path() {
        let mut f = fixture();
        let mut ctx = TaskInfo::new("path_follower");
        f.path.publish(straight_path());
        f.state.publish(State::new(2.95, 0.0, 0.0, 0.0, 0.0));
        f.v.publish(0.5);

        f.task.tick(&mut ctx).unwrap();
        f.task.tick(&mut ctx).unwrap();
        assert!(f.cmd_vel.read().is_stop());
        assert!(matches!(f.status.read(), FollowerStatus::GoalReached { .. }));
        // Status is published on the transition only
        assert_eq!(f.status.metrics().publishes, 1);

        // A new path starts tracking again
        f.path.publish(Path::new(vec![Waypoint {
            id: 9,
            position: Point2::new(0.0, 3.0),
        }]));
        f.task.tick(&mut ctx).unwrap();
        assert!(matches!(f.status.read(), FollowerStatus::Tracking { .. }));
    }
}
