use crate::messages::{ControlInput, Measurement, State};
use crate::traits::Estimator;
use rover_core::{Fanout, Mailbox, RoverResult, Task, TaskInfo, TickStatus};
use std::time::Duration;

/// Mailboxes the state estimator reads and the channel it publishes on
pub struct EstimatorPorts {
    pub reference_v: Mailbox<f64>,
    pub reference_w: Mailbox<f64>,
    pub measurement: Mailbox<Measurement>,
    pub state: Fanout<State>,
}

/// State Estimator Task - fuses commanded motion and pose measurements
///
/// Publishes a fresh [`State`] to every subscriber once per cycle, whether or
/// not anything changed.
pub struct StateEstimatorTask {
    estimator: Box<dyn Estimator>,
    ports: EstimatorPorts,
    cycle_period: Duration,
}

impl StateEstimatorTask {
    pub fn new(estimator: Box<dyn Estimator>, ports: EstimatorPorts, cycle_period: Duration) -> Self {
        Self {
            estimator,
            ports,
            cycle_period,
        }
    }
}

impl Task for StateEstimatorTask {
    fn name(&self) -> &'static str {
        "state_estimator"
    }

    fn init(&mut self, ctx: &mut TaskInfo) -> RoverResult<()> {
        ctx.log_info(&format!(
            "Publishing state to {} subscribers every {:?}",
            self.ports.state.len(),
            self.cycle_period
        ));
        Ok(())
    }

    fn tick(&mut self, _ctx: &mut TaskInfo) -> RoverResult<TickStatus> {
        let v = self.ports.reference_v.read();
        let w = self.ports.reference_w.read();
        let dt = self.cycle_period.as_secs_f64();

        self.estimator
            .predict(&ControlInput::from_velocities(v, w, dt));
        if let Some(measurement) = self.ports.measurement.try_read() {
            self.estimator.update(&measurement);
        }

        let mut state = self.estimator.state();
        state.v = v;
        state.w = w;
        self.ports.state.publish(state);

        Ok(TickStatus::Continue)
    }

    fn cycle_period(&self) -> Duration {
        self.cycle_period
    }
}
