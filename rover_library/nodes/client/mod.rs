use crate::traits::Console;
use rover_core::{CommandQueue, RoverResult, Task, TaskInfo, TickStatus};
use std::time::Duration;

/// Client Task - the operator side of the command protocol
///
/// Answers the processor's prompts (`SET_GOAL`, `V`, `W`) through the
/// console. After all three were answered once, forwards one console
/// command per cycle. End of input counts as `EXIT`.
pub struct ClientTask {
    console: Box<dyn Console>,
    requests: CommandQueue<String>,
    responses: CommandQueue<String>,
    cycle_period: Duration,
    goal_answered: bool,
    v_answered: bool,
    w_answered: bool,
    sent: u64,
}

impl ClientTask {
    pub fn new(
        console: Box<dyn Console>,
        requests: CommandQueue<String>,
        responses: CommandQueue<String>,
        cycle_period: Duration,
    ) -> Self {
        Self {
            console,
            requests,
            responses,
            cycle_period,
            goal_answered: false,
            v_answered: false,
            w_answered: false,
            sent: 0,
        }
    }

    /// Whether the goal and both reference velocities were entered
    pub fn bootstrapped(&self) -> bool {
        self.goal_answered && self.v_answered && self.w_answered
    }

    fn send(&mut self, request: String) {
        log::debug!(target: "rover::client", "-> {}", request);
        self.requests.push(request);
        self.sent += 1;
    }

    /// Send `EXIT` on behalf of an operator whose input ended
    fn end_of_input(&mut self, ctx: &mut TaskInfo) -> TickStatus {
        ctx.log_info("End of input, requesting exit");
        self.send("EXIT".to_string());
        TickStatus::Finished
    }

    /// Handle one response; `false` if input ended while prompting
    fn handle_response(&mut self, response: &str) -> bool {
        match response {
            "SET_GOAL" => {
                let x = match self.console.prompt_value("goal x") {
                    Some(x) => x,
                    None => return false,
                };
                let y = match self.console.prompt_value("goal y") {
                    Some(y) => y,
                    None => return false,
                };
                self.send(format!("GOAL;{};{}", x, y));
                self.goal_answered = true;
            }
            "V" | "W" => {
                let label = if response == "V" {
                    "reference linear velocity"
                } else {
                    "reference angular velocity"
                };
                let value = match self.console.prompt_value(label) {
                    Some(value) => value,
                    None => return false,
                };
                self.send(format!("{};{}", response, value));
                if response == "V" {
                    self.v_answered = true;
                } else {
                    self.w_answered = true;
                }
            }
            other => self.console.show(other),
        }
        true
    }
}

impl Task for ClientTask {
    fn name(&self) -> &'static str {
        "client"
    }

    fn tick(&mut self, ctx: &mut TaskInfo) -> RoverResult<TickStatus> {
        while let Some(response) = self.responses.try_pop() {
            if !self.handle_response(&response) {
                return Ok(self.end_of_input(ctx));
            }
        }

        if !self.bootstrapped() {
            return Ok(TickStatus::Continue);
        }

        match self.console.read_command() {
            Some(command) => {
                let exit = command.trim() == "EXIT";
                self.send(command);
                if exit {
                    ctx.log_info(&format!("Exit sent after {} requests", self.sent));
                    return Ok(TickStatus::Finished);
                }
                Ok(TickStatus::Continue)
            }
            None => Ok(self.end_of_input(ctx)),
        }
    }

    fn cycle_period(&self) -> Duration {
        self.cycle_period
    }
}
