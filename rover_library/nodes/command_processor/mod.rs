use crate::messages::{Goal, State};
use rover_core::{
    CancellationToken, CommandQueue, Fanout, Mailbox, RoverError, RoverResult, Task, TaskInfo,
    TickStatus,
};
use std::time::Duration;

pub const GOAL_ARITY_MESSAGE: &str =
    "You want to update the goal. 2 coordinates are required separated by ;.";
pub const UNKNOWN_COMMAND_MESSAGE: &str = "You entered an unknown command. Try again";
pub const NO_GOAL_MESSAGE: &str = "No goal has been set";

pub struct CommandPorts {
    pub requests: CommandQueue<String>,
    pub responses: CommandQueue<String>,
    /// Latest goal, including the ones this task published itself
    pub goal: Mailbox<Goal>,
    pub state: Mailbox<State>,
    pub goal_out: Fanout<Goal>,
    pub reference_v: Fanout<f64>,
    pub reference_w: Fanout<f64>,
}

/// Command Processor Task - turns operator requests into mailbox updates
///
/// Blocks on the requests queue; finishes once the queue is closed.
pub struct CommandProcessorTask {
    ports: CommandPorts,
    token: CancellationToken,
    handled: u64,
}

impl CommandProcessorTask {
    pub fn new(ports: CommandPorts, token: CancellationToken) -> Self {
        Self {
            ports,
            token,
            handled: 0,
        }
    }

    /// Number of requests handled so far
    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Apply one request and return the responses it produced
    pub fn process(&mut self, request: &str) -> Vec<String> {
        self.handled += 1;
        match self.dispatch(request) {
            Ok(responses) => responses,
            Err(e) => vec![protocol_message(e)],
        }
    }

    fn dispatch(&mut self, request: &str) -> RoverResult<Vec<String>> {
        let mut tokens: Vec<&str> = request.split(';').map(str::trim).collect();
        // `GOAL;3;4;` carries the same fields as `GOAL;3;4`
        if tokens.len() > 1 && tokens.last() == Some(&"") {
            tokens.pop();
        }
        let (verb, args) = match tokens.split_first() {
            Some((verb, args)) => (*verb, args),
            None => return Err(RoverError::protocol(UNKNOWN_COMMAND_MESSAGE)),
        };

        match verb {
            "GOAL" => {
                if args.len() != 2 {
                    return Ok(vec![
                        GOAL_ARITY_MESSAGE.to_string(),
                        "SET_GOAL".to_string(),
                    ]);
                }
                let goal = match (parse_number(args[0]), parse_number(args[1])) {
                    (Ok(x), Ok(y)) => Goal::new(x, y),
                    (Err(e), _) | (_, Err(e)) => {
                        // Re-prompt, as for a wrong coordinate count
                        return Ok(vec![protocol_message(e), "SET_GOAL".to_string()]);
                    }
                };
                log::info!(target: "rover::command", "New goal {}", goal);
                self.ports.goal.publish(goal);
                self.ports.goal_out.publish(goal);
                Ok(Vec::new())
            }
            "SET_GOAL" if args.is_empty() => Ok(vec!["SET_GOAL".to_string()]),
            "V" | "W" => match args {
                [] => Ok(vec![verb.to_string()]),
                [value] => {
                    let value = parse_number(value)?;
                    let fanout = if verb == "V" {
                        &self.ports.reference_v
                    } else {
                        &self.ports.reference_w
                    };
                    log::info!(target: "rover::command", "Reference {} = {}", verb, value);
                    fanout.publish(value);
                    Ok(Vec::new())
                }
                _ => Err(RoverError::protocol(format!(
                    "{} expects a single value, e.g. {};0.5",
                    verb, verb
                ))),
            },
            "EXIT" if args.is_empty() => {
                log::info!(target: "rover::command", "Exit requested");
                self.token.cancel();
                Ok(Vec::new())
            }
            "PRINT" if args.is_empty() => Ok(vec![self.ports.state.read().to_string()]),
            "PRINT_GOAL" if args.is_empty() => Ok(vec![self
                .ports
                .goal
                .try_read()
                .map_or_else(|| NO_GOAL_MESSAGE.to_string(), |goal| goal.to_string())]),
            _ => Err(RoverError::protocol(UNKNOWN_COMMAND_MESSAGE)),
        }
    }
}

fn protocol_message(error: RoverError) -> String {
    match error {
        RoverError::Protocol(message) => message,
        other => other.to_string(),
    }
}

fn parse_number(token: &str) -> RoverResult<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RoverError::protocol(format!(
            "Could not parse '{}' as a number",
            token
        ))),
    }
}

impl Task for CommandProcessorTask {
    fn name(&self) -> &'static str {
        "command_processor"
    }

    fn tick(&mut self, ctx: &mut TaskInfo) -> RoverResult<TickStatus> {
        let request = match self.ports.requests.pop_wait() {
            Some(request) => request,
            None => {
                ctx.log_debug(&format!("Requests closed after {} commands", self.handled));
                return Ok(TickStatus::Finished);
            }
        };
        ctx.log_debug(&format!("Request '{}'", request));

        for response in self.process(&request) {
            self.ports.responses.push(response);
        }
        Ok(TickStatus::Continue)
    }

    fn cycle_period(&self) -> Duration {
        // pop_wait is the suspension point
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        task: CommandProcessorTask,
        token: CancellationToken,
        requests: CommandQueue<String>,
        responses: CommandQueue<String>,
        state: Mailbox<State>,
        planner_goal: Mailbox<Goal>,
        v: Mailbox<f64>,
        w: Mailbox<f64>,
    }

    fn fixture() -> Fixture {
        let token = CancellationToken::new();
        let requests = CommandQueue::new("requests");
        let responses = CommandQueue::new("responses");
        let own_goal = Mailbox::new("command/goal");
        let state = Mailbox::new("command/state");
        let planner_goal = Mailbox::new("planner/goal");
        let v = Mailbox::new("estimator/v");
        let w = Mailbox::new("estimator/w");

        let mut goal_out = Fanout::new("goal");
        goal_out.subscribe(planner_goal.clone());
        let mut reference_v = Fanout::new("reference_v");
        reference_v.subscribe(v.clone());
        let mut reference_w = Fanout::new("reference_w");
        reference_w.subscribe(w.clone());

        let task = CommandProcessorTask::new(
            CommandPorts {
                requests: requests.clone(),
                responses: responses.clone(),
                goal: own_goal,
                state: state.clone(),
                goal_out,
                reference_v,
                reference_w,
            },
            token.clone(),
        );
        Fixture {
            task,
            token,
            requests,
            responses,
            state,
            planner_goal,
            v,
            w,
        }
    }

    #[test]
    fn test_goal_is_published() {
        let mut f = fixture();
        assert!(f.task.process("GOAL;3.0;4.0").is_empty());
        assert_eq!(f.planner_goal.read(), Goal::new(3.0, 4.0));
        assert_eq!(f.task.process("PRINT_GOAL"), vec!["Goal: x=3.000, y=4.000"]);
    }

    #[test]
    fn test_goal_with_one_coordinate() {
        let mut f = fixture();
        assert_eq!(
            f.task.process("GOAL;1.0"),
            vec![GOAL_ARITY_MESSAGE.to_string(), "SET_GOAL".to_string()]
        );
        assert!(!f.planner_goal.peek_updated());
    }

    #[test]
    fn test_trailing_separator_is_ignored() {
        let mut f = fixture();
        assert!(f.task.process("GOAL;3;4;").is_empty());
        assert_eq!(f.planner_goal.read(), Goal::new(3.0, 4.0));
        assert!(f.task.process("V;0.5;").is_empty());
        assert_eq!(f.v.read(), 0.5);
        assert_eq!(f.task.process("PRINT_GOAL;"), vec!["Goal: x=3.000, y=4.000"]);
        assert_eq!(
            f.task.process("GOAL;3;4;;"),
            vec![GOAL_ARITY_MESSAGE.to_string(), "SET_GOAL".to_string()]
        );
    }

    #[test]
    fn test_reference_velocities() {
        let mut f = fixture();
        assert!(f.task.process("V;1.5").is_empty());
        assert!(f.task.process(" W ; -0.25 ").is_empty());
        assert_eq!(f.v.read(), 1.5);
        assert_eq!(f.w.read(), -0.25);

        assert_eq!(f.task.process("V"), vec!["V"]);
        assert_eq!(
            f.task.process("W;1;2"),
            vec!["W expects a single value, e.g. W;0.5"]
        );
    }

    #[test]
    fn test_bad_numbers() {
        let mut f = fixture();
        assert_eq!(
            f.task.process("GOAL;abc;4"),
            vec!["Could not parse 'abc' as a number", "SET_GOAL"]
        );
        assert_eq!(
            f.task.process("GOAL;3;nan"),
            vec!["Could not parse 'nan' as a number", "SET_GOAL"]
        );
        assert!(!f.planner_goal.peek_updated());
        assert_eq!(f.task.process("V;inf"), vec!["Could not parse 'inf' as a number"]);
        assert!(!f.v.peek_updated());
    }

    #[test]
    fn test_print_and_unknown() {
        let mut f = fixture();
        f.state.publish(State::new(1.0, 2.0, 0.0, 0.0, 0.0));
        assert_eq!(
            f.task.process("PRINT"),
            vec!["State: x=1.000, y=2.000, theta=0.000, v=0.000, w=0.000"]
        );
        assert_eq!(f.task.process("FOO"), vec![UNKNOWN_COMMAND_MESSAGE]);
        assert_eq!(f.task.process(""), vec![UNKNOWN_COMMAND_MESSAGE]);
        assert_eq!(f.task.process("PRINT_GOAL"), vec![NO_GOAL_MESSAGE]);
        assert_eq!(f.task.process("SET_GOAL"), vec!["SET_GOAL"]);
    }

    #[test]
    fn test_exit_cancels_token() {
        let mut f = fixture();
        assert!(f.task.process("EXIT").is_empty());
        assert!(f.token.cancelled());
    }

    #[test]
    fn test_tick_forwards_responses_and_finishes_on_close() {
        let mut f = fixture();
        let mut ctx = TaskInfo::new("command_processor");
        f.requests.push("FOO".to_string());
        f.requests.close();

        assert_eq!(f.task.tick(&mut ctx).unwrap(), TickStatus::Continue);
        assert_eq!(
            f.responses.try_pop().as_deref(),
            Some(UNKNOWN_COMMAND_MESSAGE)
        );
        assert_eq!(f.task.tick(&mut ctx).unwrap(), TickStatus::Finished);
        assert_eq!(f.task.handled(), 1);
    }
}
