//! Operator console implementations.

use crate::traits::Console;
use colored::Colorize;
use parking_lot::Mutex;
use rover_core::RoverResult;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Interactive console on stdin/stdout
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{} ", prompt.cyan().bold());
        // Prompt is best effort
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                log::warn!(target: "rover::console", "Failed to read stdin: {}", e);
                None
            }
        }
    }
}

impl Console for StdConsole {
    fn prompt_value(&mut self, label: &str) -> Option<String> {
        self.read_line(&format!("Enter {}:", label))
    }

    fn read_command(&mut self) -> Option<String> {
        self.read_line(">")
    }

    fn show(&mut self, text: &str) {
        println!("{}", text.green());
    }
}

/// Console fed from a fixed list of input lines.
///
/// Everything shown is captured; clones share the captured output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    inputs: Arc<Mutex<VecDeque<String>>>,
    outputs: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: Arc::new(Mutex::new(inputs.into_iter().map(Into::into).collect())),
            outputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// One input per non-empty line; lines starting with `#` are skipped
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RoverResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ))
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs.lock().clone()
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.lock().len()
    }

    fn next_input(&self) -> Option<String> {
        self.inputs.lock().pop_front()
    }
}

impl Console for ScriptedConsole {
    fn prompt_value(&mut self, label: &str) -> Option<String> {
        log::debug!(target: "rover::console", "prompt: {}", label);
        self.next_input()
    }

    fn read_command(&mut self) -> Option<String> {
        self.next_input()
    }

    fn show(&mut self, text: &str) {
        log::info!(target: "rover::console", "{}", text);
        self.outputs.lock().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_inputs_in_order() {
        let mut console = ScriptedConsole::new(["3;4", "PRINT"]);
        assert_eq!(console.prompt_value("goal").as_deref(), Some("3;4"));
        assert_eq!(console.read_command().as_deref(), Some("PRINT"));
        assert_eq!(console.read_command(), None);
    }

    #[test]
    fn test_outputs_shared_between_clones() {
        let console = ScriptedConsole::new(Vec::<String>::new());
        let mut writer = console.clone();
        writer.show("hello");
        assert_eq!(console.outputs(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_from_file_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("session.txt");
        std::fs::write(&file, "# setup\n3;3\n\n0.5\n0.0\nEXIT\n").unwrap();

        let console = ScriptedConsole::from_file(&file).unwrap();
        assert_eq!(console.remaining_inputs(), 4);
    }
}
