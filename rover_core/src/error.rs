//! Error taxonomy for ROVER
//!
//! Every fallible operation in the workspace returns [`RoverResult`]. Errors are
//! split into *fatal* ones, which terminate the task that raised them and bring
//! the server down, and *recoverable* ones, which are handled at the task
//! boundary (usually by turning them into a response on the command channel).

use thiserror::Error;

/// Main error type for ROVER operations
#[derive(Debug, Error)]
pub enum RoverError {
    /// Bad configuration: unreadable config files, or a map that has no vertex
    /// near the robot state or the goal
    #[error("Configuration error: {0}")]
    Config(String),

    /// A* did not produce a predecessor chain connecting start and goal
    #[error("No path exists between vertex {start} and vertex {goal}")]
    EmptyPath { start: usize, goal: usize },

    /// Malformed command text
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A lookup failed (e.g. an id missing from a predecessor map)
    #[error("Not found: {0}")]
    NotFound(String),

    /// All workers of the pool are busy
    #[error("Worker pool exhausted: all {workers} workers are busy")]
    PoolExhausted { workers: usize },

    /// A task panicked inside its tick
    #[error("Task '{task}' panicked: {message}")]
    TaskPanicked { task: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed config file contents
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ROVER operations
pub type RoverResult<T> = Result<T, RoverError>;

impl RoverError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        RoverError::Config(msg.into())
    }

    /// Create a protocol error
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        RoverError::Protocol(msg.into())
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        RoverError::NotFound(msg.into())
    }

    /// Whether this error must terminate the task that raised it.
    ///
    /// No supervisor restarts tasks, so a fatal error ends the server.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RoverError::Config(_)
                | RoverError::Toml(_)
                | RoverError::EmptyPath { .. }
                | RoverError::TaskPanicked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RoverError::config("no vertex").is_fatal());
        assert!(RoverError::EmptyPath { start: 0, goal: 15 }.is_fatal());
        assert!(!RoverError::protocol("bad").is_fatal());
        assert!(!RoverError::not_found("id 3").is_fatal());
        assert!(!RoverError::PoolExhausted { workers: 5 }.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = RoverError::EmptyPath { start: 0, goal: 15 };
        assert_eq!(err.to_string(), "No path exists between vertex 0 and vertex 15");

        let err = RoverError::protocol("GOAL needs 2 coordinates");
        assert_eq!(err.to_string(), "Protocol error: GOAL needs 2 coordinates");
    }

    #[test]
    fn test_toml_conversion() {
        fn parse(text: &str) -> RoverResult<toml::Value> {
            Ok(toml::from_str(text)?)
        }
        let err = parse("workers = ").unwrap_err();
        assert!(matches!(err, RoverError::Toml(_)));
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("TOML parse error: "));
    }

    #[test]
    fn test_io_conversion() {
        fn open_missing() -> RoverResult<String> {
            Ok(std::fs::read_to_string("/definitely/not/a/real/rover/file")?)
        }
        assert!(matches!(open_missing(), Err(RoverError::Io(_))));
    }
}
