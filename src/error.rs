//! Error types for remtask
//!
//! A non-zero exit code is never an error here; it is reported through the
//! task as data.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Lifecycle misuse: double start, wait before start, reading results early.
    #[error("cannot {operation} a task that is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The OS could not create the child process.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{operation} is not supported on host '{hostname}'")]
    UnsupportedOperation {
        operation: &'static str,
        hostname: String,
    },

    #[error("no task with id {0}")]
    UnknownTask(u64),

    #[error("command vector must name a program")]
    EmptyCommand,

    #[error("cannot quote argument for the remote shell: {0}")]
    Quote(String),

    /// A transport entry that cannot be used, e.g. an empty program list.
    #[error("invalid transport: {0}")]
    Transport(String),

    #[error("invalid transport config {}: {}", .path.display(), .message)]
    Config { path: PathBuf, message: String },

    /// Empty, or would be read as an option by the remote shell program.
    #[error("invalid hostname '{0}'")]
    InvalidHostname(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_operation_and_state() {
        let err = Error::InvalidState {
            operation: "start",
            state: "running",
        };
        assert_eq!(err.to_string(), "cannot start a task that is running");
    }

    #[test]
    fn spawn_error_keeps_io_source() {
        let err = Error::Spawn {
            program: "nope".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("failed to spawn 'nope'"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_hostname_quotes_the_name() {
        let err = Error::InvalidHostname("-oProxyCommand=x".into());
        assert_eq!(err.to_string(), "invalid hostname '-oProxyCommand=x'");
    }
}
