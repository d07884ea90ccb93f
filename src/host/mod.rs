//! Hosts: named endpoints that build tasks bound to themselves
//!
//! A host holds nothing but its name and the transport programs to use, so
//! one host value can hand out any number of independent tasks.

pub mod local;
pub mod remote;

use crate::error::{Error, Result};
use crate::models::task::{CommandVector, TaskConfig};
use crate::task::Task;

pub use local::LocalHost;
pub use remote::RemoteHost;

pub trait Host {
    fn hostname(&self) -> &str;

    /// A task running `command` on this host.
    fn run(&self, command: CommandVector, config: TaskConfig) -> Result<Task>;

    /// Pushes `local_path` to `remote_path` (default: the same path) on this host.
    fn send_file(
        &self,
        local_path: &str,
        remote_path: Option<&str>,
        config: TaskConfig,
    ) -> Result<Task>;

    /// Pulls `remote_path` from this host to `local_path` (default: the same path).
    fn get_file(
        &self,
        remote_path: &str,
        local_path: Option<&str>,
        config: TaskConfig,
    ) -> Result<Task>;

    /// Moves or renames a file on this host.
    fn move_file(&self, source: &str, destination: &str, config: TaskConfig) -> Result<Task>;
}

/// `None` and `Some("")` both mean "same path as the source".
fn destination_or<'a>(destination: Option<&'a str>, source: &'a str) -> &'a str {
    match destination {
        Some(path) if !path.is_empty() => path,
        _ => source,
    }
}

/// `program... operands...` from a transport entry and the host's operands.
/// An empty entry is an error even though the operands alone would be non-empty.
fn transport_command(prefix: &[String], operands: &[&str]) -> Result<CommandVector> {
    if prefix.is_empty() {
        return Err(Error::EmptyCommand);
    }
    CommandVector::new(
        prefix
            .iter()
            .cloned()
            .chain(operands.iter().map(|s| s.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_defaults_to_source() {
        assert_eq!(destination_or(None, "a.txt"), "a.txt");
        assert_eq!(destination_or(Some(""), "a.txt"), "a.txt");
        assert_eq!(destination_or(Some("b.txt"), "a.txt"), "b.txt");
    }

    #[test]
    fn transport_command_appends_operands() {
        let prefix = vec!["rsync".to_string(), "-ut".to_string()];
        let command = transport_command(&prefix, &["a", "h:a"]).unwrap();
        assert_eq!(command.as_slice(), ["rsync", "-ut", "a", "h:a"]);
    }

    #[test]
    fn empty_transport_entry_is_not_replaced_by_operands() {
        let err = transport_command(&[], &["a", "b"]).unwrap_err();
        assert!(matches!(err, Error::EmptyCommand));
    }
}
