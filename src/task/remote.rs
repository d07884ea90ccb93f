//! Remote execution by command rewrite
//!
//! A remote task is built by turning `command` into
//! `[remote_shell..., hostname, "quoted command"]` and handing that to an
//! ordinary [`Task`]. The remote side's shell re-splits the quoted string, so
//! every argument must come back with its original boundaries.

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::models::task::{CommandVector, TaskConfig, TaskOrigin};
use crate::models::transport::Transport;
use crate::task::Task;

/// Tasks that run on another host through the remote shell.
pub struct RemoteTask;

impl RemoteTask {
    pub fn new(hostname: &str, command: CommandVector, config: TaskConfig) -> Result<Task> {
        Self::with_transport(&Transport::default(), hostname, command, config)
    }

    /// The working directory and environment in `config` apply on the remote
    /// side; they are folded into the remote command string and not used for
    /// the local transport process.
    pub fn with_transport(
        transport: &Transport,
        hostname: &str,
        command: CommandVector,
        mut config: TaskConfig,
    ) -> Result<Task> {
        if transport.remote_shell.is_empty() {
            return Err(Error::EmptyCommand);
        }
        check_hostname(hostname)?;
        let remote_command = remote_command_line(&command, &config)?;

        let mut args = transport.remote_shell.clone();
        args.push(hostname.to_string());
        args.push(remote_command);
        let wrapped = CommandVector::new(args)?;
        log::debug!("Wrapped '{}' for {}: {:?}", command, hostname, wrapped.as_slice());

        config.working_dir = None;
        config.env.clear();
        Ok(Task::new(
            wrapped,
            config,
            TaskOrigin::Remote {
                hostname: hostname.to_string(),
                command,
            },
        ))
    }
}

/// The hostname lands in the transport's argv unquoted, so it must not be
/// empty or look like an option.
pub(crate) fn check_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() || hostname.starts_with('-') {
        return Err(Error::InvalidHostname(hostname.to_string()));
    }
    Ok(())
}

/// Serializes a command for a POSIX remote shell, e.g.
/// `cd '/srv/app' && env 'MODE=fast' make 'all tests'`.
pub fn remote_command_line(command: &CommandVector, config: &TaskConfig) -> Result<String> {
    let mut line = String::new();

    if let Some(dir) = &config.working_dir {
        let dir = dir
            .to_str()
            .ok_or_else(|| Error::Quote(format!("non UTF-8 path {}", dir.display())))?;
        line.push_str("cd ");
        line.push_str(&quote(dir)?);
        line.push_str(" && ");
    }

    if !config.env.is_empty() {
        line.push_str("env");
        for (key, value) in &config.env {
            line.push(' ');
            line.push_str(&quote(&format!("{}={}", key, value))?);
        }
        line.push(' ');
    }

    let words = command.as_slice().iter().map(String::as_str);
    line.push_str(&shlex::try_join(words).map_err(|e| Error::Quote(e.to_string()))?);
    Ok(line)
}

fn quote(word: &str) -> Result<Cow<'_, str>> {
    shlex::try_quote(word).map_err(|e| Error::Quote(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(args: &[&str]) -> CommandVector {
        CommandVector::new(args.iter().copied()).unwrap()
    }

    #[test]
    fn wraps_with_ssh_and_hostname() {
        let task = RemoteTask::new("db1", cmd(&["echo", "hi"]), TaskConfig::default()).unwrap();
        assert_eq!(task.command().as_slice(), ["ssh", "db1", "echo hi"]);
        assert_eq!(
            task.origin(),
            &TaskOrigin::Remote {
                hostname: "db1".into(),
                command: cmd(&["echo", "hi"]),
            }
        );
    }

    #[test]
    fn argument_boundaries_survive_remote_split() {
        let original = ["printf", "%s|", "two words", "it's", "$HOME", "", "a\"b", "*"];
        let line = remote_command_line(&cmd(&original), &TaskConfig::default()).unwrap();
        assert_eq!(shlex::split(&line).unwrap(), original);
    }

    #[test]
    fn working_dir_and_env_move_to_remote_side() {
        let config = TaskConfig::default()
            .with_working_dir("/srv/my app")
            .with_env("MODE", "fast mode");
        let task = RemoteTask::new("h", cmd(&["make"]), config).unwrap();

        let line = &task.command().as_slice()[2];
        assert_eq!(
            shlex::split(line).unwrap(),
            ["cd", "/srv/my app", "&&", "env", "MODE=fast mode", "make"]
        );
        assert!(task.config().working_dir.is_none());
        assert!(task.config().env.is_empty());
    }

    #[test]
    fn quiet_is_kept_for_transport_process() {
        let task = RemoteTask::new("h", cmd(&["true"]), TaskConfig::quiet()).unwrap();
        assert!(task.config().quiet);
    }

    #[test]
    fn custom_transport_prefix_is_used() {
        let transport = Transport {
            remote_shell: vec!["ssh".into(), "-p".into(), "2222".into()],
            ..Transport::default()
        };
        let task =
            RemoteTask::with_transport(&transport, "h", cmd(&["id"]), TaskConfig::default())
                .unwrap();
        assert_eq!(task.command().as_slice(), ["ssh", "-p", "2222", "h", "id"]);
    }

    #[test]
    fn nul_byte_cannot_be_quoted() {
        let result = RemoteTask::new("h", cmd(&["echo", "a\0b"]), TaskConfig::default());
        assert!(matches!(result, Err(Error::Quote(_))));
    }

    #[test]
    fn empty_remote_shell_is_rejected() {
        let transport = Transport {
            remote_shell: vec![],
            ..Transport::default()
        };
        let result =
            RemoteTask::with_transport(&transport, "h", cmd(&["id"]), TaskConfig::default());
        assert!(matches!(result, Err(Error::EmptyCommand)));
    }

    #[test]
    fn hostname_must_not_look_like_an_option() {
        for hostname in ["", "-oProxyCommand=touch pwned", "-p"] {
            let result = RemoteTask::new(hostname, cmd(&["id"]), TaskConfig::default());
            assert!(
                matches!(result, Err(Error::InvalidHostname(ref h)) if h == hostname),
                "{:?}",
                hostname
            );
        }
        assert!(RemoteTask::new("user@db-1", cmd(&["id"]), TaskConfig::default()).is_ok());
    }
}
