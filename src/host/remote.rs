use crate::error::Result;
use crate::host::{destination_or, transport_command, Host};
use crate::models::task::{CommandVector, TaskConfig};
use crate::models::transport::Transport;
use crate::task::remote::check_hostname;
use crate::task::{RemoteTask, SubprocessTask, Task};

/// A host reached through the remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    hostname: String,
    transport: Transport,
}

impl RemoteHost {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self::with_transport(hostname, Transport::default())
    }

    pub fn with_transport(hostname: impl Into<String>, transport: Transport) -> Self {
        Self {
            hostname: hostname.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn endpoint(&self, path: &str) -> Result<String> {
        check_hostname(&self.hostname)?;
        Ok(format!("{}:{}", self.hostname, path))
    }
}

impl Host for RemoteHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn run(&self, command: CommandVector, config: TaskConfig) -> Result<Task> {
        RemoteTask::with_transport(&self.transport, &self.hostname, command, config)
    }

    /// Runs the file-sync tool locally: `rsync -ut LOCAL HOST:REMOTE`.
    fn send_file(
        &self,
        local_path: &str,
        remote_path: Option<&str>,
        config: TaskConfig,
    ) -> Result<Task> {
        let remote = self.endpoint(destination_or(remote_path, local_path))?;
        let command = transport_command(&self.transport.file_sync, &[local_path, &remote])?;
        Ok(SubprocessTask::new(command, config))
    }

    /// Runs the file-sync tool locally: `rsync -ut HOST:REMOTE LOCAL`.
    fn get_file(
        &self,
        remote_path: &str,
        local_path: Option<&str>,
        config: TaskConfig,
    ) -> Result<Task> {
        let remote = self.endpoint(remote_path)?;
        let local = destination_or(local_path, remote_path);
        let command = transport_command(&self.transport.file_sync, &[&remote, local])?;
        Ok(SubprocessTask::new(command, config))
    }

    /// Runs the mover on the remote side.
    fn move_file(&self, source: &str, destination: &str, config: TaskConfig) -> Result<Task> {
        let command = transport_command(&self.transport.mover, &[source, destination])?;
        self.run(command, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::task::TaskOrigin;

    #[test]
    fn send_file_defaults_remote_path() {
        let task = RemoteHost::new("h")
            .send_file("local.txt", None, TaskConfig::default())
            .unwrap();
        assert_eq!(
            task.command().as_slice(),
            ["rsync", "-ut", "local.txt", "h:local.txt"]
        );
        assert_eq!(task.origin(), &TaskOrigin::Local);
    }

    #[test]
    fn send_file_to_explicit_path() {
        let task = RemoteHost::new("h")
            .send_file("a.txt", Some("/tmp/b.txt"), TaskConfig::default())
            .unwrap();
        assert_eq!(
            task.command().as_slice(),
            ["rsync", "-ut", "a.txt", "h:/tmp/b.txt"]
        );
    }

    #[test]
    fn get_file_is_the_inverse() {
        let host = RemoteHost::new("h");
        let task = host.get_file("logs/app.log", None, TaskConfig::default()).unwrap();
        assert_eq!(
            task.command().as_slice(),
            ["rsync", "-ut", "h:logs/app.log", "logs/app.log"]
        );

        let task = host
            .get_file("logs/app.log", Some("copy.log"), TaskConfig::default())
            .unwrap();
        assert_eq!(
            task.command().as_slice(),
            ["rsync", "-ut", "h:logs/app.log", "copy.log"]
        );
    }

    #[test]
    fn run_builds_remote_task() {
        let host = RemoteHost::new("db1");
        let command = CommandVector::new(["echo", "hi"]).unwrap();
        let task = host.run(command, TaskConfig::default()).unwrap();
        assert_eq!(task.command().as_slice(), ["ssh", "db1", "echo hi"]);
    }

    #[test]
    fn move_file_runs_mv_remotely() {
        let task = RemoteHost::new("h")
            .move_file("a b", "c", TaskConfig::default())
            .unwrap();
        let args = task.command().as_slice();
        assert_eq!(&args[..2], ["ssh", "h"]);
        assert_eq!(shlex::split(&args[2]).unwrap(), ["mv", "a b", "c"]);
    }

    #[test]
    fn option_like_hostname_is_rejected() {
        let host = RemoteHost::new("-oProxyCommand=touch pwned");
        let command = CommandVector::new(["true"]).unwrap();
        assert!(matches!(
            host.run(command, TaskConfig::default()),
            Err(Error::InvalidHostname(_))
        ));
        assert!(matches!(
            host.send_file("a.txt", None, TaskConfig::default()),
            Err(Error::InvalidHostname(_))
        ));
        assert!(matches!(
            host.get_file("a.txt", None, TaskConfig::default()),
            Err(Error::InvalidHostname(_))
        ));
    }

    #[test]
    fn empty_file_sync_is_rejected() {
        let transport = Transport {
            file_sync: Vec::new(),
            ..Transport::default()
        };
        let host = RemoteHost::with_transport("h", transport);
        assert!(matches!(
            host.send_file("a.txt", None, TaskConfig::default()),
            Err(Error::EmptyCommand)
        ));
    }

    #[test]
    fn host_hands_out_independent_tasks() {
        let host = RemoteHost::new("h");
        let first = host.run(CommandVector::new(["true"]).unwrap(), TaskConfig::default());
        let second = host.run(CommandVector::new(["true"]).unwrap(), TaskConfig::default());
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(host.hostname(), "h");
    }
}
