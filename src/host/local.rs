use log::warn;

use crate::error::{Error, Result};
use crate::host::{transport_command, Host};
use crate::models::task::{CommandVector, TaskConfig};
use crate::models::transport::Transport;
use crate::task::{SubprocessTask, Task};

/// This machine. Commands run directly, without the remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHost {
    hostname: String,
    transport: Transport,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::with_transport(machine_hostname(), Transport::default())
    }

    pub fn with_transport(hostname: impl Into<String>, transport: Transport) -> Self {
        Self {
            hostname: hostname.into(),
            transport,
        }
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            operation,
            hostname: self.hostname.clone(),
        }
    }
}

/// This machine's hostname, or `localhost` if it cannot be read.
pub fn machine_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("Could not read local hostname, using 'localhost': {}", e);
            "localhost".to_string()
        }
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for LocalHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn run(&self, command: CommandVector, config: TaskConfig) -> Result<Task> {
        Ok(SubprocessTask::new(command, config))
    }

    fn send_file(&self, _: &str, _: Option<&str>, _: TaskConfig) -> Result<Task> {
        Err(self.unsupported("send_file"))
    }

    fn get_file(&self, _: &str, _: Option<&str>, _: TaskConfig) -> Result<Task> {
        Err(self.unsupported("get_file"))
    }

    fn move_file(&self, source: &str, destination: &str, config: TaskConfig) -> Result<Task> {
        let command = transport_command(&self.transport.mover, &[source, destination])?;
        Ok(SubprocessTask::new(command, config))
    }
}
