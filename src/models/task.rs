use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::models::message::{OutputMessage, Stream};

/// Program name followed by its arguments. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandVector(Vec<String>);

impl CommandVector {
    pub fn new<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(Error::EmptyCommand);
        }
        Ok(Self(args))
    }

    pub fn program(&self) -> &str {
        &self.0[0]
    }

    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for CommandVector {
    type Error = Error;

    fn try_from(args: Vec<String>) -> Result<Self> {
        Self::new(args)
    }
}

impl fmt::Display for CommandVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Options recognised by every task constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskConfig {
    /// Capture output without forwarding it to our own stdout/stderr.
    pub quiet: bool,
    pub working_dir: Option<PathBuf>,
    /// Added to (not replacing) the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl TaskConfig {
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Where a task's command actually executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOrigin {
    Local,
    /// `command` is the vector before it was wrapped for the remote shell.
    Remote {
        hostname: String,
        command: CommandVector,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Created,
    Running { pid: u32 },
    Completed { exit_code: i32 },
}

impl TaskStatus {
    pub fn name(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Running { .. } => "running",
            TaskStatus::Completed { .. } => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Created => write!(f, "created"),
            TaskStatus::Running { pid } => write!(f, "running (pid {})", pid),
            TaskStatus::Completed { exit_code } => write!(f, "completed (exit {})", exit_code),
        }
    }
}

/// Everything a finished task wrote, per stream and interleaved.
#[derive(Debug, Clone, Default)]
pub struct TaskOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub transcript: Vec<OutputMessage>,
}

impl TaskOutput {
    pub fn push(&mut self, message: OutputMessage) {
        match message.stream {
            Stream::Stdout => self.stdout.extend_from_slice(&message.bytes),
            Stream::Stderr => self.stderr.extend_from_slice(&message.bytes),
        }
        self.transcript.push(message);
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}
