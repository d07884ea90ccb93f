//! Single-use process tasks
//!
//! A [`Task`] moves through `created -> running -> completed` exactly once.
//! Local and remote tasks are the same type; a remote task only differs in
//! the command vector it was built with (see [`RemoteTask`]).

pub mod remote;
pub mod subprocess;

use std::{
    io,
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
};

use crossbeam_channel::{unbounded, Receiver};
use log::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::models::message::{OutputMessage, Stream};
use crate::models::task::{CommandVector, TaskConfig, TaskOrigin, TaskOutput, TaskStatus};
use crate::worker::spawn_pump;

pub use remote::RemoteTask;
pub use subprocess::SubprocessTask;

#[derive(Debug)]
enum TaskState {
    Created,
    Running(RunningProcess),
    Completed(Completion),
}

#[derive(Debug)]
struct RunningProcess {
    child: Child,
    /// Set once the child has been reaped; the pumps may still be draining
    /// pipes held open by its own children.
    exited: Option<ExitStatus>,
    pumps: Vec<JoinHandle<()>>,
    receiver: Receiver<OutputMessage>,
}

#[derive(Debug)]
struct Completion {
    exit_code: i32,
    output: TaskOutput,
}

impl RunningProcess {
    fn reap(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.exited {
            return Ok(status);
        }
        let status = self.child.wait()?;
        self.exited = Some(status);
        Ok(status)
    }

    fn try_reap(&mut self) -> io::Result<Option<ExitStatus>> {
        if self.exited.is_none() {
            self.exited = self.child.try_wait()?;
        }
        Ok(self.exited)
    }

    fn output_drained(&self) -> bool {
        self.pumps.iter().all(JoinHandle::is_finished)
    }

    /// Joins the pumps (they end at EOF) and collects what they captured.
    fn finish(self, status: ExitStatus) -> Completion {
        let RunningProcess { pumps, receiver, .. } = self;
        for pump in pumps {
            if pump.join().is_err() {
                warn!("Output pump panicked; captured output may be incomplete");
            }
        }
        let mut output = TaskOutput::default();
        for message in receiver.try_iter() {
            output.push(message);
        }
        Completion {
            exit_code: exit_code(status),
            output,
        }
    }

    /// Reaps the child on a background thread so an abandoned task never
    /// leaves a zombie behind. The process itself is left to finish.
    fn detach(self, label: String) {
        let RunningProcess {
            mut child,
            exited,
            pumps,
            receiver,
        } = self;
        drop(receiver);
        thread::spawn(move || {
            if exited.is_none() {
                match child.wait() {
                    Ok(status) => debug!("Detached task '{}' exited: {}", label, status),
                    Err(e) => warn!("Failed to reap detached task '{}': {}", label, e),
                }
            }
            for pump in pumps {
                let _ = pump.join();
            }
        });
    }
}

#[derive(Debug)]
pub struct Task {
    command: CommandVector,
    config: TaskConfig,
    origin: TaskOrigin,
    state: TaskState,
}

impl Task {
    pub(crate) fn new(command: CommandVector, config: TaskConfig, origin: TaskOrigin) -> Self {
        Self {
            command,
            config,
            origin,
            state: TaskState::Created,
        }
    }

    /// Spawns the child process. Output is forwarded live unless the task is quiet.
    pub fn start(&mut self) -> Result<()> {
        if !matches!(self.state, TaskState::Created) {
            return Err(invalid("start", self.status()));
        }

        let mut command = Command::new(self.command.program());
        command
            .args(self.command.args())
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        debug!("Spawning {:?}", self.command.as_slice());
        let mut child = command.spawn().map_err(|source| Error::Spawn {
            program: self.command.program().to_string(),
            source,
        })?;

        let (sender, receiver) = unbounded();
        let forward = !self.config.quiet;
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(spawn_pump(Stream::Stdout, stdout, forward, sender.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(spawn_pump(Stream::Stderr, stderr, forward, sender));
        }

        info!("Started task '{}' (pid {}).", self.label(), child.id());
        self.state = TaskState::Running(RunningProcess {
            child,
            exited: None,
            pumps,
            receiver,
        });
        Ok(())
    }

    /// Blocks until the process exits and returns its exit code. Once the
    /// task has completed this returns the same code without blocking.
    pub fn wait(&mut self) -> Result<i32> {
        match std::mem::replace(&mut self.state, TaskState::Created) {
            TaskState::Created => Err(invalid("wait", TaskStatus::Created)),
            TaskState::Completed(done) => {
                let code = done.exit_code;
                self.state = TaskState::Completed(done);
                Ok(code)
            }
            TaskState::Running(mut running) => match running.reap() {
                Ok(status) => Ok(self.complete(running, status)),
                Err(source) => {
                    error!("Failed to wait for task '{}': {}", self.label(), source);
                    self.state = TaskState::Running(running);
                    Err(self.wait_error(source))
                }
            },
        }
    }

    pub fn run(&mut self) -> Result<i32> {
        self.start()?;
        self.wait()
    }

    /// Non-blocking check: `Some(exit_code)` once the process has exited and
    /// its output pipes are closed. A child that exits while a background
    /// process of its own still holds the pipes stays running until they close.
    pub fn poll(&mut self) -> Result<Option<i32>> {
        match std::mem::replace(&mut self.state, TaskState::Created) {
            TaskState::Created => Err(invalid("poll", TaskStatus::Created)),
            TaskState::Completed(done) => {
                let code = done.exit_code;
                self.state = TaskState::Completed(done);
                Ok(Some(code))
            }
            TaskState::Running(mut running) => match running.try_reap() {
                Ok(Some(status)) if running.output_drained() => {
                    Ok(Some(self.complete(running, status)))
                }
                Ok(_) => {
                    self.state = TaskState::Running(running);
                    Ok(None)
                }
                Err(source) => {
                    self.state = TaskState::Running(running);
                    Err(self.wait_error(source))
                }
            },
        }
    }

    pub fn status(&self) -> TaskStatus {
        match &self.state {
            TaskState::Created => TaskStatus::Created,
            TaskState::Running(running) => TaskStatus::Running {
                pid: running.child.id(),
            },
            TaskState::Completed(done) => TaskStatus::Completed {
                exit_code: done.exit_code,
            },
        }
    }

    pub fn pid(&self) -> Option<u32> {
        match &self.state {
            TaskState::Running(running) => Some(running.child.id()),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> Result<i32> {
        self.completion("read the exit code of")
            .map(|done| done.exit_code)
    }

    pub fn success(&self) -> Result<bool> {
        self.exit_code().map(|code| code == 0)
    }

    pub fn output(&self) -> Result<&TaskOutput> {
        self.completion("read the output of")
            .map(|done| &done.output)
    }

    pub fn stdout(&self) -> Result<String> {
        self.output().map(TaskOutput::stdout_lossy)
    }

    pub fn stderr(&self) -> Result<String> {
        self.output().map(TaskOutput::stderr_lossy)
    }

    /// The vector actually spawned; for remote tasks this is the transport call.
    pub fn command(&self) -> &CommandVector {
        &self.command
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn origin(&self) -> &TaskOrigin {
        &self.origin
    }

    /// Human-readable name: the original command, prefixed with the host when remote.
    pub fn label(&self) -> String {
        match &self.origin {
            TaskOrigin::Local => self.command.to_string(),
            TaskOrigin::Remote { hostname, command } => format!("{}: {}", hostname, command),
        }
    }

    fn completion(&self, operation: &'static str) -> Result<&Completion> {
        match &self.state {
            TaskState::Completed(done) => Ok(done),
            _ => Err(invalid(operation, self.status())),
        }
    }

    fn complete(&mut self, running: RunningProcess, status: ExitStatus) -> i32 {
        let done = running.finish(status);
        let code = done.exit_code;
        info!("Task '{}' completed with exit code {}.", self.label(), code);
        self.state = TaskState::Completed(done);
        code
    }

    fn wait_error(&self, source: io::Error) -> Error {
        Error::Wait {
            program: self.command.program().to_string(),
            source,
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if let TaskState::Running(running) = std::mem::replace(&mut self.state, TaskState::Created) {
            debug!("Task '{}' dropped while running; detaching.", self.label());
            running.detach(self.label());
        }
    }
}

/// Starts every task in order, stopping at the first spawn failure. Tasks
/// started before the failure keep running and stay owned by the caller.
pub fn start_all(tasks: &mut [Task]) -> Result<()> {
    tasks.iter_mut().try_for_each(Task::start)
}

/// Waits on every task in order and returns their exit codes.
pub fn wait_all(tasks: &mut [Task]) -> Result<Vec<i32>> {
    tasks.iter_mut().map(Task::wait).collect()
}

fn invalid(operation: &'static str, status: TaskStatus) -> Error {
    Error::InvalidState {
        operation,
        state: status.name(),
    }
}

/// Exit code, or `-signal` for a process killed by a signal.
fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => terminating_signal(status).map_or(-1, |signal| -signal),
    }
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> Option<i32> {
    None
}
