use crate::models::task::{CommandVector, TaskConfig, TaskOrigin};
use crate::task::Task;

/// Tasks that run directly on this machine.
pub struct SubprocessTask;

impl SubprocessTask {
    /// The command vector is spawned exactly as given.
    pub fn new(command: CommandVector, config: TaskConfig) -> Task {
        Task::new(command, config, TaskOrigin::Local)
    }
}
