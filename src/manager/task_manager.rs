use std::collections::BTreeMap;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::host::local::machine_hostname;
use crate::host::{Host, LocalHost, RemoteHost};
use crate::models::task::{CommandVector, TaskConfig, TaskStatus};
use crate::models::transport::Transport;
use crate::task::Task;

/// Host name that always means this machine.
pub const LOCAL: &str = "local";

/// A caller-side table of tasks keyed by small numeric ids.
///
/// The manager owns the tasks it creates; hosts stay stateless factories.
pub struct TaskManager {
    transport: Transport,
    local: LocalHost,
    tasks: BTreeMap<u64, Task>,
    next_id: u64,
}

impl TaskManager {
    pub fn new(transport: Transport) -> Self {
        let local = LocalHost::with_transport(machine_hostname(), transport.clone());
        Self {
            transport,
            local,
            tasks: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// `local` or this machine's own name resolve to the local host,
    /// anything else is reached through the remote shell.
    pub fn host(&self, name: &str) -> Box<dyn Host> {
        if name == LOCAL || name == self.local.hostname() {
            Box::new(self.local.clone())
        } else {
            Box::new(RemoteHost::with_transport(name, self.transport.clone()))
        }
    }

    pub fn create_task(
        &mut self,
        host: &str,
        command: CommandVector,
        config: TaskConfig,
    ) -> Result<u64> {
        let task = self.host(host).run(command, config)?;
        Ok(self.add_task(task))
    }

    pub fn add_task(&mut self, task: Task) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        info!("Task '{}' created: {}", id, task.label());
        self.tasks.insert(id, task);
        id
    }

    pub fn start_task(&mut self, id: u64) -> Result<()> {
        self.task_mut(id)?.start()
    }

    pub fn wait_task(&mut self, id: u64) -> Result<i32> {
        self.task_mut(id)?.wait()
    }

    pub fn run_task(&mut self, id: u64) -> Result<i32> {
        self.task_mut(id)?.run()
    }

    /// Waits on every running task in id order.
    pub fn wait_running(&mut self) -> Vec<(u64, Result<i32>)> {
        self.tasks
            .iter_mut()
            .filter(|(_, task)| matches!(task.status(), TaskStatus::Running { .. }))
            .map(|(id, task)| (*id, task.wait()))
            .collect()
    }

    pub fn task_status(&self, id: u64) -> Option<TaskStatus> {
        self.tasks.get(&id).map(Task::status)
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = (u64, &Task)> {
        self.tasks.iter().map(|(id, task)| (*id, task))
    }

    /// Refreshes finished background tasks without blocking. A task that
    /// cannot be polled stays running and is logged.
    pub fn poll_all(&mut self) {
        for (id, task) in self.tasks.iter_mut() {
            if !matches!(task.status(), TaskStatus::Running { .. }) {
                continue;
            }
            if let Err(e) = task.poll() {
                warn!("Failed to poll task {}: {}", id, e);
            }
        }
    }

    fn task_mut(&mut self, id: u64) -> Result<&mut Task> {
        self.tasks.get_mut(&id).ok_or(Error::UnknownTask(id))
    }
}
