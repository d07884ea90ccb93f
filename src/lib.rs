//! Run commands and move files on this machine or on ssh-reachable hosts.
//!
//! ```no_run
//! use remtask::{CommandVector, Host, RemoteHost, TaskConfig};
//!
//! let host = RemoteHost::new("db1");
//! let mut task = host.run(CommandVector::new(["uptime"])?, TaskConfig::default())?;
//! task.start()?;
//! // ... start more tasks here ...
//! println!("uptime exited with {}", task.wait()?);
//! # Ok::<(), remtask::Error>(())
//! ```

pub mod error;
pub mod host;
pub mod manager;
pub mod models;
pub mod task;
pub mod worker;

pub use error::{Error, Result};
pub use host::{Host, LocalHost, RemoteHost};
pub use manager::TaskManager;
pub use models::message::{OutputMessage, Stream};
pub use models::task::{CommandVector, TaskConfig, TaskOrigin, TaskOutput, TaskStatus};
pub use models::transport::Transport;
pub use task::{start_all, wait_all, RemoteTask, SubprocessTask, Task};
