pub mod args;
pub mod cli;

use anyhow::Context;
use remtask::{CommandVector, TaskManager, Transport};

use args::{Cli, Commands};

/// Executes the parsed command line and returns the exit code to report.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let transport = match &cli.config {
        Some(path) => Transport::load(path)
            .with_context(|| format!("loading transport config {}", path.display()))?,
        None => Transport::default(),
    };
    let mut manager = TaskManager::new(transport);

    let mut task = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Run {
            host,
            task,
            command,
        } => manager
            .host(&host)
            .run(CommandVector::new(command)?, task.config())?,
        Commands::Send {
            host,
            task,
            local,
            remote,
        } => manager
            .host(&host)
            .send_file(&local, remote.as_deref(), task.config())?,
        Commands::Get {
            host,
            task,
            remote,
            local,
        } => manager
            .host(&host)
            .get_file(&remote, local.as_deref(), task.config())?,
        Commands::Mv {
            host,
            task,
            source,
            destination,
        } => manager
            .host(&host)
            .move_file(&source, &destination, task.config())?,
        Commands::Shell => {
            cli::run_cli(&mut manager).context("interactive shell failed")?;
            return Ok(0);
        }
    };

    let code = task
        .run()
        .with_context(|| format!("running '{}'", task.label()))?;
    Ok(code)
}

/// Maps a task exit code onto a process exit status; `-signal` becomes
/// `128 + signal` the way shells report it.
pub fn process_exit_code(code: i32) -> i32 {
    if code < 0 {
        128 + code.saturating_neg().min(127)
    } else {
        code.min(255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_codes_follow_shell_convention() {
        assert_eq!(process_exit_code(0), 0);
        assert_eq!(process_exit_code(3), 3);
        assert_eq!(process_exit_code(-9), 137);
        assert_eq!(process_exit_code(-15), 143);
    }
}
