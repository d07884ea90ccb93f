use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use remtask::manager::LOCAL;
use remtask::TaskConfig;

#[derive(Parser, Debug)]
#[command(name = "remtask", version, about = "Run commands and move files on local or ssh hosts")]
pub struct Cli {
    /// Transport config (TOML) overriding the ssh/rsync/mv programs
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command and exit with its exit code
    Run {
        #[arg(long, default_value = LOCAL)]
        host: String,
        #[command(flatten)]
        task: TaskArgs,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Copy a local file to a remote host
    Send {
        #[arg(long)]
        host: String,
        #[command(flatten)]
        task: TaskArgs,
        local: String,
        remote: Option<String>,
    },
    /// Copy a file from a remote host
    Get {
        #[arg(long)]
        host: String,
        #[command(flatten)]
        task: TaskArgs,
        remote: String,
        local: Option<String>,
    },
    /// Move a file on a host
    Mv {
        #[arg(long, default_value = LOCAL)]
        host: String,
        #[command(flatten)]
        task: TaskArgs,
        source: String,
        destination: String,
    },
    /// Interactive shell (default)
    Shell,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskArgs {
    /// Capture output without printing it
    #[arg(short, long)]
    pub quiet: bool,

    /// Working directory for the command
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable, KEY=VALUE (repeatable)
    #[arg(long = "env", value_parser = parse_env)]
    pub env: Vec<(String, String)>,
}

impl TaskArgs {
    pub fn config(&self) -> TaskConfig {
        TaskConfig {
            quiet: self.quiet,
            working_dir: self.cwd.clone(),
            env: self.env.iter().cloned().collect(),
        }
    }
}

fn parse_env(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
