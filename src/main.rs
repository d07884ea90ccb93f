mod app;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::args::Cli;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match app::run(cli) {
        Ok(code) => app::process_exit_code(code),
        Err(e) => {
            eprintln!("remtask: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

/// `log` records from the library reach this subscriber through its log bridge.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
