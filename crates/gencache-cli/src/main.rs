use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr) // stdout is reserved for command output
        .init();
}

fn main() {
    let cli = Cli::parse();
    let cfg = config::CliConfig::from_env();
    init_logging(&cfg.log_level);

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}
