//! hris - terminal client for the HRIS.
//!
//! Signs in, keeps a hash-validated copy of the organization data, and
//! renders subordinate trees, team org charts, work reports, leave and
//! holidays from it.

mod app;
mod cli;
mod commands;
mod format;

use std::path::Path;
use std::process::ExitCode;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{Command, USAGE};
use hris_core::Config;

/// Log file name inside the cache directory.
const LOG_FILE: &str = "hris.log";

/// Initialize the tracing subscriber, logging to a file so command output
/// stays clean. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(log_dir);

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            tracing::warn!(error = %e, "Cannot open log file, logging to stderr");
            None
        }
    }
}

async fn execute(command: Command) -> anyhow::Result<()> {
    let mut app = App::new()?;
    commands::run(&mut app, command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(2);
        }
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let _guard = Config::default()
        .cache_dir()
        .ok()
        .and_then(|dir| init_tracing(&dir));
    info!(?command, "hris starting");

    match execute(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
