//! Binary start-up: configuration, logging, then the relay

use crate::app::cli::args::Args;
use crate::app::cli::config::{load_config, Settings};
use crate::app::error::AppError;
use crate::app::relay::run_relay;
use crate::core::logging::init_logging;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::time::Duration;

// Bound on waiting for a blocked stdin read when the runtime shuts down
const RUNTIME_SHUTDOWN: Duration = Duration::from_millis(200);

pub fn run() -> ExitCode {
    let args = Args::parse();
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::from(error.exit_code())
        }
    }
}

fn execute(args: &Args) -> Result<(), AppError> {
    let config = load_config(args.config_file.as_deref())?;
    let settings = Settings::resolve(args, config, std::io::stdout().is_terminal())?;

    colored::control::set_override(settings.relay.color);
    init_logging(
        &settings.log_level,
        settings.log_format,
        settings.log_file.as_deref(),
        settings.relay.color,
    )?;

    log::info!(
        "asyncqueue {} relaying {} subject(s): {}",
        env!("CARGO_PKG_VERSION"),
        settings.relay.subjects.len(),
        settings.relay.subjects.join(", ")
    );
    log::debug!("Resolved settings: {:?}", settings);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let relayed = runtime.block_on(run_relay(
        tokio::io::stdin(),
        tokio::io::stdout(),
        &settings.relay,
        interrupted(),
    ));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN);

    let (summary, _) = relayed?;
    log::info!(
        "Relay finished: {} published, {} delivered",
        summary.published,
        summary.total_delivered()
    );
    eprint!("{}", summary);
    Ok(())
}

async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Interrupt received, shutting down"),
        Err(error) => {
            log::warn!("Cannot listen for interrupts: {}", error);
            std::future::pending::<()>().await
        }
    }
}
