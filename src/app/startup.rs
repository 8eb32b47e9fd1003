//! Process startup: arguments, configuration, logging, dispatch

use crate::app::cli::args::Args;
use crate::app::cli::config::Settings;
use crate::app::commands::CommandRunner;
use crate::core::error_handling::log_error_with_context;
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;

/// Run the command line and map the result to an exit code
pub async fn startup() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::resolve(&args).await {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is not configured yet
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let color = settings
        .color
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    if let Err(e) = crate::core::logging::init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        settings.log_file.as_deref(),
        color,
    ) {
        eprintln!("Error: cannot initialise logging: {}", e);
        return ExitCode::FAILURE;
    }
    log::debug!("Effective settings: {:?}", redacted(&settings));

    let result = match CommandRunner::new(settings, color) {
        Ok(runner) => runner.run(&args.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error_with_context(&e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

/// Settings with the token masked, for logging
fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    if shown.token.is_some() {
        shown.token = Some("***".to_string());
    }
    shown
}
