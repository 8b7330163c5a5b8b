//! `faces`: replay recorded requests through the lifecycle and check configuration.

use clap::Parser;
use faces_core::cli::{map_error, Cli, RunContext};
use faces_core::config::ConfigLoader;
use faces_core::logging::{init_logging, LoggingConfig};
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(Some(&logging_config(&cli))) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}", map_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let context = RunContext::new(cli.workspace.clone(), cli.config.clone())?;
    debug!(
        workspace = %cli.workspace.display(),
        project_stage = %context.application().project_stage(),
        "Run context ready"
    );
    context.execute(&cli.command)
}

/// Logging is off unless `--verbose`; then the file's `[logging]` table applies, with
/// command-line flags on top.
fn logging_config(cli: &Cli) -> LoggingConfig {
    if !cli.log.verbose {
        return LoggingConfig {
            level: "off".to_string(),
            ..LoggingConfig::default()
        };
    }
    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(&cli.workspace),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();
    cli.log.apply(&mut config);
    config
}
