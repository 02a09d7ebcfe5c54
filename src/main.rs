use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

use cli::Cli;
use cli::commands::{CheckArgs, Commands};
use devsetup::checks::builtin_registry;
use devsetup::config::Config;
use devsetup::perf::PerformanceOptimizer;
use devsetup::runner::ValidationRun;
use devsetup::validation::ValidatorRegistry;

fn setup_logging() -> Result<bool> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("devsetup")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("devsetup.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // Permissive filter; the effective level is the global max level until
    // the config is loaded, unless RUST_LOG takes over
    let from_env = std::env::var_os("RUST_LOG").is_some();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();
    if !from_env {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(from_env)
}

/// Level from the config's `log_level`; `None` keeps the current one
fn configured_level(from_env: bool, configured: Option<&str>) -> std::result::Result<Option<LevelFilter>, String> {
    match configured {
        _ if from_env => Ok(None),
        None => Ok(None),
        Some(level) => level
            .trim()
            .parse::<LevelFilter>()
            .map(Some)
            .map_err(|_| format!("Invalid log_level {:?} in config, keeping info", level)),
    }
}

fn run_application(cli: &Cli, config: Config) -> Result<bool> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    let registry = builtin_registry().context("Failed to build validator registry")?;

    match &cli.command {
        Commands::Check(args) => handle_check_command(args, cli.verbose, config, registry),
        Commands::List => {
            handle_list_command(&registry, &config);
            Ok(true)
        }
    }
}

fn handle_check_command(args: &CheckArgs, verbose: bool, config: Config, registry: ValidatorRegistry) -> Result<bool> {
    let runtime = PerformanceOptimizer::new(&config.performance)
        .runtime_builder()
        .build()
        .context("Failed to start async runtime")?;

    let run = ValidationRun::new(config, registry, args.to_options(verbose)).context("Failed to prepare validation run")?;
    info!("Checking workspace: {}", run.workspace().display());

    let outcome = runtime.block_on(run.execute()).context("Validation run failed")?;

    let stdout = std::io::stdout();
    run.emit(&outcome, &mut stdout.lock()).context("Failed to write report")?;
    if let Some(path) = &run.config().report.output {
        eprintln!("{} {}", "Report written to".green(), path.display());
    }

    Ok(outcome.is_valid())
}

fn handle_list_command(registry: &ValidatorRegistry, config: &Config) {
    info!("Listing {} validators", registry.len());
    let ctx = devsetup::validation::ValidationContext::new(".");
    for name in registry.list_validators() {
        let enabled = config.validation.enabled.iter().any(|n| n == name);
        let marker = if enabled { "●".green() } else { "○".dimmed() };
        let description = registry
            .create_validator(name, &ctx)
            .map(|v| v.description().to_string())
            .unwrap_or_default();
        println!("{} {:<20} {}", marker, name.bold(), description);
    }
}

fn main() -> Result<ExitCode> {
    // Setup logging first so config loading diagnostics are kept
    let from_env = setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match configured_level(from_env, config.log_level.as_deref()) {
        Ok(Some(level)) => log::set_max_level(level),
        Ok(None) => {}
        Err(message) => warn!("{}", message),
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    let valid = run_application(&cli, config).context("Application failed")?;

    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_applies_without_env() {
        assert_eq!(configured_level(false, Some("debug")), Ok(Some(LevelFilter::Debug)));
        assert_eq!(configured_level(false, Some(" WARN ")), Ok(Some(LevelFilter::Warn)));
        assert_eq!(configured_level(false, None), Ok(None));
    }

    #[test]
    fn test_rust_log_wins_over_config() {
        assert_eq!(configured_level(true, Some("debug")), Ok(None));
    }

    #[test]
    fn test_invalid_config_level_is_reported() {
        assert!(configured_level(false, Some("loud")).is_err());
    }
}
