use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use iberia_chronos::cli::{Cli, Commands};
use iberia_chronos::logging::{init_logging, LogTarget};
use iberia_chronos::types::config::Config;
use iberia_chronos::ChronosResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let loaded = if cli.config.exists() {
        Some(Config::load(&cli.config))
    } else {
        None
    };
    let (config, load_error) = match loaded {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) => (Config::default_config(), Some(e)),
        None => (Config::default_config(), None),
    };

    // Determine log level: CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    // The explorer owns the terminal, so its logs go to the footer
    let (log_target, log_receiver) = match cli.command {
        Commands::Explore { .. } => {
            let (sender, receiver) = mpsc::channel();
            (LogTarget::Channel(sender), Some(receiver))
        }
        _ => (LogTarget::Stderr, None),
    };
    init_logging(&log_level, &config.general.log_format, log_target);

    match load_error {
        Some(e) => tracing::warn!("Ignoring {}: {}; using defaults", cli.config.display(), e),
        None => tracing::debug!("Configuration loaded from: {}", cli.config.display()),
    }

    match run(cli, config, log_receiver).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: Cli,
    config: Config,
    log_receiver: Option<mpsc::Receiver<String>>,
) -> ChronosResult<()> {
    match cli.command {
        Commands::Explore { year } => {
            let receiver = log_receiver.unwrap_or_else(|| mpsc::channel().1);
            iberia_chronos::cli::commands::explore(&year, &config, receiver).await?;
        }
        Commands::Show { year, json } => {
            iberia_chronos::cli::commands::show(&year, json, &config).await?;
        }
        Commands::Export { year, output } => {
            iberia_chronos::cli::commands::export(&year, &output, &config).await?;
        }
        Commands::Init { path } => {
            iberia_chronos::cli::commands::init(path).await?;
        }
        Commands::Config => {
            iberia_chronos::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Doctor => {
            iberia_chronos::cli::commands::doctor(&config).await?;
        }
        Commands::Version => {
            iberia_chronos::cli::commands::version();
        }
    }

    Ok(())
}
