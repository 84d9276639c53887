mod cli;
mod commands;

use bitsight_core::Settings;
use bitsight_telemetry::Paths;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise the configured log level
fn init_tracing() {
    let level = Paths::new()
        .ok()
        .and_then(|paths| Settings::load(&paths.config_file()).ok())
        .map(|settings| settings.logging.log_level.to_ascii_lowercase())
        .unwrap_or_else(|| "info".to_string());

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect(args) => commands::collect::run(&args),
        Commands::Run => commands::run::run(),
        Commands::Endpoints => commands::endpoints::run(),
        Commands::Validate { json } => commands::validate::run(json),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_show(),
            ConfigAction::Set { section, key, value } => {
                commands::config::run_set(&section, &key, &value)
            }
        },
        Commands::Alert { action, payload } => commands::alert::run(&action, &payload),
        Commands::Version => commands::version::run(),
    }
}
