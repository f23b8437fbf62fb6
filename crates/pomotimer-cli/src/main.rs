use clap::{Parser, Subcommand};
use pomotimer_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod intent;
mod render;

#[derive(Parser)]
#[command(name = "pomotimer", version, about = "Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive timer session reading commands from stdin
    Run(commands::run::RunArgs),
    /// Session durations and alarm sound
    Presets {
        #[command(subcommand)]
        action: commands::presets::PresetsAction,
    },
    /// List the available alarm sounds
    Sounds,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

/// Log to stderr. POMOTIMER_LOG wins over the configured level.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("POMOTIMER_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Presets { action } => commands::presets::run(action),
        Commands::Sounds => commands::presets::list_sounds(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
