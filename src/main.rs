use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AddCommand, ConfigCommand, LookupCommand, ScanCommand, SuggestCommand, WorkoutCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "fitscan")]
#[command(version)]
#[command(about = "Scan barcodes, track nutrition and get meal ideas", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan barcodes (arguments or one per line on stdin) and total their nutrition
    Scan(ScanCommand),

    /// Look up a single barcode
    Lookup(LookupCommand),

    /// Quick-add calories (and optionally macros) and show progress
    Add(AddCommand),

    /// Suggest a meal and snack for the given intake
    Suggest(SuggestCommand),

    /// Generate a personalized workout routine
    Workout(WorkoutCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitscan=info,fitscan_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Scan(cmd)) => cmd.run(&config)?,
        Some(Commands::Lookup(cmd)) => cmd.run(&config)?,
        Some(Commands::Add(cmd)) => cmd.run(&config)?,
        Some(Commands::Suggest(cmd)) => cmd.run(&config)?,
        Some(Commands::Workout(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
