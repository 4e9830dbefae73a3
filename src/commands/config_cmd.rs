use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values (credentials masked)
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# fitscan configuration

# What happens after a scan result is dismissed: single or continuous
scan_mode: single

# Daily targets used for progress and suggestions
goals:
  calories: 2000
  protein: 100
  carbs: 250
  fats: 70

# Barcode product database (Nutritionix)
nutrition_db:
  # app_id: your-app-id
  # app_key: your-app-key
  timeout_secs: 10

# Generative text API (Gemini)
generative:
  # api_key: your-api-key
  model: gemini-2.0-flash
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                let config = config.masked();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&config)?);
                    }
                    OutputFormat::Text => print_config(&config),
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'fitscan config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nAdd your API credentials to this file or set them in the environment.");
                Ok(())
            }
        }
    }
}

fn print_config(config: &Config) {
    println!("Configuration");
    println!("=============\n");

    if let Some(path) = &config.config_file {
        println!("Config file: {}", path.display());
    } else {
        println!(
            "Config file: {} (not found)",
            Config::default_config_path().display()
        );
    }
    println!();

    println!("scan_mode: {}", config.scan_mode.value);
    println!("  source: {}", config.scan_mode.source);
    println!();

    let goals = &config.goals.value;
    println!(
        "goals: {} kcal | P: {}g | C: {}g | F: {}g",
        goals.calories, goals.protein, goals.carbs, goals.fats
    );
    println!("  source: {}", config.goals.source);
    println!();

    let db = &config.nutrition_db;
    println!("nutrition_db:");
    println!("  endpoint: {}", config.lookup_endpoint());
    println!("  app_id: {}", db.app_id.as_deref().unwrap_or("(not set)"));
    println!("  app_key: {}", db.app_key.as_deref().unwrap_or("(not set)"));
    println!("  timeout: {}s", config.lookup_timeout_secs());
    println!();

    let generative = &config.generative;
    println!("generative:");
    println!("  base_url: {}", config.generative_base_url());
    println!("  model: {}", config.generative_model());
    println!(
        "  api_key: {}",
        generative.api_key.as_deref().unwrap_or("(not set)")
    );
}
