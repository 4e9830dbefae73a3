use clap::ValueEnum;

mod add;
mod config_cmd;
mod lookup;
mod scan;
mod suggest;
mod workout;

pub use add::AddCommand;
pub use config_cmd::ConfigCommand;
pub use lookup::LookupCommand;
pub use scan::ScanCommand;
pub use suggest::SuggestCommand;
pub use workout::WorkoutCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start async runtime: {}", e).into())
}
