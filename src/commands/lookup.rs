use clap::Args;

use super::{runtime, OutputFormat};
use crate::config::Config;
use fitscan_core::ProductLookupClient;

#[derive(Args)]
pub struct LookupCommand {
    /// UPC/EAN barcode
    pub barcode: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl LookupCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let client = ProductLookupClient::new(config.nutrition_db.lookup_config()?);
        let product = runtime()?.block_on(client.lookup(&self.barcode))?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&product)?),
            OutputFormat::Text => println!("{}", product),
        }
        Ok(())
    }
}
