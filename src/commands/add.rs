use clap::Args;

use super::OutputFormat;
use crate::config::Config;
use fitscan_core::{NutritionDelta, NutritionLedger};

#[derive(Args)]
pub struct AddCommand {
    /// Calories to add
    #[arg(long)]
    pub calories: f64,

    /// Protein (g); omit all macros for a calories-only quick add
    #[arg(long)]
    pub protein: Option<f64>,

    /// Carbohydrates (g)
    #[arg(long)]
    pub carbs: Option<f64>,

    /// Fats (g)
    #[arg(long)]
    pub fats: Option<f64>,

    /// Calories already consumed today
    #[arg(long, default_value_t = 0.0)]
    pub consumed: f64,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl AddCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ledger = NutritionLedger::new();
        ledger.add_calories(self.consumed);
        self.apply(&ledger);

        let progress = ledger.progress(&config.goals.value);
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&progress)?),
            OutputFormat::Text => print!("{}", progress),
        }
        Ok(())
    }

    fn apply(&self, ledger: &NutritionLedger) {
        if self.protein.is_none() && self.carbs.is_none() && self.fats.is_none() {
            ledger.add_calories(self.calories);
            return;
        }
        ledger.add_nutrition(NutritionDelta::new(
            self.calories,
            self.protein.unwrap_or(0.0),
            self.carbs.unwrap_or(0.0),
            self.fats.unwrap_or(0.0),
        ));
    }
}
