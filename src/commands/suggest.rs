use clap::Args;
use serde::Serialize;

use super::{runtime, OutputFormat};
use crate::config::Config;
use fitscan_core::{
    GeminiClient, NutritionDelta, NutritionGoals, NutritionLedger, ProgressSnapshot, Suggestion,
    SuggestionOutcome, SuggestionRefresher, SuggestionSet,
};

#[derive(Args)]
pub struct SuggestCommand {
    /// Calories consumed so far today
    #[arg(long, default_value_t = 0.0)]
    pub calories: f64,

    /// Protein consumed (g)
    #[arg(long, default_value_t = 0.0)]
    pub protein: f64,

    /// Carbohydrates consumed (g)
    #[arg(long, default_value_t = 0.0)]
    pub carbs: f64,

    /// Fats consumed (g)
    #[arg(long, default_value_t = 0.0)]
    pub fats: f64,

    /// Add the suggested meal to the totals and show the resulting progress
    #[arg(long)]
    pub accept: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// What a suggest run produced, in both output formats.
#[derive(Debug, Serialize)]
struct SuggestReport {
    progress: ProgressSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<SuggestionSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unavailable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accepted: Option<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_after: Option<ProgressSnapshot>,
}

impl SuggestCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let refresher = SuggestionRefresher::new(GeminiClient::new(
            config.generative.gemini_config()?,
        ));
        let goals = config.goals.value;

        let ledger = NutritionLedger::new();
        ledger.add_nutrition(NutritionDelta::new(
            self.calories,
            self.protein,
            self.carbs,
            self.fats,
        ));

        let outcome = runtime()?.block_on(refresher.refresh(&ledger.progress(&goals)));
        let report = build_report(outcome, &ledger, &goals, self.accept);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_report(&report),
        }
        Ok(())
    }
}

/// Applies the accepted meal, if any, and captures progress before and after.
fn build_report(
    outcome: SuggestionOutcome,
    ledger: &NutritionLedger,
    goals: &NutritionGoals,
    accept: bool,
) -> SuggestReport {
    let mut report = SuggestReport {
        progress: ledger.progress(goals),
        suggestions: None,
        unavailable: None,
        accepted: None,
        progress_after: None,
    };

    match outcome {
        SuggestionOutcome::Ready(set) => {
            if accept {
                if let Some(meal) = set.meal() {
                    ledger.add_nutrition(meal.delta());
                    report.accepted = Some(meal.clone());
                    report.progress_after = Some(ledger.progress(goals));
                }
            }
            report.suggestions = Some(set);
        }
        // Suggestions are best-effort; report and carry on
        SuggestionOutcome::Unavailable(reason) => report.unavailable = Some(reason),
    }
    report
}

fn print_report(report: &SuggestReport) {
    print!("{}", report.progress);
    println!();

    if let Some(reason) = &report.unavailable {
        println!("Suggestions unavailable: {}", reason);
        return;
    }
    if let Some(set) = &report.suggestions {
        println!("Suggestions");
        print!("{}", set);
    }
    if let (Some(meal), Some(after)) = (&report.accepted, &report.progress_after) {
        println!();
        println!("After {}:", meal.name);
        print!("{}", after);
    }
}
