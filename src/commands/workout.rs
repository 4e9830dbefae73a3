use clap::Args;

use super::{runtime, OutputFormat};
use crate::config::Config;
use fitscan_core::{GeminiClient, WorkoutPlanner, WorkoutProfile};

#[derive(Args)]
pub struct WorkoutCommand {
    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long)]
    pub gender: Option<String>,

    /// Height in centimeters
    #[arg(long)]
    pub height: Option<f64>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,

    /// e.g. "Muscle Gain", "Fat Loss", "Endurance"
    #[arg(long)]
    pub goal: Option<String>,

    /// Beginner, Intermediate or Advanced
    #[arg(long)]
    pub experience: Option<String>,

    /// Workout days per week
    #[arg(long)]
    pub days: Option<u32>,

    /// Low, Moderate or High
    #[arg(long)]
    pub intensity: Option<String>,

    /// Session duration in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl WorkoutCommand {
    fn profile(&self) -> WorkoutProfile {
        WorkoutProfile {
            age: self.age,
            gender: self.gender.clone(),
            height_cm: self.height,
            weight_kg: self.weight,
            fitness_goal: self.goal.clone(),
            experience: self.experience.clone(),
            days_per_week: self.days,
            intensity: self.intensity.clone(),
            session_minutes: self.duration,
        }
    }

    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let planner = WorkoutPlanner::new(GeminiClient::new(config.generative.gemini_config()?));
        let routine = runtime()?.block_on(planner.plan(&self.profile()))?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&routine)?),
            OutputFormat::Text => print!("{}", routine),
        }
        Ok(())
    }
}
