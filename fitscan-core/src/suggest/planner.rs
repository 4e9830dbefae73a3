//! Questionnaire-driven workout routines.

use std::sync::Arc;

use thiserror::Error;

use super::generator::{GenerateError, TextGenerator};
use super::parser::{parse_workout, ParseOutcome};
use super::prompt::workout_prompt;
use crate::models::{WorkoutProfile, WorkoutRoutine};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("Could not read workout routine: {0}")]
    Unparseable(String),
}

pub struct WorkoutPlanner<G> {
    generator: Arc<G>,
}

impl<G: TextGenerator> WorkoutPlanner<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Asks the generator for a single-session routine tailored to `profile`.
    pub async fn plan(&self, profile: &WorkoutProfile) -> Result<WorkoutRoutine, PlanError> {
        let text = self.generator.generate(&workout_prompt(profile)).await?;

        match parse_workout(&text) {
            ParseOutcome::Parsed(routine) => {
                tracing::info!(exercises = routine.len(), "Workout routine generated");
                Ok(routine)
            }
            ParseOutcome::Unparseable(reason) => {
                tracing::warn!("Workout routine unavailable: {}", reason);
                Err(PlanError::Unparseable(reason))
            }
        }
    }
}
