mod generator;
mod parser;
mod planner;
mod prompt;
mod refresher;

pub use generator::{
    GeminiClient, GeminiConfig, GenerateError, TextGenerator, DEFAULT_GEMINI_MODEL,
    GEMINI_BASE_URL,
};
pub use parser::{parse_suggestions, parse_workout, strip_code_fences, ParseOutcome};
pub use planner::{PlanError, WorkoutPlanner};
pub use prompt::{meal_prompt, workout_prompt};
pub use refresher::{SuggestionOutcome, SuggestionRefresher};
