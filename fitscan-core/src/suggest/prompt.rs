//! Prompt text for the generative API.

use crate::models::{ProgressSnapshot, WorkoutProfile};

/// Meal/snack prompt embedding the current progress.
pub fn meal_prompt(progress: &ProgressSnapshot) -> String {
    format!(
        "Based on the following data:\n\
         Total calorie progress: {:.1}% ({} of {} kcal);\n\
         Protein: {}g/{}g;\n\
         Carbohydrates: {}g/{}g;\n\
         Fats: {}g/{}g;\n\
         Suggest one meal and one snack that fit the remaining targets.\n\
         Respond with only a JSON object in this format:\n\
         {{\"meal\": {{\"name\": \"Meal\", \"calories\": 400, \"protein\": 30, \"carbs\": 40, \"fats\": 12}}, \
         \"snack\": {{\"name\": \"Snack\", \"calories\": 150, \"protein\": 8, \"carbs\": 15, \"fats\": 5}}}}",
        progress.calories.percent(),
        progress.calories.consumed,
        progress.calories.goal,
        progress.protein.consumed,
        progress.protein.goal,
        progress.carbs.consumed,
        progress.carbs.goal,
        progress.fats.consumed,
        progress.fats.goal,
    )
}

fn answer<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "not specified".to_string())
}

/// Workout prompt built from the questionnaire.
pub fn workout_prompt(profile: &WorkoutProfile) -> String {
    format!(
        "Create a personalized workout routine for one session.\n\
         Age: {}\n\
         Gender: {}\n\
         Height (cm): {}\n\
         Weight (kg): {}\n\
         Fitness goal: {}\n\
         Experience level: {}\n\
         Workout days per week: {}\n\
         Intensity: {}\n\
         Session duration (minutes): {}\n\
         Respond with only a JSON object in this format:\n\
         {{\"workout\": {{\"routine\": [{{\"exercise\": \"Squat\", \"sets\": 3, \"reps\": 10}}]}}}}",
        answer(&profile.age),
        answer(&profile.gender),
        answer(&profile.height_cm),
        answer(&profile.weight_kg),
        answer(&profile.fitness_goal),
        answer(&profile.experience),
        answer(&profile.days_per_week),
        answer(&profile.intensity),
        answer(&profile.session_minutes),
    )
}
