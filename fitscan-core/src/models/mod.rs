mod nutrition;
mod product;
mod suggestion;
mod workout;

pub use nutrition::{
    MacroProgress, NutritionDelta, NutritionGoals, NutritionTotals, ProgressSnapshot,
};
pub use product::{Product, UNKNOWN_PRODUCT_NAME};
pub use suggestion::{Suggestion, SuggestionSet};
pub use workout::{Exercise, WorkoutProfile, WorkoutRoutine};
