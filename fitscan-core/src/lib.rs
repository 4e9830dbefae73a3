//! FitScan Core Library
//!
//! Barcode scanning, product lookup, nutrition tracking and AI suggestions
//! shared by FitScan front ends.

pub mod ledger;
pub mod lookup;
pub mod models;
pub mod scan;
pub mod suggest;

pub use ledger::NutritionLedger;
pub use lookup::{LookupConfig, LookupError, ProductLookupClient, ProductSource};
pub use models::{
    Exercise, MacroProgress, NutritionDelta, NutritionGoals, NutritionTotals, Product,
    ProgressSnapshot, Suggestion, SuggestionSet, WorkoutProfile, WorkoutRoutine,
};
pub use scan::{
    CameraPermission, ScanCommand, ScanDriver, ScanError, ScanEvent, ScanMode, ScanNotice,
    ScanPhase, ScanSession, ScanUpdate, ScannedItem,
};
pub use suggest::{
    GeminiClient, GeminiConfig, GenerateError, PlanError, SuggestionOutcome, SuggestionRefresher,
    TextGenerator, WorkoutPlanner,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
