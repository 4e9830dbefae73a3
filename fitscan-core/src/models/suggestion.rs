use serde::{Deserialize, Serialize};
use std::fmt;

use super::nutrition::NutritionDelta;
use super::product::{non_negative, Product};

/// A meal or snack recommended by the generative model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Suggestion {
    pub fn new(
        name: impl Into<String>,
        calories: f64,
        protein: f64,
        carbs: f64,
        fats: f64,
    ) -> Self {
        Self {
            name: name.into(),
            calories: non_negative(calories),
            protein: non_negative(protein),
            carbs: non_negative(carbs),
            fats: non_negative(fats),
        }
    }

    /// The ledger delta recorded when the user accepts this suggestion.
    pub fn delta(&self) -> NutritionDelta {
        NutritionDelta::new(self.calories, self.protein, self.carbs, self.fats)
    }
}

impl From<&Suggestion> for Product {
    fn from(suggestion: &Suggestion) -> Self {
        Product::new(suggestion.name.clone())
            .with_calories(suggestion.calories)
            .with_protein(suggestion.protein)
            .with_carbohydrates(suggestion.carbs)
            .with_fat(suggestion.fats)
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} kcal | P: {}g | C: {}g | F: {}g)",
            self.name, self.calories, self.protein, self.carbs, self.fats
        )
    }
}

/// Meals and snack parsed from one model response. At least one entry is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuggestionSet {
    pub meals: Vec<Suggestion>,
    pub snack: Option<Suggestion>,
}

impl SuggestionSet {
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty() && self.snack.is_none()
    }

    /// The first suggested meal, if any.
    pub fn meal(&self) -> Option<&Suggestion> {
        self.meals.first()
    }

    /// All suggestions in display order: meals first, then the snack.
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.meals.iter().chain(self.snack.iter())
    }
}

impl fmt::Display for SuggestionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for meal in &self.meals {
            writeln!(f, "Meal:  {}", meal)?;
        }
        if let Some(snack) = &self.snack {
            writeln!(f, "Snack: {}", snack)?;
        }
        Ok(())
    }
}
