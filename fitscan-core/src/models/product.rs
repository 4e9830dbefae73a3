use serde::{Deserialize, Serialize};
use std::fmt;

use super::nutrition::NutritionDelta;

/// Name used when the product database omits one.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

/// A scanned or suggested food item.
///
/// All numeric fields are finite and non-negative; constructors clamp anything
/// else to zero so a partial upstream record never leaks `NaN` into totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            UNKNOWN_PRODUCT_NAME.to_string()
        } else {
            name.trim().to_string()
        };

        Self {
            name,
            calories: 0.0,
            protein: 0.0,
            carbohydrates: 0.0,
            fat: 0.0,
        }
    }

    /// Builds a product from optional upstream fields.
    pub fn from_parts(
        name: Option<String>,
        calories: Option<f64>,
        protein: Option<f64>,
        carbohydrates: Option<f64>,
        fat: Option<f64>,
    ) -> Self {
        Self::new(name.unwrap_or_default())
            .with_calories(calories.unwrap_or_default())
            .with_protein(protein.unwrap_or_default())
            .with_carbohydrates(carbohydrates.unwrap_or_default())
            .with_fat(fat.unwrap_or_default())
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories = non_negative(calories);
        self
    }

    pub fn with_protein(mut self, grams: f64) -> Self {
        self.protein = non_negative(grams);
        self
    }

    pub fn with_carbohydrates(mut self, grams: f64) -> Self {
        self.carbohydrates = non_negative(grams);
        self
    }

    pub fn with_fat(mut self, grams: f64) -> Self {
        self.fat = non_negative(grams);
        self
    }

    /// The ledger delta this product contributes when eaten.
    pub fn delta(&self) -> NutritionDelta {
        NutritionDelta::new(self.calories, self.protein, self.carbohydrates, self.fat)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} kcal | P: {}g | C: {}g | F: {}g",
            self.name, self.calories, self.protein, self.carbohydrates, self.fat
        )
    }
}

/// Clamps a reading to a finite, non-negative value.
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
