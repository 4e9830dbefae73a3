//! Nutrition values flowing into and out of the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

use super::product::non_negative;

/// An additive change to the ledger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct NutritionDelta {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
}

impl NutritionDelta {
    pub fn new(calories: f64, protein: f64, carbohydrates: f64, fat: f64) -> Self {
        Self {
            calories: non_negative(calories),
            protein: non_negative(protein),
            carbohydrates: non_negative(carbohydrates),
            fat: non_negative(fat),
        }
    }

    /// Calories only, as entered by hand.
    pub fn calories_only(calories: f64) -> Self {
        Self::new(calories, 0.0, 0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.calories == 0.0 && self.protein == 0.0 && self.carbohydrates == 0.0 && self.fat == 0.0
    }
}

/// Running totals held by the ledger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct NutritionTotals {
    pub total_calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Add<NutritionDelta> for NutritionTotals {
    type Output = NutritionTotals;

    fn add(self, delta: NutritionDelta) -> NutritionTotals {
        NutritionTotals {
            total_calories: self.total_calories + delta.calories,
            protein: self.protein + delta.protein,
            carbs: self.carbs + delta.carbohydrates,
            fats: self.fats + delta.fat,
        }
    }
}

impl fmt::Display for NutritionTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal | P: {}g | C: {}g | F: {}g",
            self.total_calories, self.protein, self.carbs, self.fats
        )
    }
}

/// Daily targets the progress view is measured against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NutritionGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Default for NutritionGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 100.0,
            carbs: 250.0,
            fats: 70.0,
        }
    }
}

/// One consumed/goal pair.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MacroProgress {
    pub consumed: f64,
    pub goal: f64,
}

impl MacroProgress {
    pub fn new(consumed: f64, goal: f64) -> Self {
        Self { consumed, goal }
    }

    /// Percentage of the goal reached. A goal of zero reports 0%.
    pub fn percent(&self) -> f64 {
        if self.goal > 0.0 {
            self.consumed / self.goal * 100.0
        } else {
            0.0
        }
    }

    /// Amount left before the goal is met, never negative.
    pub fn remaining(&self) -> f64 {
        (self.goal - self.consumed).max(0.0)
    }
}

/// Read-only progress view derived from a ledger snapshot.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ProgressSnapshot {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fats: MacroProgress,
}

impl ProgressSnapshot {
    pub fn new(totals: &NutritionTotals, goals: &NutritionGoals) -> Self {
        Self {
            calories: MacroProgress::new(totals.total_calories, goals.calories),
            protein: MacroProgress::new(totals.protein, goals.protein),
            carbs: MacroProgress::new(totals.carbs, goals.carbs),
            fats: MacroProgress::new(totals.fats, goals.fats),
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Calories: {} / {} kcal ({:.1}%)",
            self.calories.consumed,
            self.calories.goal,
            self.calories.percent()
        )?;
        for (label, progress) in [
            ("Protein", &self.protein),
            ("Carbohydrates", &self.carbs),
            ("Fats", &self.fats),
        ] {
            writeln!(
                f,
                "{}: {}g / {}g ({:.1}%)",
                label,
                progress.consumed,
                progress.goal,
                progress.percent()
            )?;
        }
        Ok(())
    }
}
