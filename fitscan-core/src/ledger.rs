//! Process-wide nutrition ledger.
//!
//! The ledger is a cheap, cloneable handle around a `tokio::sync::watch`
//! channel. Every mutation goes through [`NutritionLedger::add_nutrition`],
//! which holds the channel's write lock for the duration of the addition, so
//! concurrent writers (manual entry, scan results, accepted suggestions) are
//! serialized and no update is lost. Subscribers are woken after each change.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{NutritionDelta, NutritionGoals, NutritionTotals, ProgressSnapshot};

#[derive(Debug, Clone)]
pub struct NutritionLedger {
    totals: Arc<watch::Sender<NutritionTotals>>,
}

impl NutritionLedger {
    /// Creates an empty ledger. All totals start at zero.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(NutritionTotals::default());
        Self {
            totals: Arc::new(sender),
        }
    }

    /// Adds `delta` to the running totals.
    ///
    /// Zero deltas are ignored and do not wake subscribers.
    pub fn add_nutrition(&self, delta: NutritionDelta) {
        if delta.is_zero() {
            return;
        }

        self.totals.send_modify(|totals| *totals = *totals + delta);

        tracing::info!(
            calories = delta.calories,
            protein = delta.protein,
            carbohydrates = delta.carbohydrates,
            fat = delta.fat,
            "Nutrition added to ledger"
        );
    }

    /// Quick-add of calories without macro information.
    pub fn add_calories(&self, calories: f64) {
        self.add_nutrition(NutritionDelta::calories_only(calories));
    }

    /// Point-in-time copy of the totals.
    pub fn snapshot(&self) -> NutritionTotals {
        *self.totals.borrow()
    }

    pub fn progress(&self, goals: &NutritionGoals) -> ProgressSnapshot {
        ProgressSnapshot::new(&self.snapshot(), goals)
    }

    /// Receiver notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<NutritionTotals> {
        self.totals.subscribe()
    }
}

impl Default for NutritionLedger {
    fn default() -> Self {
        Self::new()
    }
}
