use serde::{Deserialize, Serialize};
use std::fmt;

/// Questionnaire answers used to generate a workout plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkoutProfile {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub fitness_goal: Option<String>,
    pub experience: Option<String>,
    pub days_per_week: Option<u32>,
    pub intensity: Option<String>,
    pub session_minutes: Option<u32>,
}

/// One entry of a generated routine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
}

impl Exercise {
    pub fn new(exercise: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            exercise: exercise.into(),
            sets,
            reps,
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} sets x {} reps", self.exercise, self.sets, self.reps)
    }
}

/// Ordered list of exercises.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRoutine {
    pub exercises: Vec<Exercise>,
}

impl WorkoutRoutine {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Sum of sets across the routine.
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

impl fmt::Display for WorkoutRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your Personalized Workout")?;
        writeln!(f, "{}", "=".repeat(25))?;
        for (index, exercise) in self.exercises.iter().enumerate() {
            writeln!(f, "{:>2}. {}", index + 1, exercise)?;
        }
        Ok(())
    }
}
