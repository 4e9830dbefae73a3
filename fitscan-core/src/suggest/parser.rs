//! Extracts structured data from free-text model output.
//!
//! Models wrap JSON in prose and code fences more often than not. The parser
//! strips the fences, locates the outermost object, and maps the fields it
//! knows about. Nothing here touches the network.

use serde_json::Value;

use crate::models::{Exercise, Suggestion, SuggestionSet, WorkoutRoutine};

/// Result of parsing model output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    /// The text held no usable data; carries the reason
    Unparseable(String),
}

impl<T> ParseOutcome<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            ParseOutcome::Parsed(value) => Some(value),
            ParseOutcome::Unparseable(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

/// Returns the JSON payload inside a response.
///
/// Priority:
/// 1. the body of a ```` ```json ```` (or bare ```` ``` ````) fence
/// 2. the outermost `{ ... }` span
/// 3. the trimmed text as-is
pub fn strip_code_fences(text: &str) -> &str {
    for marker in ["```json", "```JSON", "```"] {
        if let Some(start_marker) = text.find(marker) {
            let start = start_marker + marker.len();
            if let Some(end_offset) = text[start..].find("```") {
                return text[start..start + end_offset].trim();
            }
            // Unterminated fence: everything after the marker.
            return text[start..].trim();
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            return &text[start..=end];
        }
    }

    text.trim()
}

fn parse_object(text: &str) -> Result<Value, String> {
    let payload = strip_code_fences(text);
    if payload.is_empty() {
        return Err("empty response".to_string());
    }
    let value: Value = serde_json::from_str(payload).map_err(|e| format!("invalid JSON: {}", e))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("expected a JSON object".to_string())
    }
}

/// Reads a number that a model may have written as `150`, `"150"`, `"150 kcal"`
/// or `"1,200 kcal"`.
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let numeric: String = s
                .trim()
                .chars()
                .filter(|c| *c != ',')
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            numeric.parse().ok()
        }
        _ => None,
    }
}

fn suggestion_from(value: &Value) -> Option<Suggestion> {
    let name = value.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    Some(Suggestion::new(
        name,
        lenient_number(value.get("calories")).unwrap_or_default(),
        lenient_number(value.get("protein")).unwrap_or_default(),
        lenient_number(value.get("carbs").or_else(|| value.get("carbohydrates")))
            .unwrap_or_default(),
        lenient_number(value.get("fats").or_else(|| value.get("fat"))).unwrap_or_default(),
    ))
}

/// Parses a meal/snack suggestion response.
///
/// Accepts a single `meal` object, a `meals` array, and/or a `snack` object.
pub fn parse_suggestions(text: &str) -> ParseOutcome<SuggestionSet> {
    let root = match parse_object(text) {
        Ok(root) => root,
        Err(reason) => return ParseOutcome::Unparseable(reason),
    };

    let mut set = SuggestionSet::default();

    if let Some(meal) = root.get("meal").and_then(suggestion_from) {
        set.meals.push(meal);
    }
    if let Some(meals) = root.get("meals").and_then(Value::as_array) {
        set.meals.extend(meals.iter().filter_map(suggestion_from));
    }
    set.snack = root.get("snack").and_then(suggestion_from);

    if set.is_empty() {
        ParseOutcome::Unparseable("no meal or snack in response".to_string())
    } else {
        ParseOutcome::Parsed(set)
    }
}

fn exercise_from(value: &Value) -> Option<Exercise> {
    let name = value.get("exercise")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let sets = lenient_number(value.get("sets"))?;
    let reps = lenient_number(value.get("reps"))?;
    Some(Exercise::new(name, sets as u32, reps as u32))
}

/// Parses a `{"workout": {"routine": [...]}}` response, keeping entry order.
pub fn parse_workout(text: &str) -> ParseOutcome<WorkoutRoutine> {
    let root = match parse_object(text) {
        Ok(root) => root,
        Err(reason) => return ParseOutcome::Unparseable(reason),
    };

    let Some(routine) = root
        .get("workout")
        .and_then(|w| w.get("routine"))
        .and_then(Value::as_array)
    else {
        return ParseOutcome::Unparseable("missing workout.routine".to_string());
    };

    let exercises: Vec<Exercise> = routine.iter().filter_map(exercise_from).collect();
    if exercises.is_empty() {
        ParseOutcome::Unparseable("routine has no usable exercises".to_string())
    } else {
        ParseOutcome::Parsed(WorkoutRoutine::new(exercises))
    }
}
