//! Best-effort meal/snack suggestions driven by ledger changes.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use super::generator::TextGenerator;
use super::parser::{parse_suggestions, ParseOutcome};
use super::prompt::meal_prompt;
use crate::ledger::NutritionLedger;
use crate::models::{NutritionGoals, ProgressSnapshot, SuggestionSet};

/// Result of a refresh. Failures never escape as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    Ready(SuggestionSet),
    /// Generation or parsing failed; carries the reason for logging
    Unavailable(String),
}

impl SuggestionOutcome {
    pub fn ready(self) -> Option<SuggestionSet> {
        match self {
            SuggestionOutcome::Ready(set) => Some(set),
            SuggestionOutcome::Unavailable(_) => None,
        }
    }
}

pub struct SuggestionRefresher<G> {
    generator: Arc<G>,
}

impl<G> Clone for SuggestionRefresher<G> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
        }
    }
}

impl<G: TextGenerator> SuggestionRefresher<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Requests suggestions for `progress`.
    pub async fn refresh(&self, progress: &ProgressSnapshot) -> SuggestionOutcome {
        let prompt = meal_prompt(progress);

        let text = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Suggestions unavailable: {}", e);
                return SuggestionOutcome::Unavailable(e.to_string());
            }
        };

        match parse_suggestions(&text) {
            ParseOutcome::Parsed(set) => SuggestionOutcome::Ready(set),
            ParseOutcome::Unparseable(reason) => {
                tracing::warn!("Suggestions unavailable: {}", reason);
                SuggestionOutcome::Unavailable(reason)
            }
        }
    }

    /// Refreshes on every ledger change and publishes the newest set to `latest`.
    ///
    /// The ledger is subscribed before this returns, so changes made after the
    /// call are seen even if the returned future has not been polled yet.
    /// Refreshes run one at a time. Changes that land while a request is
    /// outstanding collapse into a single follow-up refresh against the newest
    /// totals. Unavailable results leave the previous set in place. The future
    /// completes once every receiver of `latest` is gone.
    pub fn watch(
        self,
        ledger: &NutritionLedger,
        goals: NutritionGoals,
        latest: watch::Sender<Option<SuggestionSet>>,
    ) -> impl Future<Output = ()> {
        let mut changes = ledger.subscribe();

        async move {
            loop {
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = latest.closed() => break,
                }

                let totals = *changes.borrow_and_update();
                let progress = ProgressSnapshot::new(&totals, &goals);

                if let SuggestionOutcome::Ready(set) = self.refresh(&progress).await {
                    if latest.send(Some(set)).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NutritionTotals, Suggestion};
    use crate::suggest::generator::GenerateError;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Generator that replays canned responses and records prompts.
    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String, GenerateError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, GenerateError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(GenerateError::EmptyResponse)
            } else {
                responses.remove(0)
            }
        }
    }

    const EGGS: &str = "```json\n{\"meal\":{\"name\":\"Eggs\",\"calories\":150,\"protein\":12,\"carbs\":1,\"fats\":10}}\n```";

    fn progress() -> ProgressSnapshot {
        ProgressSnapshot::new(&NutritionTotals::default(), &NutritionGoals::default())
    }

    #[tokio::test]
    async fn test_refresh_parses_fenced_response() {
        let refresher = SuggestionRefresher::new(ScriptedGenerator::new(vec![Ok(EGGS.into())]));

        let set = refresher.refresh(&progress()).await.ready().unwrap();

        assert_eq!(
            set.meal(),
            Some(&Suggestion::new("Eggs", 150.0, 12.0, 1.0, 10.0))
        );
    }

    #[tokio::test]
    async fn test_refresh_malformed_is_unavailable() {
        let refresher =
            SuggestionRefresher::new(ScriptedGenerator::new(vec![Ok("{\"meal\": ".into())]));
        assert!(matches!(
            refresher.refresh(&progress()).await,
            SuggestionOutcome::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_refresh_generator_error_is_unavailable() {
        let refresher = SuggestionRefresher::new(ScriptedGenerator::new(vec![Err(
            GenerateError::Status {
                status: 429,
                message: "quota".into(),
            },
        )]));

        match refresher.refresh(&progress()).await {
            SuggestionOutcome::Unavailable(reason) => assert!(reason.contains("429")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watch_sees_change_made_right_after_spawn() {
        let generator = ScriptedGenerator::new(vec![Ok(EGGS.into())]);
        let refresher = SuggestionRefresher::new(generator);
        let ledger = NutritionLedger::new();
        let (tx, mut rx) = watch::channel(None);

        let task = tokio::spawn(refresher.clone().watch(&ledger, NutritionGoals::default(), tx));
        // No yield: the spawned task has not been polled yet.
        ledger.add_calories(500.0);

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("watcher never refreshed")
            .unwrap();
        let latest = rx.borrow_and_update().clone();
        assert_eq!(
            latest.and_then(|s| s.meal().map(|m| m.name.clone())),
            Some("Eggs".into())
        );

        let prompts = refresher.generator.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("500 of 2000 kcal"));

        drop(rx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_watch_keeps_previous_set_when_unavailable() {
        let generator = ScriptedGenerator::new(vec![Ok(EGGS.into()), Ok("not json".into())]);
        let refresher = SuggestionRefresher::new(generator);
        let ledger = NutritionLedger::new();
        let (tx, mut rx) = watch::channel(None);

        let task = tokio::spawn(refresher.clone().watch(&ledger, NutritionGoals::default(), tx));

        ledger.add_calories(100.0);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());

        ledger.add_calories(100.0);
        while refresher.generator.prompts.lock().unwrap().len() < 2 {
            tokio::task::yield_now().await;
        }
        tokio::task::yield_now().await;

        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow().is_some());

        drop(rx);
        task.await.unwrap();
    }
}
