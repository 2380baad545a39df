use std::sync::Arc;
use wq_core::{Error, GenerationRequest, QuizDocument, QuizModel, Result, SourceDocument, SynthesisConfig};
use crate::decode::decode_quiz;
use crate::prompt::build_request;

/// Drives a `QuizModel` to a validated `QuizDocument`, retrying with a fixed delay.
#[derive(Debug, Clone)]
pub struct QuizSynthesizer {
    model: Arc<dyn QuizModel>,
    config: SynthesisConfig,
}

impl QuizSynthesizer {
    pub fn new(model: Arc<dyn QuizModel>, config: SynthesisConfig) -> Self {
        Self { model, config }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Every attempt resends the same request. Transport errors and
    /// undecodable output both consume an attempt.
    pub async fn synthesize(&self, doc: &SourceDocument) -> Result<QuizDocument> {
        let request = build_request(doc, &self.config)?;
        let attempts = self.config.retries.max(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(&request, doc).await {
                Ok(quiz) => return Ok(quiz),
                Err(_) if attempt < attempts => {
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    return Err(Error::Generation {
                        attempts: attempt,
                        last_error: e.to_string(),
                    })
                }
            }
        }
    }

    async fn attempt(&self, request: &GenerationRequest, doc: &SourceDocument) -> Result<QuizDocument> {
        let value = self.model.generate(request).await?;
        Ok(decode_quiz(value, doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scripted::ScriptedModel;
    use crate::test_utils::{quiz_json, source_document};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    fn synthesizer(model: Arc<ScriptedModel>, retries: u32) -> QuizSynthesizer {
        QuizSynthesizer::new(
            model,
            SynthesisConfig {
                retries,
                retry_delay: Duration::from_secs(2),
                ..SynthesisConfig::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_failures_then_success() {
        let model = Arc::new(
            ScriptedModel::new()
                .push_err("rate limited")
                .push_err("connection reset")
                .push_ok(quiz_json(6)),
        );
        let start = Instant::now();

        let quiz = synthesizer(model.clone(), 3)
            .synthesize(&source_document())
            .await
            .unwrap();

        assert_eq!(quiz.quiz.len(), 6);
        assert_eq!(model.calls(), 3);
        // two fixed delays between three attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_raise_generation_error() {
        let model = Arc::new(
            ScriptedModel::new()
                .push_err("boom 1")
                .push_err("boom 2")
                .push_err("boom 3")
                .push_ok(quiz_json(5)),
        );

        let result = synthesizer(model.clone(), 3).synthesize(&source_document()).await;

        match result {
            Err(Error::Generation { attempts, last_error }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("boom 3"));
            }
            other => panic!("expected a generation error, got {:?}", other),
        }
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_output_is_retried() {
        let model = Arc::new(
            ScriptedModel::new()
                .push_ok(quiz_json(3))
                .push_ok(quiz_json(5)),
        );

        let quiz = synthesizer(model.clone(), 3)
            .synthesize(&source_document())
            .await
            .unwrap();

        assert_eq!(quiz.quiz.len(), 5);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_resends_the_same_prompt() {
        let model = Arc::new(ScriptedModel::new().push_err("flaky").push_ok(quiz_json(5)));

        synthesizer(model.clone(), 2)
            .synthesize(&source_document())
            .await
            .unwrap();

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_still_makes_one_attempt() {
        let model = Arc::new(ScriptedModel::new().push_err("down"));

        let result = synthesizer(model.clone(), 0).synthesize(&source_document()).await;

        assert!(matches!(result, Err(Error::Generation { attempts: 1, .. })));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_normalization() {
        let mut response = quiz_json(7);
        response["related_topics"] = json!((0..10).map(|i| format!("Topic {}", i)).collect::<Vec<_>>());
        response["sections"] = json!(["Legacy", "Invented"]);
        let model = Arc::new(ScriptedModel::new().push_ok(response));

        let quiz = synthesizer(model, 3).synthesize(&source_document()).await.unwrap();

        assert_eq!(quiz.quiz.len(), 7);
        assert_eq!(quiz.related_topics.len(), 8);
        assert_eq!(quiz.sections, vec!["Introduction", "History", "Legacy"]);
        assert!(quiz.quiz.iter().all(|q| q.options.len() == 4));
        assert_eq!(quiz.id, None);
    }
}
