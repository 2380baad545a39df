use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use wq_core::{Error, HistoryEntry, NewQuizRecord, QuizDocument, QuizStorage, Result, Scraper, ScoreReport};
use wq_inference::QuizSynthesizer;
use crate::scrapers::utils::parse_article_url;

/// Composes extraction, synthesis and persistence. Quizzes are cached per
/// normalized article URL.
pub struct QuizManager {
    storage: Arc<dyn QuizStorage>,
    scraper: Arc<dyn Scraper>,
    synthesizer: Arc<QuizSynthesizer>,
}

impl QuizManager {
    pub fn new(
        storage: Arc<dyn QuizStorage>,
        scraper: Arc<dyn Scraper>,
        synthesizer: Arc<QuizSynthesizer>,
    ) -> Self {
        Self {
            storage,
            scraper,
            synthesizer,
        }
    }

    pub fn scraper(&self) -> &Arc<dyn Scraper> {
        &self.scraper
    }

    pub async fn generate(&self, url: &str, force: bool) -> Result<QuizDocument> {
        let url = parse_article_url(url)?.to_string();

        if !force {
            if let Some(record) = self.storage.get_by_url(&url).await? {
                info!("📦 Using cached quiz {} for {}", record.id, url);
                return Ok(record.quiz_with_id());
            }
        }

        info!("📰 Extracting article from {} ({})", url, self.scraper.source());
        let extraction = self.scraper.extract(&url).await.map_err(|e| {
            error!("❌ Scrape failed for {}: {}", url, e);
            e
        })?;
        let source = extraction.document;
        if !source.has_body() {
            warn!("⚠️ No body text found at {}", url);
            return Err(Error::EmptyContent(url));
        }
        debug!(
            "📑 Extracted {} sections, {} chars of body text",
            source.sections.len(),
            source.body_text.len()
        );

        info!("🤖 Generating quiz for {} with {}", source.title, self.synthesizer.model_name());
        let mut quiz = self.synthesizer.synthesize(&source).await.map_err(|e| {
            error!("❌ Quiz generation failed for {}: {}", url, e);
            e
        })?;
        quiz.sections = source.sections.clone();

        let unanswerable = quiz.unanswerable_questions();
        if !unanswerable.is_empty() {
            warn!(
                "⚠️ Questions {:?} of {} have an answer that is not one of their options",
                unanswerable, source.title
            );
        }

        let record = self
            .storage
            .upsert(NewQuizRecord {
                url,
                title: source.title,
                scraped_content: source.body_text,
                raw_html: extraction.raw_html,
                section_text: source.section_text,
                quiz,
            })
            .await?;
        info!("✨ Stored quiz {} ({} questions)", record.id, record.quiz.quiz.len());

        Ok(record.quiz_with_id())
    }

    pub async fn get_quiz(&self, id: i64) -> Result<QuizDocument> {
        self.storage
            .get(id)
            .await?
            .map(|record| record.quiz_with_id())
            .ok_or(Error::NotFound(id))
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.storage.history().await
    }

    pub async fn submit(&self, quiz_id: i64, answers: &HashMap<usize, String>) -> Result<ScoreReport> {
        let quiz = self.get_quiz(quiz_id).await?;
        let report = quiz.score(quiz_id, answers);
        info!("🏁 Quiz {} scored {}/{}", quiz_id, report.score, report.total);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use wq_core::{Extraction, SectionTextBuilder, SourceDocument, SynthesisConfig};
    use wq_inference::models::scripted::ScriptedModel;
    use wq_inference::test_utils::{quiz_json, source_document};
    use wq_storage::MemoryStorage;

    struct FakeScraper {
        document: SourceDocument,
        calls: AtomicUsize,
    }

    impl FakeScraper {
        fn new(document: SourceDocument) -> Self {
            Self {
                document,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Scraper for FakeScraper {
        fn source(&self) -> &str {
            "Fake"
        }

        async fn extract(&self, url: &str) -> Result<Extraction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut document = self.document.clone();
            document.url = url.to_string();
            Ok(Extraction {
                document,
                raw_html: "<div id=\"mw-content-text\"></div>".to_string(),
            })
        }
    }

    struct BrokenScraper;

    #[async_trait]
    impl Scraper for BrokenScraper {
        fn source(&self) -> &str {
            "Broken"
        }

        async fn extract(&self, url: &str) -> Result<Extraction> {
            Err(Error::Fetch(format!("{} returned 503 Service Unavailable", url)))
        }
    }

    /// Log output captured from a thread-local subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
            let logs = self.clone();
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::WARN)
                .with_ansi(false)
                .with_writer(move || logs.clone())
                .finish()
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    async fn manager(scraper: Arc<FakeScraper>, model: Arc<ScriptedModel>) -> QuizManager {
        let synthesizer = QuizSynthesizer::new(
            model,
            SynthesisConfig {
                retry_delay: Duration::from_millis(1),
                ..SynthesisConfig::default()
            },
        );
        let storage = MemoryStorage::new().await.unwrap();
        QuizManager::new(Arc::new(storage), scraper, Arc::new(synthesizer))
    }

    const URL: &str = "https://en.wikipedia.org/wiki/Ada_Lovelace";

    #[tokio::test]
    async fn test_generate_then_cache_hit() {
        let scraper = Arc::new(FakeScraper::new(source_document()));
        let model = Arc::new(ScriptedModel::new().push_ok(quiz_json(6)));
        let manager = manager(scraper.clone(), model.clone()).await;

        let first = manager.generate(URL, false).await.unwrap();
        let second = manager.generate(URL, false).await.unwrap();

        assert!(first.id.is_some());
        assert_eq!(first, second);
        assert_eq!(scraper.calls(), 1);
        assert_eq!(model.calls(), 1);
        assert_eq!(first.sections, vec!["Introduction", "History", "Legacy"]);
    }

    #[tokio::test]
    async fn test_force_regenerates_with_same_id() {
        let scraper = Arc::new(FakeScraper::new(source_document()));
        let model = Arc::new(ScriptedModel::new().push_ok(quiz_json(5)).push_ok(quiz_json(8)));
        let manager = manager(scraper.clone(), model.clone()).await;

        let first = manager.generate(URL, false).await.unwrap();
        let second = manager.generate(URL, true).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quiz.len(), 8);
        assert_eq!(scraper.calls(), 2);
        assert_eq!(manager.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_scraper() {
        let scraper = Arc::new(FakeScraper::new(source_document()));
        let manager = manager(scraper.clone(), Arc::new(ScriptedModel::new())).await;

        let result = manager.generate("not a url", false).await;

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert_eq!(scraper.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected_before_synthesis() {
        let empty = SourceDocument {
            url: URL.to_string(),
            title: "Empty".to_string(),
            summary: String::new(),
            body_text: String::new(),
            sections: Vec::new(),
            section_text: SectionTextBuilder::new().finish(),
        };
        let model = Arc::new(ScriptedModel::new().push_ok(quiz_json(5)));
        let manager = manager(Arc::new(FakeScraper::new(empty)), model.clone()).await;

        let result = manager.generate(URL, false).await;

        assert!(matches!(result, Err(Error::EmptyContent(_))));
        assert_eq!(model.calls(), 0);
        assert!(manager.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_stores_nothing() {
        let model = Arc::new(ScriptedModel::new().push_err("a").push_err("b").push_err("c"));
        let manager = manager(Arc::new(FakeScraper::new(source_document())), model).await;

        let result = manager.generate(URL, false).await;

        assert!(matches!(result, Err(Error::Generation { attempts: 3, .. })));
        assert!(manager.history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_quiz_and_not_found() {
        let model = Arc::new(ScriptedModel::new().push_ok(quiz_json(5)));
        let manager = manager(Arc::new(FakeScraper::new(source_document())), model).await;

        let generated = manager.generate(URL, false).await.unwrap();
        let id = generated.id.unwrap();

        assert_eq!(manager.get_quiz(id).await.unwrap(), generated);
        assert!(matches!(manager.get_quiz(id + 1).await, Err(Error::NotFound(_))));
        assert!(matches!(manager.submit(id + 1, &HashMap::new()).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_scores_by_value() {
        let model = Arc::new(ScriptedModel::new().push_ok(quiz_json(5)));
        let manager = manager(Arc::new(FakeScraper::new(source_document())), model).await;
        let id = manager.generate(URL, false).await.unwrap().id.unwrap();

        let answers = HashMap::from([
            (0, "Answer 0".to_string()),
            (1, "Wrong A".to_string()),
            (2, "Answer 2".to_string()),
        ]);
        let report = manager.submit(id, &answers).await.unwrap();

        assert_eq!(report.quiz_id, id);
        assert_eq!(report.score, 2);
        assert_eq!(report.total, 5);
        assert!(report.results[0].correct);
        assert!(!report.results[1].correct);
        assert_eq!(report.results[3].your_answer, None);
        assert!(!report.results[3].correct);
    }

    #[tokio::test]
    async fn test_failures_are_logged_before_propagating() {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let synthesizer = QuizSynthesizer::new(
            Arc::new(ScriptedModel::new()),
            SynthesisConfig {
                retries: 1,
                ..SynthesisConfig::default()
            },
        );
        let broken = QuizManager::new(
            Arc::new(MemoryStorage::new().await.unwrap()),
            Arc::new(BrokenScraper),
            Arc::new(synthesizer),
        );
        assert!(matches!(broken.generate(URL, false).await, Err(Error::Fetch(_))));
        assert!(logs.contents().contains("Scrape failed"));

        let model = Arc::new(ScriptedModel::new().push_err("quota exceeded"));
        let manager = manager(Arc::new(FakeScraper::new(source_document())), model).await;
        let result = manager.generate(URL, false).await;
        assert!(matches!(result, Err(Error::Generation { .. })));

        assert!(logs.contents().contains("Quiz generation failed"));
    }
}
