use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::quiz::QuizDocument;
use crate::types::SectionTexts;
use crate::Result;

/// Fields written when a quiz is generated or regenerated for a URL.
#[derive(Debug, Clone)]
pub struct NewQuizRecord {
    pub url: String,
    pub title: String,
    pub scraped_content: String,
    pub raw_html: String,
    pub section_text: SectionTexts,
    pub quiz: QuizDocument,
}

#[derive(Debug, Clone)]
pub struct QuizRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub date_generated: DateTime<Utc>,
    pub scraped_content: String,
    pub raw_html: String,
    pub section_text: SectionTexts,
    pub quiz: QuizDocument,
}

impl QuizRecord {
    /// The stored quiz with its storage id filled in.
    pub fn quiz_with_id(&self) -> QuizDocument {
        let mut quiz = self.quiz.clone();
        quiz.id = Some(self.id);
        quiz
    }

    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            url: self.url.clone(),
            title: self.title.clone(),
            date_generated: self.date_generated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub date_generated: DateTime<Utc>,
}

#[async_trait]
pub trait QuizStorage: Send + Sync {
    /// Inserts a record, or updates the existing record for the same URL in
    /// place. The returned record carries the storage-assigned id.
    async fn upsert(&self, record: NewQuizRecord) -> Result<QuizRecord>;

    async fn get(&self, id: i64) -> Result<Option<QuizRecord>>;

    async fn get_by_url(&self, url: &str) -> Result<Option<QuizRecord>>;

    /// All records, newest first
    async fn history(&self) -> Result<Vec<HistoryEntry>>;
}
