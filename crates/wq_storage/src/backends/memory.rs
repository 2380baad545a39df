use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use wq_core::{HistoryEntry, NewQuizRecord, QuizRecord, QuizStorage, Result};
use crate::StorageBackend;

pub struct MemoryStore {
    records: Vec<QuizRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    pub fn upsert(&mut self, record: NewQuizRecord) -> QuizRecord {
        if let Some(existing) = self.records.iter_mut().find(|r| r.url == record.url) {
            existing.title = record.title;
            existing.scraped_content = record.scraped_content;
            existing.raw_html = record.raw_html;
            existing.section_text = record.section_text;
            existing.quiz = record.quiz;
            return existing.clone();
        }

        let stored = QuizRecord {
            id: self.next_id,
            url: record.url,
            title: record.title,
            date_generated: Utc::now(),
            scraped_content: record.scraped_content,
            raw_html: record.raw_html,
            section_text: record.section_text,
            quiz: record.quiz,
        };
        self.next_id += 1;
        self.records.push(stored.clone());
        stored
    }

    pub fn get(&self, id: i64) -> Option<QuizRecord> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    pub fn get_by_url(&self, url: &str) -> Option<QuizRecord> {
        self.records.iter().find(|r| r.url == url).cloned()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self.records.iter().map(QuizRecord::history_entry).collect();
        entries.sort_by(|a, b| b.date_generated.cmp(&a.date_generated).then(b.id.cmp(&a.id)));
        entries
    }
}

pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        })
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self> where Self: Sized {
        Self::new().await
    }
}

#[async_trait]
impl QuizStorage for MemoryStorage {
    async fn upsert(&self, record: NewQuizRecord) -> Result<QuizRecord> {
        let mut store = self.store.write().await;
        Ok(store.upsert(record))
    }

    async fn get(&self, id: i64) -> Result<Option<QuizRecord>> {
        let store = self.store.read().await;
        Ok(store.get(id))
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<QuizRecord>> {
        let store = self.store.read().await;
        Ok(store.get_by_url(url))
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let store = self.store.read().await;
        Ok(store.history())
    }
}
