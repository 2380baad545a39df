use std::path::PathBuf;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use wq_core::{Error, HistoryEntry, NewQuizRecord, QuizRecord, QuizStorage, Result, SectionTexts};
use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS quizzes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        url TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        date_generated TEXT NOT NULL,
        scraped_content TEXT,
        raw_html TEXT,
        section_text_map TEXT,
        full_quiz_data TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_quizzes_title ON quizzes (title)",
];

pub struct SQLiteStorage {
    pool: SqlitePool,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SQLiteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./quizzes.db"
    }

    async fn new() -> Result<Self> {
        let db_path = PathBuf::from("quizzes.db");
        Self::new_with_path(&db_path).await
    }
}

fn storage_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Storage(format!("{}: {}", context, e))
}

fn timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| storage_error("Failed to parse date", e))
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| storage_error("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| storage_error(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool,
            db_path: db_path.clone(),
        })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }

    fn record_from_row(row: &SqliteRow) -> Result<QuizRecord> {
        let get_text = |column: &str| -> Result<String> {
            row.try_get::<Option<String>, _>(column)
                .map(Option::unwrap_or_default)
                .map_err(|e| storage_error(&format!("Failed to read column {}", column), e))
        };

        let section_text = get_text("section_text_map")?;
        let section_text: SectionTexts = if section_text.is_empty() {
            SectionTexts::default()
        } else {
            serde_json::from_str(&section_text)?
        };

        Ok(QuizRecord {
            id: row
                .try_get("id")
                .map_err(|e| storage_error("Failed to read column id", e))?,
            url: get_text("url")?,
            title: get_text("title")?,
            date_generated: parse_timestamp(&get_text("date_generated")?)?,
            scraped_content: get_text("scraped_content")?,
            raw_html: get_text("raw_html")?,
            section_text,
            quiz: serde_json::from_str(&get_text("full_quiz_data")?)?,
        })
    }
}

#[async_trait]
impl QuizStorage for SQLiteStorage {
    async fn upsert(&self, record: NewQuizRecord) -> Result<QuizRecord> {
        let section_text = serde_json::to_string(&record.section_text)?;
        let quiz = serde_json::to_string(&record.quiz)?;

        let row = sqlx::query(
            r#"
            INSERT INTO quizzes
            (url, title, date_generated, scraped_content, raw_html, section_text_map, full_quiz_data)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                scraped_content = excluded.scraped_content,
                raw_html = excluded.raw_html,
                section_text_map = excluded.section_text_map,
                full_quiz_data = excluded.full_quiz_data
            RETURNING id, date_generated
            "#,
        )
        .bind(&record.url)
        .bind(&record.title)
        .bind(timestamp(&Utc::now()))
        .bind(&record.scraped_content)
        .bind(&record.raw_html)
        .bind(section_text)
        .bind(quiz)
        // stepped to completion so the write is visible to other pooled connections
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to store quiz", e))?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Storage("Upsert returned no row".to_string()))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| storage_error("Failed to read stored id", e))?;
        let date_generated: String = row
            .try_get("date_generated")
            .map_err(|e| storage_error("Failed to read stored date", e))?;

        Ok(QuizRecord {
            id,
            url: record.url,
            title: record.title,
            date_generated: parse_timestamp(&date_generated)?,
            scraped_content: record.scraped_content,
            raw_html: record.raw_html,
            section_text: record.section_text,
            quiz: record.quiz,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<QuizRecord>> {
        let row = sqlx::query("SELECT * FROM quizzes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get quiz", e))?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<QuizRecord>> {
        let row = sqlx::query("SELECT * FROM quizzes WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get quiz by url", e))?;

        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            "SELECT id, url, title, date_generated FROM quizzes ORDER BY date_generated DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list quizzes", e))?;

        rows.iter()
            .map(|row| -> Result<HistoryEntry> {
                let date: String = row
                    .try_get("date_generated")
                    .map_err(|e| storage_error("Failed to read date", e))?;
                Ok(HistoryEntry {
                    id: row.try_get("id").map_err(|e| storage_error("Failed to read id", e))?,
                    url: row.try_get("url").map_err(|e| storage_error("Failed to read url", e))?,
                    title: row
                        .try_get("title")
                        .map_err(|e| storage_error("Failed to read title", e))?,
                    date_generated: parse_timestamp(&date)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wq_inference::decode_quiz;
    use wq_inference::test_utils::{quiz_json, source_document};

    fn record(url: &str, title: &str) -> NewQuizRecord {
        let source = source_document();
        NewQuizRecord {
            url: url.to_string(),
            title: title.to_string(),
            scraped_content: source.body_text.clone(),
            raw_html: "<div id=\"mw-content-text\"></div>".to_string(),
            section_text: source.section_text.clone(),
            quiz: decode_quiz(quiz_json(6), &source).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let storage = SQLiteStorage::new_with_path(&db_path).await.unwrap();

        let stored = storage.upsert(record("https://a.test/", "A")).await.unwrap();
        let loaded = storage.get(stored.id).await.unwrap().unwrap();

        assert_eq!(loaded.url, "https://a.test/");
        assert_eq!(loaded.quiz, stored.quiz);
        assert_eq!(loaded.section_text, stored.section_text);
        assert_eq!(
            loaded.section_text.keys().collect::<Vec<_>>(),
            vec!["Introduction", "History", "Legacy"]
        );
        assert!(storage.get(stored.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("test.db"))
            .await
            .unwrap();

        let first = storage.upsert(record("https://a.test/", "Old")).await.unwrap();
        let second = storage.upsert(record("https://a.test/", "New")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.date_generated, second.date_generated);
        let loaded = storage.get_by_url("https://a.test/").await.unwrap().unwrap();
        assert_eq!(loaded.title, "New");
        assert_eq!(storage.history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_is_visible_to_following_reads() {
        for i in 0..50 {
            let temp_dir = tempdir().unwrap();
            let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("fresh.db"))
                .await
                .unwrap();

            let url = format!("https://a.test/{}", i);
            let stored = storage.upsert(record(&url, "A")).await.unwrap();

            assert!(storage.get(stored.id).await.unwrap().is_some(), "iteration {}", i);
            assert!(storage.get_by_url(&url).await.unwrap().is_some(), "iteration {}", i);
            assert_eq!(storage.history().await.unwrap().len(), 1, "iteration {}", i);
        }
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let temp_dir = tempdir().unwrap();
        let storage = SQLiteStorage::new_with_path(&temp_dir.path().join("nested/test.db"))
            .await
            .unwrap();

        storage.upsert(record("https://a.test/", "A")).await.unwrap();
        storage.upsert(record("https://b.test/", "B")).await.unwrap();

        let history = storage.history().await.unwrap();
        assert_eq!(history.iter().map(|h| h.title.as_str()).collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(storage.get_db_path(), &temp_dir.path().join("nested/test.db"));
    }
}
