use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use async_trait::async_trait;
use wq_core::{Error, QuizStorage, Result};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn new() -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    SQLite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::SQLite),
            other => Err(Error::Storage(format!(
                "Unknown storage backend: {}. Available backends: memory, sqlite",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::SQLite => write!(f, "sqlite"),
        }
    }
}

/// Opens the requested backend. `path` is the database file for SQLite and is
/// ignored by the memory backend.
pub async fn create_storage(kind: StorageKind, path: Option<&str>) -> Result<Arc<dyn QuizStorage>> {
    match kind {
        StorageKind::Memory => {
            let storage = MemoryStorage::new()
                .await
                .map_err(|e| Error::Storage(format!("{}: {}", MemoryStorage::get_error_message(), e)))?;
            Ok(Arc::new(storage))
        }
        #[cfg(feature = "sqlite")]
        StorageKind::SQLite => {
            let storage = match path {
                Some(path) => SQLiteStorage::new_with_path(&std::path::PathBuf::from(path)).await,
                None => <SQLiteStorage as StorageBackend>::new().await,
            }
            .map_err(|e| Error::Storage(format!("{}: {}", SQLiteStorage::get_error_message(), e)))?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::SQLite => {
            let _ = path;
            Err(Error::Storage("SQLite support was not compiled in".to_string()))
        }
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, StorageKind};
}
