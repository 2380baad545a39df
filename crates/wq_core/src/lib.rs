pub mod config;
pub mod error;
pub mod models;
pub mod quiz;
pub mod scraper;
pub mod storage;
pub mod types;

pub use config::{ExcludedSectionPolicy, ExtractorConfig, SynthesisConfig};
pub use error::{DecodeError, Error};
pub use models::{GenerationRequest, QuizModel};
pub use quiz::{Difficulty, KeyEntities, QuestionResult, QuizDocument, QuizQuestion, ScoreReport};
pub use scraper::Scraper;
pub use storage::{HistoryEntry, NewQuizRecord, QuizRecord, QuizStorage};
pub use types::{Extraction, SectionTextBuilder, SectionTexts, SourceDocument};

pub type Result<T> = std::result::Result<T, Error>;
