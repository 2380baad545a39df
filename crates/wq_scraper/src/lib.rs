pub mod scrapers;
pub mod manager;

pub use manager::QuizManager;
pub use scrapers::{parse_article, WikipediaScraper};

pub mod prelude {
    pub use super::manager::QuizManager;
    pub use super::scrapers::WikipediaScraper;
    pub use wq_core::{Error, ExtractorConfig, QuizDocument, Result, Scraper, SourceDocument};
}
