use async_trait::async_trait;
use crate::types::Extraction;
use crate::Result;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the name of the article source
    fn source(&self) -> &str;

    /// Fetches `url` and decomposes it into a source document.
    async fn extract(&self, url: &str) -> Result<Extraction>;
}
