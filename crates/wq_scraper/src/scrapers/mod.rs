use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;
use url::Url;
use wq_core::{Error, Result};

pub mod wikipedia;

pub use wikipedia::{parse_article, WikipediaScraper};

lazy_static! {
    static ref CITATION: Regex = Regex::new(r"\[\d+\]").expect("citation pattern is valid");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace pattern is valid");
}

/// Common utilities for scrapers
pub mod utils {
    use super::*;

    /// Accepts only absolute `http`/`https` URLs with a host.
    pub fn parse_article_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;
        match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
            _ => Err(Error::InvalidUrl(format!(
                "{}: expected an absolute http(s) URL",
                url
            ))),
        }
    }

    /// Removes `[n]` citation markers, collapses whitespace runs and trims.
    pub fn clean_text(text: &str) -> String {
        let mut text = text.to_string();
        // removing one marker can expose another, e.g. "[1[2]]"
        while CITATION.is_match(&text) {
            text = CITATION.replace_all(&text, "").into_owned();
        }
        WHITESPACE.replace_all(&text, " ").trim().to_string()
    }

    pub fn selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::External(anyhow::anyhow!("Invalid selector {}: {:?}", css, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;

    #[test]
    fn test_parse_article_url() {
        assert!(parse_article_url("https://en.wikipedia.org/wiki/Rust").is_ok());
        assert!(parse_article_url("http://en.wikipedia.org/wiki/Rust").is_ok());
        assert!(matches!(
            parse_article_url("en.wikipedia.org/wiki/Rust"),
            Err(wq_core::Error::InvalidUrl(_))
        ));
        assert!(parse_article_url("ftp://en.wikipedia.org/wiki/Rust").is_err());
        assert!(parse_article_url("mailto:someone@example.com").is_err());
        assert!(parse_article_url("").is_err());
    }

    #[test]
    fn test_clean_text_removes_citations() {
        assert_eq!(clean_text("Paris[12] is"), "Paris is");
        assert_eq!(clean_text("  a\n\n b\t[3][4] c  "), "a b c");
        assert_eq!(clean_text("[note 1] stays"), "[note 1] stays");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let samples = [
            "Paris[12] is",
            "[1[2]] nested",
            "  spaced   out [7]  ",
            "tab\tand\nnewline[99]",
            "",
            "[[1]]",
            "no markers at all",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
