use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;
use wq_core::types::INTRODUCTION;
use wq_core::{
    Error, ExcludedSectionPolicy, Extraction, ExtractorConfig, Result, Scraper, SectionTextBuilder,
    SectionTexts, SourceDocument,
};
use super::utils::{clean_text, parse_article_url, selector};

const UNTITLED: &str = "Untitled";
const TITLE_SELECTOR: &str = "#firstHeading";
const CONTENT_SELECTOR: &str = "#mw-content-text";
const SUMMARY_SELECTOR: &str = "#mw-content-text .mw-parser-output > p";
const HEADLINE_SELECTOR: &str = ".mw-headline";
const NOISE_SELECTOR: &str = "table, sup, span.mw-editsection, style, script, figure, .toc";

pub struct WikipediaScraper {
    client: Client,
    config: ExtractorConfig,
}

impl WikipediaScraper {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?
            .error_for_status()
            .map_err(|e| fetch_error(url, e))?;

        response.text().await.map_err(|e| fetch_error(url, e))
    }
}

fn fetch_error(url: &Url, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Fetch(format!("Timed out fetching {}", url))
    } else if let Some(status) = e.status() {
        Error::Fetch(format!("{} returned {}", url, status))
    } else {
        Error::Fetch(format!("Failed to fetch {}: {}", url, e))
    }
}

#[async_trait]
impl Scraper for WikipediaScraper {
    fn source(&self) -> &str {
        "Wikipedia"
    }

    async fn extract(&self, url: &str) -> Result<Extraction> {
        let parsed = parse_article_url(url)?;
        let html = self.fetch(&parsed).await?;

        let config = self.config.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || parse_article(&url, &html, &config))
            .await
            .map_err(|e| Error::External(e.into()))?
    }
}

/// Decomposes a fetched article. Noise is removed once, after the summary is
/// read and before body and section text are collected.
pub fn parse_article(url: &str, html: &str, config: &ExtractorConfig) -> Result<Extraction> {
    let mut document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let summary = extract_summary(&document, config.summary_paragraphs)?;
    remove_noise(&mut document)?;

    let content = selector(CONTENT_SELECTOR)?;
    let headline = selector(HEADLINE_SELECTOR)?;
    let (body_text, sections, section_text) = match document.select(&content).next() {
        Some(content_div) => {
            let body_text = clean_text(&spaced_text(&content_div));
            let container = content_div
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| child.value().name() == "div" && has_class(child, "mw-parser-output"))
                .unwrap_or(content_div);
            let (sections, section_text) = decompose_sections(container, config, &headline);
            (body_text, sections, section_text)
        }
        None => (String::new(), Vec::new(), SectionTextBuilder::new().finish()),
    };

    Ok(Extraction {
        document: SourceDocument {
            url: url.to_string(),
            title,
            summary,
            body_text,
            sections,
            section_text,
        },
        raw_html: document.html(),
    })
}

fn extract_title(document: &Html) -> Result<String> {
    let title = selector(TITLE_SELECTOR)?;
    Ok(document
        .select(&title)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string()))
}

fn extract_summary(document: &Html, paragraphs: usize) -> Result<String> {
    let selector = selector(SUMMARY_SELECTOR)?;
    let parts: Vec<String> = document
        .select(&selector)
        .filter(|p| !inside_infobox(p))
        .map(|p| spaced_text(&p))
        .filter(|text| !text.is_empty())
        .take(paragraphs)
        .collect();
    Ok(clean_text(&parts.join(" ")))
}

fn remove_noise(document: &mut Html) -> Result<()> {
    let noise = selector(NOISE_SELECTOR)?;
    let ids: Vec<_> = document.select(&noise).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(())
}

/// Walks the container's direct children with a section cursor.
fn decompose_sections(
    container: ElementRef,
    config: &ExtractorConfig,
    headline: &Selector,
) -> (Vec<String>, SectionTexts) {
    let mut sections = Vec::new();
    let mut builder = SectionTextBuilder::new();
    let mut last_kept = INTRODUCTION.to_string();
    let mut cursor = Some(INTRODUCTION.to_string());

    for child in container.children().filter_map(ElementRef::wrap) {
        if let Some(label) = heading_label(&child, headline) {
            if config.is_excluded(&label) {
                cursor = match config.excluded_policy {
                    ExcludedSectionPolicy::Discard => None,
                    ExcludedSectionPolicy::MergeIntoPrevious => Some(last_kept.clone()),
                };
            } else {
                builder.open(&label);
                sections.push(label.clone());
                last_kept = label.clone();
                cursor = Some(label);
            }
        } else if child.value().name() == "p" {
            let text = clean_text(&spaced_text(&child));
            if let Some(key) = cursor.as_deref().filter(|_| !text.is_empty()) {
                builder.append(key, &format!("{} ", text));
            }
        }
    }

    (sections, builder.finish())
}

/// Label of a level-2/3 heading: the `.mw-headline` text of an `h2`/`h3`, or
/// the inner heading text of a `div.mw-heading` wrapper.
fn heading_label(element: &ElementRef, headline: &Selector) -> Option<String> {
    let label = match element.value().name() {
        "h2" | "h3" => element
            .select(headline)
            .next()
            .map(|el| clean_text(&el.text().collect::<String>())),
        "div" if has_class(element, "mw-heading") => element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| matches!(child.value().name(), "h2" | "h3"))
            .map(|heading| clean_text(&heading.text().collect::<String>())),
        _ => None,
    };
    label.filter(|text| !text.is_empty())
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn inside_infobox(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| has_class(&ancestor, "infobox"))
}

/// Text fragments trimmed and joined by single spaces.
fn spaced_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
