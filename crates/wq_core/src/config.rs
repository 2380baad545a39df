use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// What happens to paragraphs that follow an excluded heading such as "References".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludedSectionPolicy {
    /// Drop them until the next recognized heading.
    #[default]
    Discard,
    /// Append them to the last non-excluded section.
    MergeIntoPrevious,
}

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub summary_paragraphs: usize,
    pub excluded_sections: Vec<String>,
    pub excluded_policy: ExcludedSectionPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(20),
            summary_paragraphs: 2,
            excluded_sections: vec!["References".to_string(), "See also".to_string()],
            excluded_policy: ExcludedSectionPolicy::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn is_excluded(&self, heading: &str) -> bool {
        self.excluded_sections.iter().any(|s| s == heading)
    }
}

#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Characters of summary + body sent to the model
    pub max_chars: usize,
    pub retries: u32,
    pub retry_delay: Duration,
    pub temperature: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_chars: 18_000,
            retries: 3,
            retry_delay: Duration::from_secs(2),
            temperature: 0.2,
        }
    }
}
