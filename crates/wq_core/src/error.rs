use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scrape failed: {0}")]
    Fetch(String),

    #[error("Could not extract article body text from {0}")]
    EmptyContent(String),

    #[error("Quiz generation failed after {attempts} attempt(s): {last_error}")]
    Generation { attempts: u32, last_error: String },

    #[error("Malformed model output: {0}")]
    Decode(#[from] DecodeError),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Quiz not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// Reasons a model response cannot be turned into a `QuizDocument`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected a JSON object at the top level, got {0}")]
    NotAnObject(&'static str),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("field `{field}` should be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("quiz must have between {min} and {max} questions, got {got}")]
    QuestionCount { min: usize, max: usize, got: usize },

    #[error("question {index} must have exactly 4 options, got {got}")]
    OptionCount { index: usize, got: usize },

    #[error("question {index} has unknown difficulty `{value}`")]
    Difficulty { index: usize, value: String },
}


