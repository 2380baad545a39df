pub mod decode;
pub mod models;
pub mod prompt;
pub mod synthesis;
pub mod test_utils;

pub use decode::decode_quiz;
pub use models::{create_model, ModelBackend, ModelConfig};
pub use synthesis::QuizSynthesizer;

pub mod prelude {
    pub use super::models::create_model;
    pub use super::{ModelBackend, ModelConfig, QuizSynthesizer};
    pub use wq_core::{QuizDocument, Result, SourceDocument, Error};
}
