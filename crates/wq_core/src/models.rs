use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use crate::Result;

/// One structured-output request sent to a generative backend.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    /// JSON schema the response is expected to follow.
    pub schema: Value,
    pub temperature: f32,
}

#[async_trait]
pub trait QuizModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Runs the prompt and returns the backend's parsed JSON output.
    /// The value is untrusted and must still be decoded by the caller.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value>;
}
