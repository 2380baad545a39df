use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use async_trait::async_trait;
use serde_json::Value;
use wq_core::{Error, GenerationRequest, QuizModel, Result};

/// Replays queued responses in order. Used by tests.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel")
            .field("calls", &self.calls())
            .finish()
    }
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(self, value: Value) -> Self {
        self.queue(Ok(value));
        self
    }

    pub fn push_err(self, message: &str) -> Self {
        self.queue(Err(message.to_string()));
        self
    }

    fn queue(&self, response: std::result::Result<Value, String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QuizModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        self.prompts
            .lock()
            .map_err(|_| Error::Inference("scripted model lock poisoned".to_string()))?
            .push(request.prompt.clone());

        let next = self
            .responses
            .lock()
            .map_err(|_| Error::Inference("scripted model lock poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Error::Inference(message)),
            None => Err(Error::Inference("no scripted response left".to_string())),
        }
    }
}
