use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, warn};
use wq_core::{Error, HistoryEntry, QuizDocument, ScoreReport};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub url: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: i64,
    #[serde(default)]
    pub answers: HashMap<usize, String>,
}

/// Error response with body `{"detail": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidUrl(_) | Error::Fetch(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("💥 {}", self.0);
        } else {
            warn!("⚠️ {} ({})", self.0, status);
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateQuizRequest>,
) -> Result<Json<QuizDocument>, ApiError> {
    let quiz = state.manager.generate(&request.url, request.force).await?;
    Ok(Json(quiz))
}

pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitQuizRequest>,
) -> Result<Json<ScoreReport>, ApiError> {
    let report = state.manager.submit(request.quiz_id, &request.answers).await?;
    Ok(Json(report))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    Ok(Json(state.manager.history().await?))
}

pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<QuizDocument>, ApiError> {
    Ok(Json(state.manager.get_quiz(id).await?))
}
