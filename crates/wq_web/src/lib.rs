use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;
use wq_core::{Error, Result};

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let cors = cors_layer(cors_origins)?;

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .route("/generate_quiz", post(handlers::generate_quiz))
        .route("/submit_quiz", post(handlers::submit_quiz))
        .route("/history", get(handlers::history))
        .route("/quiz/:id", get(handlers::get_quiz))
        .layer(cors)
        .with_state(Arc::new(state)))
}

/// `*` (or no origins at all) allows any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim())
                .map_err(|e| Error::InvalidUrl(format!("Invalid CORS origin {}: {}", o, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

pub async fn serve(app: Router, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use super::{create_app, serve, AppState};
    pub use wq_core::{Error, Result};
}
