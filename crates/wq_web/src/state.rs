use std::sync::Arc;
use wq_scraper::QuizManager;

pub struct AppState {
    pub manager: Arc<QuizManager>,
}
