//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::prediction::PredictionClient;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Client for the external prediction service
    pub predictor: Arc<PredictionClient>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>, predictor: PredictionClient) -> Self {
        Self {
            repository,
            predictor: Arc::new(predictor),
        }
    }
}
