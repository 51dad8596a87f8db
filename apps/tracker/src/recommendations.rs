use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api_client::RemoteApi;
use crate::errors::ApiError;
use crate::models::RecommendedJob;

#[derive(Debug, Default)]
struct FeedState {
    jobs: Vec<RecommendedJob>,
    error: Option<String>,
}

/// Job recommendations computed by the backend's matcher.
pub struct RecommendationFeed {
    api: Arc<dyn RemoteApi>,
    state: RwLock<FeedState>,
}

impl RecommendationFeed {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            state: RwLock::new(FeedState::default()),
        }
    }

    pub async fn jobs(&self) -> Vec<RecommendedJob> {
        self.state.read().await.jobs.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Replaces the held recommendations. On failure the previous list stays
    /// and the error is recorded.
    pub async fn refresh(&self) -> Result<Vec<RecommendedJob>, ApiError> {
        let result = self.api.recommendations().await;
        let mut state = self.state.write().await;
        match result {
            Ok(jobs) => {
                info!("Loaded {} recommended jobs", jobs.len());
                state.jobs = jobs.clone();
                state.error = None;
                Ok(jobs)
            }
            Err(e) => {
                warn!("Failed to load recommendations: {e}");
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
