//! Profile store: the record behind the profile page and onboarding.
//!
//! No optimistic writes and no concurrency control. A successful save or
//! resume parse replaces the held profile wholesale; the last writer wins.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api_client::RemoteApi;
use crate::errors::ApiError;
use crate::models::{Profile, ProfilePatch};

pub mod resume;

#[derive(Debug, Default)]
struct ProfileState {
    profile: Option<Profile>,
    error: Option<String>,
}

pub struct ProfileStore {
    api: Arc<dyn RemoteApi>,
    state: RwLock<ProfileState>,
}

impl ProfileStore {
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            state: RwLock::new(ProfileState::default()),
        }
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.state.read().await.profile.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// GET /api/profile
    pub async fn load(&self) -> Result<Profile, ApiError> {
        let result = self.api.fetch_profile().await;
        self.settle("load profile", result).await
    }

    /// PUT /api/profile
    pub async fn save(&self, patch: &ProfilePatch) -> Result<Profile, ApiError> {
        if patch.is_empty() {
            return self
                .settle(
                    "save profile",
                    Err(ApiError::Invalid("no profile fields to update".to_string())),
                )
                .await;
        }
        let result = self.api.update_profile(patch).await;
        self.settle("save profile", result).await
    }

    /// POST /api/onboarding/parse-resume
    pub async fn submit_resume_text(&self, resume_text: &str) -> Result<Profile, ApiError> {
        let resume_text = resume_text.trim();
        if resume_text.is_empty() {
            return self
                .settle(
                    "submit resume",
                    Err(ApiError::Invalid("resume text must not be empty".to_string())),
                )
                .await;
        }
        let result = self.api.parse_resume(resume_text).await;
        self.settle("submit resume", result).await
    }

    /// Extracts text from a `.pdf`, `.txt` or `.md` file and submits it.
    pub async fn submit_resume_file(&self, path: &Path) -> Result<Profile, ApiError> {
        match resume::read_resume_text(path).await {
            Ok(text) => self.submit_resume_text(&text).await,
            Err(e) => self.settle("submit resume", Err(e)).await,
        }
    }

    async fn settle(
        &self,
        operation: &str,
        result: Result<Profile, ApiError>,
    ) -> Result<Profile, ApiError> {
        let mut state = self.state.write().await;
        match result {
            Ok(profile) => {
                info!("{operation}: ok");
                state.profile = Some(profile.clone());
                state.error = None;
                Ok(profile)
            }
            Err(e) => {
                warn!("{operation} failed: {e}");
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
