use std::sync::Arc;

use tracing::{info, warn};

use crate::api_client::{HttpApi, RemoteApi};
use crate::auth::{StaticToken, TokenProvider};
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::CompanyProfile;
use crate::profile::ProfileStore;
use crate::recommendations::RecommendationFeed;
use crate::tracking::TrackedJobSync;

/// Everything one signed-in session of the dashboard holds, over a single
/// shared Remote API handle.
pub struct Dashboard {
    pub api: Arc<dyn RemoteApi>,
    pub tracked_jobs: TrackedJobSync,
    pub profile: ProfileStore,
    pub recommendations: RecommendationFeed,
}

impl Dashboard {
    pub fn new(api: Arc<dyn RemoteApi>, config: &Config) -> Self {
        Self {
            tracked_jobs: TrackedJobSync::new(api.clone(), config.page_limit),
            profile: ProfileStore::new(api.clone()),
            recommendations: RecommendationFeed::new(api.clone()),
            api,
        }
    }

    /// Builds the HTTP-backed dashboard. The token comes from `config.api_token`.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let tokens: Arc<dyn TokenProvider> =
            Arc::new(StaticToken::from_option(config.api_token.clone()));
        Self::with_token_provider(config, tokens)
    }

    pub fn with_token_provider(
        config: &Config,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        let api = Arc::new(HttpApi::new(config, tokens)?);
        info!("Remote API: {}", config.api_base_url);
        Ok(Self::new(api, config))
    }

    /// GET /api/companies/{id}/profile. `Ok(None)` when the backend has none.
    pub async fn company_profile(&self, company_id: i64) -> Result<Option<CompanyProfile>, ApiError> {
        let result = self.api.company_profile(company_id).await;
        match &result {
            Ok(None) => info!("No company profile for {company_id}"),
            Err(e) => warn!("Company profile {company_id} failed: {e}"),
            Ok(Some(_)) => {}
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tracked_job::fixtures::tracked;
    use crate::models::PipelineStatus;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_stores_share_one_api() {
        let fake = Arc::new(FakeApi::default());
        fake.seed(vec![tracked(1, PipelineStatus::Saved)]);
        fake.add_company(CompanyProfile {
            company_id: 1,
            name: "Company 1".into(),
            industry: None,
            size: Some("50-200".into()),
            website: None,
            description: None,
            culture_summary: None,
            extra: Default::default(),
        });
        let dashboard = Dashboard::new(fake.clone(), &Config::new("http://unused").with_page_limit(25));

        dashboard.tracked_jobs.list().await.unwrap();
        dashboard.profile.load().await.unwrap();
        let company = dashboard.company_profile(1).await.unwrap();
        assert_eq!(company.and_then(|c| c.size).as_deref(), Some("50-200"));
        assert!(dashboard.company_profile(2).await.unwrap().is_none());

        assert_eq!(
            fake.calls(),
            vec!["list page=1 limit=25", "get profile", "company 1", "company 2"]
        );
    }

    #[tokio::test]
    async fn test_from_config_without_token_fails_per_operation() {
        let dashboard = Dashboard::from_config(&Config::new("http://127.0.0.1:9")).unwrap();
        let err = dashboard.tracked_jobs.list().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingToken));
        assert!(dashboard.tracked_jobs.error().await.is_some());
    }
}
