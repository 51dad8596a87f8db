//! API client: the single point of entry for all Remote API calls.
//!
//! Stores never build requests themselves. They hold an `Arc<dyn RemoteApi>`,
//! so tests swap in a fake without touching the stores.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::TokenProvider;
use crate::config::Config;
use crate::errors::ApiError;
use crate::models::profile::ResumeTextRequest;
use crate::models::recommendation::RecommendationsResponse;
use crate::models::tracked_job::{SubmitJobRequest, TrackedJobsPage};
use crate::models::{
    CompanyProfile, Profile, ProfilePatch, RecommendedJob, TrackedJob, TrackedJobId,
    TrackedJobPatch,
};

pub mod paths;

/// Every call the dashboard makes against the backend.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_profile(&self) -> Result<Profile, ApiError>;

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, ApiError>;

    async fn list_tracked_jobs(&self, page: u32, limit: u32)
        -> Result<TrackedJobsPage, ApiError>;

    /// Extraction and AI analysis run server-side before this resolves.
    async fn submit_job(&self, job_url: &str) -> Result<TrackedJob, ApiError>;

    async fn update_tracked_job(
        &self,
        id: TrackedJobId,
        patch: &TrackedJobPatch,
    ) -> Result<TrackedJob, ApiError>;

    async fn remove_tracked_job(&self, id: TrackedJobId) -> Result<(), ApiError>;

    /// `Ok(None)` when the backend has no profile for the company (404).
    async fn company_profile(&self, company_id: i64) -> Result<Option<CompanyProfile>, ApiError>;

    async fn recommendations(&self) -> Result<Vec<RecommendedJob>, ApiError>;

    /// Returns the profile as updated by the backend's resume parser.
    async fn parse_resume(&self, resume_text: &str) -> Result<Profile, ApiError>;
}

/// `RemoteApi` over HTTP with a bearer token fetched per request.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpApi {
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.api_base_url.clone(),
            tokens,
        })
    }

    /// Starts an authenticated request. Fails before touching the network when
    /// no token is available.
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json"))
    }

    /// Sends the request and returns the raw body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!("Remote API transport failure: {e}");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            // The status alone still yields a message if the body is unreadable.
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            warn!("Remote API returned {}: {}", status, err);
            return Err(err);
        }

        response.text().await.map_err(|e| {
            warn!("Remote API body read failed: {e}");
            ApiError::Transport(e)
        })
    }

    async fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        let request = self.request(Method::GET, paths::PROFILE).await?;
        self.send_json(request).await
    }

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, ApiError> {
        let request = self.request(Method::PUT, paths::PROFILE).await?.json(patch);
        self.send_json(request).await
    }

    async fn list_tracked_jobs(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<TrackedJobsPage, ApiError> {
        let request = self
            .request(Method::GET, paths::TRACKED_JOBS)
            .await?
            .query(&[("page", page), ("limit", limit)]);
        self.send_json(request).await
    }

    async fn submit_job(&self, job_url: &str) -> Result<TrackedJob, ApiError> {
        let request = self
            .request(Method::POST, paths::SUBMIT_JOB)
            .await?
            .json(&SubmitJobRequest { job_url });
        self.send_json(request).await
    }

    async fn update_tracked_job(
        &self,
        id: TrackedJobId,
        patch: &TrackedJobPatch,
    ) -> Result<TrackedJob, ApiError> {
        let request = self
            .request(Method::PUT, &paths::tracked_job(id))
            .await?
            .json(patch);
        self.send_json(request).await
    }

    async fn remove_tracked_job(&self, id: TrackedJobId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &paths::tracked_job(id)).await?;
        self.send(request).await.map(|_| ())
    }

    async fn company_profile(&self, company_id: i64) -> Result<Option<CompanyProfile>, ApiError> {
        let request = self
            .request(Method::GET, &paths::company_profile(company_id))
            .await?;
        match self.send_json(request).await {
            Ok(profile) => Ok(Some(profile)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn recommendations(&self) -> Result<Vec<RecommendedJob>, ApiError> {
        let request = self.request(Method::GET, paths::RECOMMENDATIONS).await?;
        let response: RecommendationsResponse = self.send_json(request).await?;
        Ok(response.into_jobs())
    }

    async fn parse_resume(&self, resume_text: &str) -> Result<Profile, ApiError> {
        let request = self
            .request(Method::POST, paths::PARSE_RESUME)
            .await?
            .json(&ResumeTextRequest { resume_text });
        self.send_json(request).await
    }
}
