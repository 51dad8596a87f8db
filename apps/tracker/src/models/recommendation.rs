use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedJob {
    pub job_id: i64,
    pub title: String,
    pub company_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub job_url: String,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub match_reason: Option<String>,
}

/// `GET /api/jobs/recommendations` answers either `{ "jobs": [...] }` or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecommendationsResponse {
    Wrapped { jobs: Vec<RecommendedJob> },
    Bare(Vec<RecommendedJob>),
}

impl RecommendationsResponse {
    pub fn into_jobs(self) -> Vec<RecommendedJob> {
        match self {
            RecommendationsResponse::Wrapped { jobs } => jobs,
            RecommendationsResponse::Bare(jobs) => jobs,
        }
    }
}
