//! In-memory Remote API for store tests: a tiny "server" with injectable
//! failures and gates that hold a call until the test releases it.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::oneshot;

use crate::api_client::RemoteApi;
use crate::errors::ApiError;
use crate::models::tracked_job::TrackedJobsPage;
use crate::models::{
    CompanyProfile, Job, PipelineStatus, PostingStatus, Profile, ProfilePatch, RecommendedJob,
    TrackedJob, TrackedJobId, TrackedJobPatch,
};

#[derive(Default)]
struct FakeState {
    jobs: Vec<TrackedJob>,
    profile: Profile,
    companies: HashMap<i64, CompanyProfile>,
    recommendations: Vec<RecommendedJob>,
    next_id: Option<i64>,
    failures: HashMap<&'static str, VecDeque<(u16, String)>>,
    gates: HashMap<&'static str, VecDeque<oneshot::Receiver<()>>>,
    calls: Vec<String>,
    last_update_body: Option<String>,
    last_resume_text: Option<String>,
}

#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn seed(&self, jobs: Vec<TrackedJob>) {
        self.state.lock().unwrap().jobs = jobs;
    }

    pub fn server_jobs(&self) -> Vec<TrackedJob> {
        self.state.lock().unwrap().jobs.clone()
    }

    pub fn mutate_server(&self, f: impl FnOnce(&mut Vec<TrackedJob>)) {
        f(&mut self.state.lock().unwrap().jobs);
    }

    pub fn set_next_id(&self, id: i64) {
        self.state.lock().unwrap().next_id = Some(id);
    }

    pub fn set_profile(&self, profile: Profile) {
        self.state.lock().unwrap().profile = profile;
    }

    pub fn server_profile(&self) -> Profile {
        self.state.lock().unwrap().profile.clone()
    }

    pub fn add_company(&self, company: CompanyProfile) {
        self.state
            .lock()
            .unwrap()
            .companies
            .insert(company.company_id, company);
    }

    pub fn set_recommendations(&self, jobs: Vec<RecommendedJob>) {
        self.state.lock().unwrap().recommendations = jobs;
    }

    /// The next call to `op` fails with `status`; an empty message means no body.
    pub fn fail_next(&self, op: &'static str, status: u16, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(op)
            .or_default()
            .push_back((status, message.to_string()));
    }

    /// The next call to `op` blocks until the returned sender fires.
    pub fn hold(&self, op: &'static str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state
            .lock()
            .unwrap()
            .gates
            .entry(op)
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_update_body(&self) -> Option<String> {
        self.state.lock().unwrap().last_update_body.clone()
    }

    pub fn last_resume_text(&self) -> Option<String> {
        self.state.lock().unwrap().last_resume_text.clone()
    }

    /// Records the call, then waits on its gate if one is queued.
    async fn begin(&self, op: &'static str, call: String) -> Result<(), ApiError> {
        let (failure, gate) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            let failure = state.failures.get_mut(op).and_then(VecDeque::pop_front);
            let gate = state.gates.get_mut(op).and_then(VecDeque::pop_front);
            (failure, gate)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match failure {
            Some((status, message)) => {
                let body = if message.is_empty() {
                    String::new()
                } else {
                    serde_json::json!({ "error": message }).to_string()
                };
                Err(ApiError::from_status(
                    StatusCode::from_u16(status).unwrap(),
                    &body,
                ))
            }
            None => Ok(()),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"Not found"}"#)
}

#[async_trait]
impl RemoteApi for FakeApi {
    async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        self.begin("profile", "get profile".into()).await?;
        Ok(self.server_profile())
    }

    async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, ApiError> {
        self.begin("profile_update", "put profile".into()).await?;
        let mut state = self.state.lock().unwrap();
        let profile = &mut state.profile;
        if let Some(v) = &patch.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = &patch.career_goals {
            profile.career_goals = Some(v.clone());
        }
        if let Some(v) = &patch.work_style_preferences {
            profile.work_style_preferences = Some(v.clone());
        }
        if let Some(v) = &patch.preferred_work_arrangement {
            profile.preferred_work_arrangement = Some(v.clone());
        }
        if let Some(v) = patch.desired_salary_min {
            profile.desired_salary_min = Some(v);
        }
        if let Some(v) = patch.desired_salary_max {
            profile.desired_salary_max = Some(v);
        }
        if let Some(v) = &patch.salary_currency {
            profile.salary_currency = Some(v.clone());
        }
        if let Some(v) = &patch.location {
            profile.location = Some(v.clone());
        }
        if let Some(v) = patch.willing_to_relocate {
            profile.willing_to_relocate = Some(v);
        }
        Ok(profile.clone())
    }

    async fn list_tracked_jobs(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<TrackedJobsPage, ApiError> {
        // Snapshot at dispatch time, like a real server answering a slow query.
        let jobs = self.server_jobs();
        self.begin("list", format!("list page={page} limit={limit}"))
            .await?;
        Ok(TrackedJobsPage {
            total_count: jobs.len() as u64,
            tracked_jobs: jobs,
        })
    }

    async fn submit_job(&self, job_url: &str) -> Result<TrackedJob, ApiError> {
        self.begin("submit", format!("submit {job_url}")).await?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id.take().unwrap_or_else(|| {
            state
                .jobs
                .iter()
                .map(|j| j.tracked_job_id.0)
                .max()
                .unwrap_or(0)
                + 1
        });
        let job = TrackedJob {
            tracked_job_id: TrackedJobId(id),
            job: Job {
                job_id: id,
                title: "Submitted Role".into(),
                company_name: "Submitted Co".into(),
                company_id: None,
                job_url: job_url.to_string(),
                status: PostingStatus::Active,
            },
            status: PipelineStatus::Saved,
            user_notes: None,
            is_excited: false,
            created_at: Some(chrono::Utc::now()),
            applied_at: None,
            next_action_at: None,
            next_action_notes: None,
            ai_analysis: None,
        };
        state.jobs.insert(0, job.clone());
        Ok(job)
    }

    async fn update_tracked_job(
        &self,
        id: TrackedJobId,
        patch: &TrackedJobPatch,
    ) -> Result<TrackedJob, ApiError> {
        let body = serde_json::to_string(patch)?;
        self.state.lock().unwrap().last_update_body = Some(body);
        self.begin("update", format!("update {id}")).await?;
        let mut state = self.state.lock().unwrap();
        let job = state
            .jobs
            .iter_mut()
            .find(|j| j.tracked_job_id == id)
            .ok_or_else(not_found)?;
        job.apply(patch);
        Ok(job.clone())
    }

    async fn remove_tracked_job(&self, id: TrackedJobId) -> Result<(), ApiError> {
        self.begin("remove", format!("remove {id}")).await?;
        let mut state = self.state.lock().unwrap();
        let before = state.jobs.len();
        state.jobs.retain(|j| j.tracked_job_id != id);
        if state.jobs.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn company_profile(&self, company_id: i64) -> Result<Option<CompanyProfile>, ApiError> {
        self.begin("company", format!("company {company_id}"))
            .await?;
        Ok(self.state.lock().unwrap().companies.get(&company_id).cloned())
    }

    async fn recommendations(&self) -> Result<Vec<RecommendedJob>, ApiError> {
        self.begin("recommendations", "recommendations".into())
            .await?;
        Ok(self.state.lock().unwrap().recommendations.clone())
    }

    async fn parse_resume(&self, resume_text: &str) -> Result<Profile, ApiError> {
        self.begin("resume", "parse resume".into()).await?;
        let mut state = self.state.lock().unwrap();
        state.last_resume_text = Some(resume_text.to_string());
        state.profile.resume_text = Some(resume_text.to_string());
        Ok(state.profile.clone())
    }
}

/// Yields until `fake` has seen at least `n` calls. Spawned store operations
/// reach their gate only once the test task yields.
pub(crate) async fn wait_for_calls(fake: &FakeApi, n: usize) {
    for _ in 0..1000 {
        if fake.calls().len() >= n {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {n} calls, saw {:?}", fake.calls());
}
