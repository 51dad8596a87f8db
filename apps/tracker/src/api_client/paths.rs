use crate::models::TrackedJobId;

pub const PROFILE: &str = "/api/profile";
pub const TRACKED_JOBS: &str = "/api/tracked-jobs";
pub const SUBMIT_JOB: &str = "/api/jobs/submit";
pub const RECOMMENDATIONS: &str = "/api/jobs/recommendations";
pub const PARSE_RESUME: &str = "/api/onboarding/parse-resume";

pub fn tracked_job(id: TrackedJobId) -> String {
    format!("{TRACKED_JOBS}/{id}")
}

pub fn company_profile(company_id: i64) -> String {
    format!("/api/companies/{company_id}/profile")
}
