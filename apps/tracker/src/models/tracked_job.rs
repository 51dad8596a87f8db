use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::status::{PipelineStatus, PostingStatus};

/// Server-assigned identifier of a tracked job. Opaque to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedJobId(pub i64);

impl fmt::Display for TrackedJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackedJobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TrackedJobId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: i64,
    pub title: String,
    pub company_name: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    pub job_url: String,
    #[serde(default)]
    pub status: PostingStatus,
}

/// Server-computed AI analysis of a posting against the user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedJob {
    pub tracked_job_id: TrackedJobId,
    pub job: Job,
    pub status: PipelineStatus,
    #[serde(default)]
    pub user_notes: Option<String>,
    #[serde(default)]
    pub is_excited: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_action_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_action_notes: Option<String>,
    #[serde(default)]
    pub ai_analysis: Option<AiAnalysis>,
}

impl TrackedJob {
    /// Merges the present fields of `patch` into this record.
    pub fn apply(&mut self, patch: &TrackedJobPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(notes) = &patch.user_notes {
            self.user_notes = Some(notes.clone());
        }
        if let Some(excited) = patch.is_excited {
            self.is_excited = excited;
        }
        if let Some(applied_at) = patch.applied_at {
            self.applied_at = applied_at;
        }
        if let Some(next_action_at) = patch.next_action_at {
            self.next_action_at = next_action_at;
        }
        if let Some(notes) = &patch.next_action_notes {
            self.next_action_notes = notes.clone();
        }
    }
}

/// Partial-field body of `PUT /api/tracked-jobs/{id}`.
///
/// Nullable fields are tri-state: `None` leaves the field out of the body,
/// `Some(None)` sends an explicit `null`, `Some(Some(v))` sends the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackedJobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PipelineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_excited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action_notes: Option<Option<String>>,
}

impl TrackedJobPatch {
    pub fn status(status: PipelineStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            user_notes: Some(notes.into()),
            ..Default::default()
        }
    }

    pub fn excited(excited: bool) -> Self {
        Self {
            is_excited: Some(excited),
            ..Default::default()
        }
    }

    pub fn next_action(at: Option<DateTime<Utc>>, notes: Option<String>) -> Self {
        Self {
            next_action_at: Some(at),
            next_action_notes: Some(notes),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Keeps `applied_at` consistent with a status transition.
    ///
    /// Moving to APPLIED stamps `now` when the record has no `applied_at`;
    /// leaving APPLIED clears it. An explicit `applied_at` in the patch wins.
    pub fn normalized_for(mut self, current: &TrackedJob, now: DateTime<Utc>) -> Self {
        if self.applied_at.is_some() {
            return self;
        }
        match self.status {
            Some(PipelineStatus::Applied) if current.applied_at.is_none() => {
                self.applied_at = Some(Some(now));
            }
            Some(next)
                if next != PipelineStatus::Applied && current.status == PipelineStatus::Applied =>
            {
                self.applied_at = Some(None);
            }
            _ => {}
        }
        self
    }
}

/// Body of `GET /api/tracked-jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedJobsPage {
    pub tracked_jobs: Vec<TrackedJob>,
    #[serde(default)]
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitJobRequest<'a> {
    pub job_url: &'a str,
}
