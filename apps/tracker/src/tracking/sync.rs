//! Tracked-job synchronizer: the in-memory collection behind the dashboard and
//! the optimistic create/update/remove protocol around it.
//!
//! Every list and mutation is stamped with a generation from one counter. A
//! response only lands if nothing newer has claimed the same state:
//! - a list response is dropped if a newer list was dispatched;
//! - an update response is dropped if a newer update of the record was dispatched;
//! - a list response never overwrites a record edited locally after the list
//!   was dispatched, never drops one created after it (even if it was edited
//!   since), and never resurrects one removed after it.
//!
//! The lock is never held across a network call.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api_client::RemoteApi;
use crate::errors::ApiError;
use crate::models::tracked_job::TrackedJobsPage;
use crate::models::{TrackedJob, TrackedJobId, TrackedJobPatch};
use crate::tracking::mutation::{MutationOutcome, MutationState};

/// Page requested from the backend. The whole collection fits in one page.
const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ListOutcome {
    Applied { total_count: u64 },
    /// A newer list was dispatched before this one resolved.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Create,
    Update,
    Remove,
}

/// A local change a list response dispatched before it must not undo.
#[derive(Debug, Clone, Copy)]
struct LocalEdit {
    generation: u64,
    kind: EditKind,
    in_flight: bool,
    /// Generation of the local create, kept across later edits of the record.
    created: Option<u64>,
}

impl LocalEdit {
    fn created_after(&self, generation: u64) -> bool {
        self.created.is_some_and(|created| created > generation)
    }
}

#[derive(Debug, Default)]
struct SyncState {
    jobs: Vec<TrackedJob>,
    error: Option<String>,
    loading: bool,
    generation: u64,
    latest_list: u64,
    edits: HashMap<TrackedJobId, LocalEdit>,
}

impl SyncState {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn position(&self, id: TrackedJobId) -> Option<usize> {
        self.jobs.iter().position(|j| j.tracked_job_id == id)
    }

    /// Records an in-flight edit of `id`, carrying over when it was created.
    fn begin_edit(&mut self, id: TrackedJobId, kind: EditKind) -> u64 {
        let generation = self.next_generation();
        let created = self.edits.get(&id).and_then(|edit| edit.created);
        self.edits.insert(
            id,
            LocalEdit {
                generation,
                kind,
                in_flight: true,
                created,
            },
        );
        generation
    }

    /// Forgets the edit made at `generation` after it failed. A record created
    /// locally stays protected as a create.
    fn abandon_edit(&mut self, id: TrackedJobId, generation: u64) {
        let Some(edit) = self.edits.get(&id).copied() else {
            return;
        };
        if edit.generation != generation {
            return;
        }
        match edit.created {
            Some(created) => {
                self.edits.insert(
                    id,
                    LocalEdit {
                        generation: created,
                        kind: EditKind::Create,
                        in_flight: false,
                        created: Some(created),
                    },
                );
            }
            None => {
                self.edits.remove(&id);
            }
        }
    }

    /// Replaces the collection with a list response dispatched at `generation`,
    /// keeping local edits made after that point.
    fn apply_list(&mut self, page: TrackedJobsPage, generation: u64) {
        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(page.tracked_jobs.len());

        // Records created after the list went out may be missing from it.
        for local in &self.jobs {
            let id = local.tracked_job_id;
            let created_since = self
                .edits
                .get(&id)
                .is_some_and(|edit| edit.created_after(generation));
            if created_since && seen.insert(id) {
                jobs.push(local.clone());
            }
        }

        for server in page.tracked_jobs {
            let id = server.tracked_job_id;
            if seen.contains(&id) {
                continue;
            }
            let newer_edit = self
                .edits
                .get(&id)
                .filter(|edit| edit.generation > generation)
                .map(|edit| edit.kind);
            match newer_edit {
                Some(EditKind::Remove) => continue,
                Some(EditKind::Update) | Some(EditKind::Create) => {
                    let local = self.jobs.iter().find(|j| j.tracked_job_id == id);
                    jobs.push(local.cloned().unwrap_or(server));
                }
                None => jobs.push(server),
            }
            seen.insert(id);
        }

        self.jobs = jobs;
        self.edits
            .retain(|_, edit| edit.in_flight || edit.generation > generation);
        for edit in self.edits.values_mut() {
            if !edit.created_after(generation) {
                edit.created = None;
            }
        }
    }
}

/// Owns the user's tracked jobs for the lifetime of the session.
pub struct TrackedJobSync {
    api: Arc<dyn RemoteApi>,
    page_limit: u32,
    state: RwLock<SyncState>,
}

impl TrackedJobSync {
    pub fn new(api: Arc<dyn RemoteApi>, page_limit: u32) -> Self {
        Self {
            api,
            page_limit,
            state: RwLock::new(SyncState::default()),
        }
    }

    /// Current collection, in display order.
    pub async fn jobs(&self) -> Vec<TrackedJob> {
        self.state.read().await.jobs.clone()
    }

    pub async fn get(&self, id: TrackedJobId) -> Option<TrackedJob> {
        let state = self.state.read().await;
        state.position(id).map(|i| state.jobs[i].clone())
    }

    /// Message of the last failed operation, cleared by the next success.
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Fetches the whole collection and replaces local state with it.
    ///
    /// On failure the collection is left as it was and the error is recorded;
    /// stale data is never reported as a successful load.
    pub async fn list(&self) -> Result<ListOutcome, ApiError> {
        let generation = {
            let mut state = self.state.write().await;
            let generation = state.next_generation();
            state.latest_list = generation;
            state.loading = true;
            generation
        };

        let result = self
            .api
            .list_tracked_jobs(FIRST_PAGE, self.page_limit)
            .await;

        let mut state = self.state.write().await;
        if state.latest_list != generation {
            match &result {
                Ok(_) => debug!("Dropping list response from generation {generation}"),
                Err(e) => debug!("Dropping list failure from generation {generation}: {e}"),
            }
            return Ok(ListOutcome::Superseded);
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let total_count = page.total_count;
                state.apply_list(page, generation);
                state.error = None;
                info!(
                    "Loaded {} tracked jobs (total_count={})",
                    state.jobs.len(),
                    total_count
                );
                Ok(ListOutcome::Applied { total_count })
            }
            Err(e) => {
                warn!("Failed to load tracked jobs: {e}");
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Submits a posting URL for analysis and prepends the resulting record.
    /// Nothing is inserted until the server answers.
    pub async fn create(&self, job_url: &str) -> Result<TrackedJob, ApiError> {
        let job_url = job_url.trim();
        if job_url.is_empty() {
            let err = ApiError::Invalid("job URL must not be empty".to_string());
            self.state.write().await.error = Some(err.user_message());
            return Err(err);
        }

        match self.api.submit_job(job_url).await {
            Ok(job) => {
                let mut state = self.state.write().await;
                let id = job.tracked_job_id;
                state.jobs.retain(|j| j.tracked_job_id != id);
                state.jobs.insert(0, job.clone());
                let generation = state.next_generation();
                state.edits.insert(
                    id,
                    LocalEdit {
                        generation,
                        kind: EditKind::Create,
                        in_flight: false,
                        created: Some(generation),
                    },
                );
                state.error = None;
                info!("Tracking job {} ({})", id, job.job.title);
                Ok(job)
            }
            Err(e) => {
                warn!("Job submission failed for {job_url}: {e}");
                self.state.write().await.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Optimistically merges `patch` into the record, then PUTs it.
    ///
    /// Success replaces the record with the server's representation. Failure
    /// resynchronizes the whole collection from the server; the pre-mutation
    /// record is only restored directly if that resync fails too.
    pub async fn update(
        &self,
        id: TrackedJobId,
        patch: TrackedJobPatch,
    ) -> Result<MutationOutcome, ApiError> {
        let (generation, patch, mut mutation) = {
            let mut state = self.state.write().await;
            let Some(index) = state.position(id) else {
                let err = ApiError::NotFound(id);
                state.error = Some(err.user_message());
                return Err(err);
            };
            let patch = patch.normalized_for(&state.jobs[index], Utc::now());
            let mutation = MutationState::begin(state.jobs[index].clone());
            state.jobs[index].apply(&patch);
            let generation = state.begin_edit(id, EditKind::Update);
            (generation, patch, mutation)
        };

        debug!("Updating tracked job {id} (generation {generation})");
        let result = self.api.update_tracked_job(id, &patch).await;

        let is_latest = |state: &SyncState| {
            state
                .edits
                .get(&id)
                .is_some_and(|edit| edit.generation == generation)
        };

        match result {
            Ok(server) => {
                let mut state = self.state.write().await;
                if !is_latest(&*state) {
                    debug!("Dropping update response for {id} from generation {generation}");
                    return Ok(mutation.supersede().unwrap_or(MutationOutcome::Superseded));
                }
                if let Some(edit) = state.edits.get_mut(&id) {
                    edit.in_flight = false;
                }
                if let Some(index) = state.position(id) {
                    state.jobs[index] = server;
                }
                state.error = None;
                Ok(mutation.confirm().unwrap_or(MutationOutcome::Confirmed))
            }
            Err(e) => {
                warn!("Update of tracked job {id} failed: {e}; resyncing");
                let snapshot = mutation.roll_back();
                self.state.write().await.abandon_edit(id, generation);

                if let Err(resync) = self.list().await {
                    warn!("Resync after failed update also failed: {resync}");
                    let mut state = self.state.write().await;
                    let newer_edit = state
                        .edits
                        .get(&id)
                        .is_some_and(|edit| edit.generation > generation);
                    if !newer_edit {
                        if let (Some(index), Some(before)) = (state.position(id), snapshot) {
                            state.jobs[index] = before;
                        }
                    }
                }

                self.state.write().await.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Optimistically removes the record, then DELETEs it. On failure the
    /// record goes back exactly where it was.
    pub async fn remove(&self, id: TrackedJobId) -> Result<MutationOutcome, ApiError> {
        let (generation, mut mutation) = {
            let mut state = self.state.write().await;
            let Some(index) = state.position(id) else {
                let err = ApiError::NotFound(id);
                state.error = Some(err.user_message());
                return Err(err);
            };
            let record = state.jobs.remove(index);
            let generation = state.begin_edit(id, EditKind::Remove);
            (generation, MutationState::begin((index, record)))
        };

        debug!("Removing tracked job {id} (generation {generation})");
        let result = self.api.remove_tracked_job(id).await;

        let mut state = self.state.write().await;
        match result {
            Ok(()) => {
                if let Some(edit) = state.edits.get_mut(&id) {
                    if edit.generation == generation {
                        edit.in_flight = false;
                    }
                }
                state.error = None;
                info!("Stopped tracking job {id}");
                Ok(mutation.confirm().unwrap_or(MutationOutcome::Confirmed))
            }
            Err(e) => {
                warn!("Removal of tracked job {id} failed: {e}; restoring");
                state.abandon_edit(id, generation);
                if let Some((index, record)) = mutation.roll_back() {
                    if state.position(id).is_none() {
                        let index = index.min(state.jobs.len());
                        state.jobs.insert(index, record);
                    }
                }
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
