//! Derived views over the tracked-job collection: filter, sort, page.
//!
//! Nothing here is cached. Every call recomputes from the slice it is given.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::TrackedJob;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobFilter {
    #[default]
    All,
    ActivePipeline,
    ClosedPipeline,
    ActivePosting,
    ExpiredPosting,
}

impl JobFilter {
    pub fn matches(&self, job: &TrackedJob) -> bool {
        match self {
            JobFilter::All => true,
            JobFilter::ActivePipeline => job.status.is_active(),
            JobFilter::ClosedPipeline => job.status.is_terminal(),
            JobFilter::ActivePosting => job.job.status.is_active(),
            JobFilter::ExpiredPosting => job.job.status.is_expired(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobFilter::All => "all",
            JobFilter::ActivePipeline => "active_pipeline",
            JobFilter::ClosedPipeline => "closed_pipeline",
            JobFilter::ActivePosting => "active_posting",
            JobFilter::ExpiredPosting => "expired_posting",
        }
    }
}

impl fmt::Display for JobFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_ascii_lowercase().as_str() {
            "all" => Ok(JobFilter::All),
            "active_pipeline" | "active" => Ok(JobFilter::ActivePipeline),
            "closed_pipeline" | "closed" => Ok(JobFilter::ClosedPipeline),
            "active_posting" => Ok(JobFilter::ActivePosting),
            "expired_posting" | "expired" => Ok(JobFilter::ExpiredPosting),
            other => Err(format!("unknown filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    AppliedAt,
    NextActionAt,
    Status,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_ascii_lowercase().as_str() {
            "created_at" | "created" => Ok(SortKey::CreatedAt),
            "applied_at" | "applied" => Ok(SortKey::AppliedAt),
            "next_action_at" | "next_action" => Ok(SortKey::NextActionAt),
            "status" => Ok(SortKey::Status),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub descending: bool,
}

/// Records matching `filter`, in collection order.
pub fn filter_jobs(jobs: &[TrackedJob], filter: JobFilter) -> Vec<&TrackedJob> {
    jobs.iter().filter(|job| filter.matches(job)).collect()
}

/// Stable sort. Records with no value for a timestamp key go last in either direction.
pub fn sort_jobs(jobs: &mut [&TrackedJob], order: SortOrder) {
    jobs.sort_by(|a, b| {
        let by_key = match order.key {
            SortKey::CreatedAt => nulls_last(a.created_at, b.created_at, order.descending),
            SortKey::AppliedAt => nulls_last(a.applied_at, b.applied_at, order.descending),
            SortKey::NextActionAt => {
                nulls_last(a.next_action_at, b.next_action_at, order.descending)
            }
            SortKey::Status => a.status.cmp(&b.status),
        };
        if order.descending && order.key == SortKey::Status {
            by_key.reverse()
        } else {
            by_key
        }
    });
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `items[page * page_size .. page * page_size + page_size]`, clamped to `items.len()`.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        len.div_ceil(page_size)
    }
}

/// Filter, sort and page selection of the dashboard table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    filter: JobFilter,
    page: usize,
    page_size: usize,
    sort: Option<SortOrder>,
}

/// One rendered page of the dashboard table.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub items: Vec<&'a TrackedJob>,
    pub page: usize,
    pub page_count: usize,
    pub filtered_len: usize,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DashboardView {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: JobFilter::All,
            page: 0,
            page_size,
            sort: None,
        }
    }

    pub fn filter(&self) -> JobFilter {
        self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Changing the filter always returns to the first page; the old index
    /// may point past the end of a shorter filtered list.
    pub fn set_filter(&mut self, filter: JobFilter) {
        self.filter = filter;
        self.page = 0;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 0;
    }

    pub fn set_sort(&mut self, sort: Option<SortOrder>) {
        self.sort = sort;
    }

    pub fn render<'a>(&self, jobs: &'a [TrackedJob]) -> PageView<'a> {
        let mut filtered = filter_jobs(jobs, self.filter);
        if let Some(order) = self.sort {
            sort_jobs(&mut filtered, order);
        }
        let filtered_len = filtered.len();
        PageView {
            items: page_slice(&filtered, self.page, self.page_size).to_vec(),
            page: self.page,
            page_count: page_count(filtered_len, self.page_size),
            filtered_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::tracked_job::fixtures::tracked;
    use crate::models::{PipelineStatus, PostingStatus};

    fn collection(n: i64) -> Vec<TrackedJob> {
        (0..n)
            .map(|i| tracked(i, PipelineStatus::ALL[(i as usize) % 8]))
            .collect()
    }

    #[test]
    fn test_pages_of_twenty_five() {
        let jobs = collection(25);
        let first = page_slice(&jobs, 0, 10);
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].tracked_job_id.0, 0);
        assert_eq!(first[9].tracked_job_id.0, 9);

        let third = page_slice(&jobs, 2, 10);
        let ids: Vec<i64> = third.iter().map(|j| j.tracked_job_id.0).collect();
        assert_eq!(ids, vec![20, 21, 22, 23, 24]);

        assert!(page_slice(&jobs, 3, 10).is_empty());
        assert!(page_slice(&jobs, usize::MAX, 10).is_empty());
        assert!(page_slice(&jobs, 0, 0).is_empty());
    }

    #[test]
    fn test_page_slice_stays_within_filtered_list() {
        let jobs = collection(25);
        for filter in [
            JobFilter::All,
            JobFilter::ActivePipeline,
            JobFilter::ClosedPipeline,
            JobFilter::ActivePosting,
            JobFilter::ExpiredPosting,
        ] {
            let filtered = filter_jobs(&jobs, filter);
            for size in 1..=7 {
                for page in 0..=page_count(filtered.len(), size) {
                    let slice = page_slice(&filtered, page, size);
                    let start = (page * size).min(filtered.len());
                    assert_eq!(slice, &filtered[start..(start + slice.len())]);
                    assert!(slice.len() <= size);
                }
            }
        }
    }

    #[test]
    fn test_active_pipeline_excludes_rejected() {
        let jobs = vec![
            tracked(1, PipelineStatus::Saved),
            tracked(2, PipelineStatus::Rejected),
            tracked(3, PipelineStatus::Interviewing),
            tracked(4, PipelineStatus::OfferNegotiations),
            tracked(5, PipelineStatus::Applied),
        ];
        let active = filter_jobs(&jobs, JobFilter::ActivePipeline);
        assert_eq!(active.len(), 4);
        assert!(active.iter().all(|j| j.status != PipelineStatus::Rejected));

        let closed = filter_jobs(&jobs, JobFilter::ClosedPipeline);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].status, PipelineStatus::Rejected);
    }

    #[test]
    fn test_posting_filters_use_nested_status() {
        let mut expired = tracked(1, PipelineStatus::Saved);
        expired.job.status = PostingStatus::Closed;
        let active = tracked(2, PipelineStatus::Rejected);
        let mut unknown = tracked(3, PipelineStatus::Saved);
        unknown.job.status = PostingStatus::Unknown;
        let jobs = vec![expired, active, unknown];

        let ids = |f| {
            filter_jobs(&jobs, f)
                .iter()
                .map(|j| j.tracked_job_id.0)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(JobFilter::ExpiredPosting), vec![1]);
        assert_eq!(ids(JobFilter::ActivePosting), vec![2]);
        assert_eq!(ids(JobFilter::All), vec![1, 2, 3]);
    }

    #[test]
    fn test_changing_filter_resets_page() {
        let mut view = DashboardView::new(10);
        view.set_page(2);
        view.set_filter(JobFilter::ClosedPipeline);
        assert_eq!(view.page(), 0);

        view.set_page(1);
        view.set_filter(JobFilter::ClosedPipeline);
        assert_eq!(view.page(), 0);
    }

    #[test]
    fn test_render_pages_filtered_list() {
        let jobs = collection(25);
        let mut view = DashboardView::new(2);
        view.set_filter(JobFilter::ActivePipeline);
        view.set_page(1);
        let page = view.render(&jobs);
        // ids 0..25 cycle through 8 statuses, the first 4 of which are active
        assert_eq!(page.filtered_len, 13);
        assert_eq!(page.page_count, 7);
        let ids: Vec<i64> = page.items.iter().map(|j| j.tracked_job_id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_sort_puts_missing_timestamps_last() {
        let mut a = tracked(1, PipelineStatus::Applied);
        a.applied_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        let b = tracked(2, PipelineStatus::Saved);
        let mut c = tracked(3, PipelineStatus::Applied);
        c.applied_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        let jobs = vec![a, b, c];

        let mut refs: Vec<&TrackedJob> = jobs.iter().collect();
        sort_jobs(
            &mut refs,
            SortOrder {
                key: SortKey::AppliedAt,
                descending: true,
            },
        );
        let ids: Vec<i64> = refs.iter().map(|j| j.tracked_job_id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        sort_jobs(
            &mut refs,
            SortOrder {
                key: SortKey::AppliedAt,
                descending: false,
            },
        );
        let ids: Vec<i64> = refs.iter().map(|j| j.tracked_job_id.0).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("active-pipeline".parse::<JobFilter>().unwrap(), JobFilter::ActivePipeline);
        assert_eq!("expired".parse::<JobFilter>().unwrap(), JobFilter::ExpiredPosting);
        assert!("everything".parse::<JobFilter>().is_err());
    }
}
