// Tracked-job pipeline: the synchronizer that owns the collection, the
// optimistic mutation lifecycle, and the derived dashboard views.

pub mod mutation;
pub mod sync;
pub mod view;

pub use mutation::{MutationOutcome, MutationState};
pub use sync::{ListOutcome, TrackedJobSync};
pub use view::{DashboardView, JobFilter, PageView, SortKey, SortOrder};
