pub mod company;
pub mod profile;
pub mod recommendation;
pub mod status;
pub mod tracked_job;

pub use company::CompanyProfile;
pub use profile::{Profile, ProfilePatch};
pub use recommendation::RecommendedJob;
pub use status::{PipelineStatus, PostingStatus};
pub use tracked_job::{AiAnalysis, Job, TrackedJob, TrackedJobId, TrackedJobPatch};
