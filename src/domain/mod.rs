//! Domain logic - pure values and rules independent of the hosting platform

pub mod artifact;
pub mod branch;
pub mod pull_request;
pub mod tag;
pub mod version;

pub use artifact::{artifact_file_name, ArtifactKind, ReleaseArtifact};
pub use branch::{BranchPrefixes, BranchSet};
pub use pull_request::{
    PullRequestDetail, PullRequestHead, PullRequestMetadata, PullRequestSummary,
};
pub use tag::tag_name;
pub use version::Version;

/// Identifier of a commit on the hosting platform
pub type CommitId = String;
