//! Hosting platform gateway
//!
//! This module provides the typed interface through which every workflow
//! reaches the hosting platform: merges, refs, file contents, pull requests
//! and releases. Nothing else in the crate talks to the platform directly.
//!
//! # Overview
//!
//! The primary abstraction is the [Gateway] trait. The concrete
//! implementations include:
//!
//! - [github::GhGateway]: drives the GitHub REST API through the `gh` CLI
//! - [mock::MockGateway]: an in-memory repository for testing
//!
//! [repository] resolves the `owner/name` slug of the hosted repository
//! from the local checkout.
//!
//! Every call is attempted exactly once; there are no retries at this layer.

pub mod github;
pub mod mock;
pub mod repository;

pub use github::GhGateway;
pub use mock::{GatewayCall, MockGateway, Operation};
pub use repository::RepoSlug;

use std::path::Path;

use crate::domain::{CommitId, PullRequestDetail, PullRequestSummary};
use crate::error::Result;

/// A file read from a branch, with the content hash needed to update it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    pub sha: String,
}

/// An optimistic-concurrency file update on a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub message: &'a str,
    pub branch: &'a str,
    /// Current content hash; `None` creates the file
    pub prior_sha: Option<&'a str>,
}

/// Release to be created on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
    pub tag: String,
    pub name: String,
    pub body: String,
    pub target: CommitId,
}

/// A release that exists on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub id: u64,
    pub tag: String,
    pub url: String,
}

/// Hosting platform operations needed by the git-flow workflows
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`.
///
/// ## Error Handling
///
/// Missing files, branches and pull requests map to
/// [crate::error::GitFlowError::NotFound]; release creation and asset upload
/// failures map to [crate::error::GitFlowError::Publish]; every other failed
/// call (including merge conflicts) maps to
/// [crate::error::GitFlowError::Gateway].
pub trait Gateway: Send + Sync {
    /// Owner of the hosted repository, used for owner-qualified head refs
    fn owner(&self) -> &str;

    /// Merge `from` into `to`.
    ///
    /// # Returns
    /// * `Ok(CommitId)` - Head commit of `to` after the merge
    /// * `Err` - If the merge is not clean or either branch is missing
    fn merge(&self, from: &str, to: &str) -> Result<CommitId>;

    /// Delete a branch
    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Create a lightweight tag pointing at `commit`
    fn create_tag(&self, tag: &str, commit: &str) -> Result<()>;

    /// Read a file from a branch; fails with `NotFound` if it does not exist
    fn get_file_content(&self, path: &str, branch: &str) -> Result<RemoteFile>;

    /// Write a file on a branch as a single commit
    fn update_file(&self, update: &FileUpdate<'_>) -> Result<()>;

    /// Open or closed pull requests whose head matches `head`
    fn find_pull_requests(&self, head: &str) -> Result<Vec<PullRequestSummary>>;

    /// Full detail of one pull request
    fn get_pull_request(&self, number: u64) -> Result<PullRequestDetail>;

    fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease>;

    /// Attach a local file to an existing release
    fn upload_release_asset(&self, release: &PublishedRelease, asset: &Path) -> Result<()>;
}
