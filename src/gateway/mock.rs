use crate::domain::{CommitId, PullRequestDetail, PullRequestHead, PullRequestSummary};
use crate::error::{GitFlowError, Result};
use crate::gateway::{FileUpdate, Gateway, NewRelease, PublishedRelease, RemoteFile};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Gateway operation kinds, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Merge,
    DeleteBranch,
    CreateTag,
    GetFile,
    UpdateFile,
    FindPullRequests,
    GetPullRequest,
    CreateRelease,
    UploadAsset,
}

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Merge { from: String, to: String },
    DeleteBranch(String),
    CreateTag { tag: String, commit: String },
    GetFile { path: String, branch: String },
    UpdateFile { path: String, branch: String, message: String },
    FindPullRequests(String),
    GetPullRequest(u64),
    CreateRelease { tag: String, name: String },
    UploadAsset { tag: String, file_name: String },
}

impl GatewayCall {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayCall::Merge { .. } => Operation::Merge,
            GatewayCall::DeleteBranch(_) => Operation::DeleteBranch,
            GatewayCall::CreateTag { .. } => Operation::CreateTag,
            GatewayCall::GetFile { .. } => Operation::GetFile,
            GatewayCall::UpdateFile { .. } => Operation::UpdateFile,
            GatewayCall::FindPullRequests(_) => Operation::FindPullRequests,
            GatewayCall::GetPullRequest(_) => Operation::GetPullRequest,
            GatewayCall::CreateRelease { .. } => Operation::CreateRelease,
            GatewayCall::UploadAsset { .. } => Operation::UploadAsset,
        }
    }

    /// Whether the call changes state on the hosting platform
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self.operation(),
            Operation::GetFile | Operation::FindPullRequests | Operation::GetPullRequest
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredFile {
    content: String,
    sha: String,
}

/// A release recorded by the mock, with its uploaded asset names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRelease {
    pub release: NewRelease,
    pub assets: Vec<String>,
}

#[derive(Default)]
struct MockState {
    counter: u64,
    branches: HashMap<String, CommitId>,
    files: HashMap<String, HashMap<String, StoredFile>>,
    tags: HashMap<String, CommitId>,
    pull_requests: Vec<(PullRequestSummary, PullRequestDetail)>,
    releases: Vec<MockRelease>,
    failures: HashMap<Operation, String>,
    file_failures: HashMap<String, String>,
    calls: Vec<GatewayCall>,
}

impl MockState {
    fn next_id(&mut self, kind: &str) -> String {
        self.counter += 1;
        format!("{}-{}", kind, self.counter)
    }

    fn record(&mut self, call: GatewayCall) -> Result<()> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get(&operation) {
            Some(message) => match operation {
                Operation::CreateRelease | Operation::UploadAsset => {
                    Err(GitFlowError::publish(message.clone()))
                }
                _ => Err(GitFlowError::gateway(message.clone())),
            },
            None => Ok(()),
        }
    }

    fn check_file(&self, path: &str) -> Result<()> {
        match self.file_failures.get(path) {
            Some(message) => Err(GitFlowError::gateway(message.clone())),
            None => Ok(()),
        }
    }
}

/// Mock gateway for testing without a hosting platform
///
/// Branches, files, tags, pull requests and releases live in memory and
/// every call is recorded in order.
pub struct MockGateway {
    owner: String,
    state: Mutex<MockState>,
}

impl MockGateway {
    /// Create a new empty mock repository owned by `owner`
    pub fn new(owner: impl Into<String>) -> Self {
        MockGateway {
            owner: owner.into(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a branch with the given head commit
    pub fn add_branch(&mut self, name: impl Into<String>, commit: impl Into<String>) {
        self.state().branches.insert(name.into(), commit.into());
    }

    /// Add a file on a branch
    pub fn add_file(&mut self, branch: &str, path: &str, content: impl Into<String>) {
        let mut state = self.state();
        let sha = state.next_id("sha");
        state.files.entry(branch.to_string()).or_default().insert(
            path.to_string(),
            StoredFile {
                content: content.into(),
                sha,
            },
        );
    }

    /// Add a pull request coming from `head` (the owner-qualified label is derived)
    pub fn add_pull_request(&mut self, head: &str, detail: PullRequestDetail) {
        let summary = PullRequestSummary {
            number: detail.number,
            title: detail.title.clone(),
            head: PullRequestHead {
                name: head.to_string(),
                label: format!("{}:{}", self.owner, head),
            },
        };
        self.state().pull_requests.push((summary, detail));
    }

    /// Make every call of `operation` fail with `message`
    pub fn fail(&mut self, operation: Operation, message: impl Into<String>) {
        self.state().failures.insert(operation, message.into());
    }

    /// Make every read or write of the file at `path` fail with `message`
    pub fn fail_file(&mut self, path: &str, message: impl Into<String>) {
        self.state()
            .file_failures
            .insert(path.to_string(), message.into());
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// Calls that changed state on the platform
    pub fn mutations(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(GatewayCall::is_mutation).collect()
    }

    pub fn branch_head(&self, branch: &str) -> Option<CommitId> {
        self.state().branches.get(branch).cloned()
    }

    pub fn tag(&self, tag: &str) -> Option<CommitId> {
        self.state().tags.get(tag).cloned()
    }

    pub fn file(&self, branch: &str, path: &str) -> Option<String> {
        self.state()
            .files
            .get(branch)
            .and_then(|files| files.get(path))
            .map(|file| file.content.clone())
    }

    pub fn releases(&self) -> Vec<MockRelease> {
        self.state().releases.clone()
    }
}

impl Gateway for MockGateway {
    fn owner(&self) -> &str {
        &self.owner
    }

    fn merge(&self, from: &str, to: &str) -> Result<CommitId> {
        let mut state = self.state();
        state.record(GatewayCall::Merge {
            from: from.to_string(),
            to: to.to_string(),
        })?;

        for branch in [from, to] {
            if !state.branches.contains_key(branch) {
                return Err(GitFlowError::not_found(format!("Branch not found: {}", branch)));
            }
        }

        let incoming = state.files.get(from).cloned().unwrap_or_default();
        state
            .files
            .entry(to.to_string())
            .or_default()
            .extend(incoming);

        let commit = state.next_id("commit");
        state.branches.insert(to.to_string(), commit.clone());
        Ok(commit)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        let mut state = self.state();
        state.record(GatewayCall::DeleteBranch(branch.to_string()))?;
        state
            .branches
            .remove(branch)
            .map(|_| ())
            .ok_or_else(|| GitFlowError::not_found(format!("Branch not found: {}", branch)))
    }

    fn create_tag(&self, tag: &str, commit: &str) -> Result<()> {
        let mut state = self.state();
        state.record(GatewayCall::CreateTag {
            tag: tag.to_string(),
            commit: commit.to_string(),
        })?;
        if state.tags.contains_key(tag) {
            return Err(GitFlowError::gateway(format!("Tag already exists: {}", tag)));
        }
        state.tags.insert(tag.to_string(), commit.to_string());
        Ok(())
    }

    fn get_file_content(&self, path: &str, branch: &str) -> Result<RemoteFile> {
        let mut state = self.state();
        state.record(GatewayCall::GetFile {
            path: path.to_string(),
            branch: branch.to_string(),
        })?;
        state.check_file(path)?;
        state
            .files
            .get(branch)
            .and_then(|files| files.get(path))
            .map(|file| RemoteFile {
                content: file.content.clone(),
                sha: file.sha.clone(),
            })
            .ok_or_else(|| {
                GitFlowError::not_found(format!("File '{}' not found on '{}'", path, branch))
            })
    }

    fn update_file(&self, update: &FileUpdate<'_>) -> Result<()> {
        let mut state = self.state();
        state.record(GatewayCall::UpdateFile {
            path: update.path.to_string(),
            branch: update.branch.to_string(),
            message: update.message.to_string(),
        })?;
        state.check_file(update.path)?;

        if !state.branches.contains_key(update.branch) {
            return Err(GitFlowError::not_found(format!(
                "Branch not found: {}",
                update.branch
            )));
        }

        let current_sha = state
            .files
            .get(update.branch)
            .and_then(|files| files.get(update.path))
            .map(|file| file.sha.clone());
        if current_sha.as_deref() != update.prior_sha {
            return Err(GitFlowError::gateway(format!(
                "Content hash mismatch for '{}' on '{}'",
                update.path, update.branch
            )));
        }

        let sha = state.next_id("sha");
        let commit = state.next_id("commit");
        state
            .files
            .entry(update.branch.to_string())
            .or_default()
            .insert(
                update.path.to_string(),
                StoredFile {
                    content: update.content.to_string(),
                    sha,
                },
            );
        state.branches.insert(update.branch.to_string(), commit);
        Ok(())
    }

    fn find_pull_requests(&self, head: &str) -> Result<Vec<PullRequestSummary>> {
        let mut state = self.state();
        state.record(GatewayCall::FindPullRequests(head.to_string()))?;
        Ok(state
            .pull_requests
            .iter()
            .filter(|(summary, _)| summary.head_matches(head))
            .map(|(summary, _)| summary.clone())
            .collect())
    }

    fn get_pull_request(&self, number: u64) -> Result<PullRequestDetail> {
        let mut state = self.state();
        state.record(GatewayCall::GetPullRequest(number))?;
        state
            .pull_requests
            .iter()
            .find(|(summary, _)| summary.number == number)
            .map(|(_, detail)| detail.clone())
            .ok_or_else(|| GitFlowError::not_found(format!("Pull request #{} not found", number)))
    }

    fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
        let mut state = self.state();
        state.record(GatewayCall::CreateRelease {
            tag: release.tag.clone(),
            name: release.name.clone(),
        })?;
        if !state.tags.contains_key(&release.tag) {
            return Err(GitFlowError::publish(format!(
                "Tag '{}' does not exist",
                release.tag
            )));
        }
        state.releases.push(MockRelease {
            release: release.clone(),
            assets: Vec::new(),
        });
        let id = state.releases.len() as u64;
        Ok(PublishedRelease {
            id,
            tag: release.tag.clone(),
            url: format!("https://example.test/{}/releases/{}", self.owner, release.tag),
        })
    }

    fn upload_release_asset(&self, release: &PublishedRelease, asset: &Path) -> Result<()> {
        let file_name = asset
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut state = self.state();
        state.record(GatewayCall::UploadAsset {
            tag: release.tag.clone(),
            file_name: file_name.clone(),
        })?;
        if !asset.is_file() {
            return Err(GitFlowError::publish(format!(
                "Asset '{}' does not exist",
                asset.display()
            )));
        }
        let index = (release.id as usize)
            .checked_sub(1)
            .filter(|index| *index < state.releases.len())
            .ok_or_else(|| GitFlowError::publish(format!("Unknown release {}", release.id)))?;
        state.releases[index].assets.push(file_name);
        Ok(())
    }
}
