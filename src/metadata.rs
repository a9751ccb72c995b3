//! Pull request lookup for release descriptions.

use crate::domain::{PullRequestDetail, PullRequestMetadata};
use crate::error::{GitFlowError, Result};
use crate::gateway::Gateway;

/// Head-reference encodings tried for `branch`, in order, without duplicates.
///
/// Raw branch name, branch with the release prefix stripped, then the
/// owner-qualified `owner:branch` form.
pub fn head_candidates(branch: &str, release_prefix: &str, owner: &str) -> Vec<String> {
    let mut candidates = vec![branch.to_string()];
    if let Some(stripped) = branch.strip_prefix(release_prefix) {
        candidates.push(stripped.to_string());
    }
    if !owner.is_empty() {
        candidates.push(format!("{}:{}", owner, branch));
    }

    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

/// Release description from a pull request.
///
/// A blank body is replaced by a summary built from the title and counts.
pub fn describe(detail: &PullRequestDetail) -> String {
    match detail.body.as_deref().map(str::trim) {
        Some(body) if !body.is_empty() => body.to_string(),
        _ => format!(
            "## {}\n\nThis release contains {} changed file(s) across {} commit(s).",
            detail.title.trim(),
            detail.changed_files,
            detail.commits
        ),
    }
}

/// Finds the pull request behind a release branch
pub struct ReleaseMetadataResolver<'a> {
    gateway: &'a dyn Gateway,
    release_prefix: &'a str,
}

impl<'a> ReleaseMetadataResolver<'a> {
    pub fn new(gateway: &'a dyn Gateway, release_prefix: &'a str) -> Self {
        ReleaseMetadataResolver {
            gateway,
            release_prefix,
        }
    }

    /// Resolve the description and link for `branch`.
    ///
    /// The first candidate with any match wins and its first result is used.
    /// No match for any candidate is a `NotFound` error.
    pub fn resolve(&self, branch: &str) -> Result<PullRequestMetadata> {
        let candidates = head_candidates(branch, self.release_prefix, self.gateway.owner());

        for candidate in &candidates {
            let pulls = self.gateway.find_pull_requests(candidate)?;
            let Some(first) = pulls.first() else {
                tracing::debug!(head = %candidate, "no pull request for head");
                continue;
            };

            if pulls.len() > 1 {
                tracing::warn!(
                    head = %candidate,
                    count = pulls.len(),
                    chosen = first.number,
                    "several pull requests share this head, using the first one"
                );
            }

            let detail = self.gateway.get_pull_request(first.number)?;
            if detail.body.as_deref().map(str::trim).unwrap_or("").is_empty() {
                tracing::warn!(number = detail.number, "pull request body is empty, using a summary");
            }

            let url = Some(detail.url.clone()).filter(|url| !url.is_empty());
            return Ok(PullRequestMetadata {
                body: describe(&detail),
                url,
            });
        }

        Err(GitFlowError::not_found(format!(
            "No pull request found for branch '{}' (tried: {})",
            branch,
            candidates.join(", ")
        )))
    }
}
