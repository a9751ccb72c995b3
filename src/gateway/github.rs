use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::build::{CommandRunner, CommandSpec};
use crate::domain::{CommitId, PullRequestDetail, PullRequestSummary};
use crate::error::{GitFlowError, Result};
use crate::gateway::{FileUpdate, Gateway, NewRelease, PublishedRelease, RemoteFile, RepoSlug};

#[derive(Deserialize)]
struct ShaObject {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ShaObject,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
    sha: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    id: u64,
    #[serde(default)]
    html_url: String,
}

/// GitHub gateway backed by the `gh` command line client.
///
/// Authentication is whatever `gh` is configured with (`GH_TOKEN` in CI).
pub struct GhGateway<R: CommandRunner> {
    runner: R,
    slug: RepoSlug,
}

impl<R: CommandRunner> GhGateway<R> {
    pub fn new(runner: R, slug: RepoSlug) -> Self {
        GhGateway { runner, slug }
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("repos/{}/{}", self.slug, rest)
    }

    /// Run `gh api` and return stdout
    fn api<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec!["api".to_string()];
        all.extend(args.into_iter().map(Into::into));
        let command = CommandSpec::new("gh", all);
        tracing::debug!(command = %command, "gateway call");

        let output = self
            .runner
            .run(&command)
            .map_err(|e| GitFlowError::gateway(format!("Cannot run gh: {}", e)))?;

        if output.success() {
            return Ok(output.stdout);
        }

        let stderr = output.stderr.trim();
        if stderr.contains("HTTP 404") || stderr.contains("Not Found") {
            Err(GitFlowError::not_found(format!("{}: {}", command, stderr)))
        } else {
            Err(GitFlowError::gateway(format!("{}: {}", command, stderr)))
        }
    }

    fn api_json<T: DeserializeOwned>(&self, args: Vec<String>) -> Result<T> {
        let stdout = self.api(args)?;
        Ok(serde_json::from_str(&stdout)?)
    }

    fn branch_head(&self, branch: &str) -> Result<CommitId> {
        let reference: RefResponse =
            self.api_json(vec![self.repo_path(&format!("git/ref/heads/{}", branch))])?;
        Ok(reference.object.sha)
    }
}

fn field(name: &str, value: impl AsRef<str>) -> [String; 2] {
    ["-f".to_string(), format!("{}={}", name, value.as_ref())]
}

impl<R: CommandRunner> Gateway for GhGateway<R> {
    fn owner(&self) -> &str {
        &self.slug.owner
    }

    fn merge(&self, from: &str, to: &str) -> Result<CommitId> {
        let mut args = vec!["-X".to_string(), "POST".to_string(), self.repo_path("merges")];
        args.extend(field("base", to));
        args.extend(field("head", from));
        args.extend(field("commit_message", format!("Merge branch '{}' into {}", from, to)));

        let stdout = self.api(args).map_err(|e| match e {
            GitFlowError::Gateway(msg) if msg.contains("HTTP 409") => {
                GitFlowError::gateway(format!("Merge conflict merging '{}' into '{}'", from, to))
            }
            other => other,
        })?;

        // 204: nothing to merge, the target head is unchanged
        if stdout.trim().is_empty() {
            return self.branch_head(to);
        }
        let merged: ShaObject = serde_json::from_str(&stdout)?;
        Ok(merged.sha)
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.api([
            "-X".to_string(),
            "DELETE".to_string(),
            self.repo_path(&format!("git/refs/heads/{}", branch)),
        ])?;
        Ok(())
    }

    fn create_tag(&self, tag: &str, commit: &str) -> Result<()> {
        let mut args = vec!["-X".to_string(), "POST".to_string(), self.repo_path("git/refs")];
        args.extend(field("ref", format!("refs/tags/{}", tag)));
        args.extend(field("sha", commit));
        self.api(args)?;
        Ok(())
    }

    fn get_file_content(&self, path: &str, branch: &str) -> Result<RemoteFile> {
        let mut args = vec![
            "-X".to_string(),
            "GET".to_string(),
            self.repo_path(&format!("contents/{}", path)),
        ];
        args.extend(field("ref", branch));
        let response: ContentResponse = self.api_json(args)?;

        let encoded: String = response
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| GitFlowError::gateway(format!("Cannot decode '{}': {}", path, e)))?;
        let content = String::from_utf8(bytes)
            .map_err(|_| GitFlowError::gateway(format!("'{}' is not UTF-8 text", path)))?;

        Ok(RemoteFile {
            content,
            sha: response.sha,
        })
    }

    fn update_file(&self, update: &FileUpdate<'_>) -> Result<()> {
        let mut args = vec![
            "-X".to_string(),
            "PUT".to_string(),
            self.repo_path(&format!("contents/{}", update.path)),
        ];
        args.extend(field("message", update.message));
        args.extend(field("content", STANDARD.encode(update.content)));
        args.extend(field("branch", update.branch));
        if let Some(sha) = update.prior_sha {
            args.extend(field("sha", sha));
        }
        self.api(args)?;
        Ok(())
    }

    fn find_pull_requests(&self, head: &str) -> Result<Vec<PullRequestSummary>> {
        let mut args = vec!["-X".to_string(), "GET".to_string(), self.repo_path("pulls")];
        args.extend(field("state", "all"));
        args.extend(field("head", head));
        let pulls: Vec<PullRequestSummary> = self.api_json(args)?;

        // the head filter is ignored unless it is owner-qualified
        Ok(pulls.into_iter().filter(|pr| pr.head_matches(head)).collect())
    }

    fn get_pull_request(&self, number: u64) -> Result<PullRequestDetail> {
        self.api_json(vec![self.repo_path(&format!("pulls/{}", number))])
    }

    fn create_release(&self, release: &NewRelease) -> Result<PublishedRelease> {
        let mut args = vec!["-X".to_string(), "POST".to_string(), self.repo_path("releases")];
        args.extend(field("tag_name", &release.tag));
        args.extend(field("name", &release.name));
        args.extend(field("body", &release.body));
        args.extend(field("target_commitish", &release.target));

        let stdout = self
            .api(args)
            .map_err(|e| GitFlowError::publish(format!("Cannot create release: {}", e)))?;
        let created: ReleaseResponse = serde_json::from_str(&stdout)
            .map_err(|e| GitFlowError::publish(format!("Unexpected release response: {}", e)))?;

        Ok(PublishedRelease {
            id: created.id,
            tag: release.tag.clone(),
            url: created.html_url,
        })
    }

    fn upload_release_asset(&self, release: &PublishedRelease, asset: &Path) -> Result<()> {
        let command = CommandSpec::new(
            "gh",
            [
                "release".to_string(),
                "upload".to_string(),
                release.tag.clone(),
                asset.display().to_string(),
                "--repo".to_string(),
                self.slug.to_string(),
                "--clobber".to_string(),
            ],
        );
        tracing::debug!(command = %command, "gateway call");

        let output = self
            .runner
            .run(&command)
            .map_err(|e| GitFlowError::publish(format!("Cannot run gh: {}", e)))?;
        if !output.success() {
            return Err(GitFlowError::publish(format!(
                "Asset upload failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}
