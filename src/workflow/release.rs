//! Release promotion
//!
//! Promotes a release branch in a fixed sequence of blocking steps:
//!
//! 1. extract the version from the branch name
//! 2. resolve the project name from the package manifest
//! 3. bump the manifest version on the release branch
//! 4. add a changelog entry (best-effort)
//! 5. merge into development, then into main
//! 6. tag the main commit
//! 7. build and package the release artifact
//! 8. resolve the pull request behind the release
//! 9. publish the release and upload the artifact
//! 10. delete the release branch
//!
//! Only the changelog step may fail without aborting the run. Nothing
//! already applied is rolled back when a later step fails.

use serde_json::Value;
use std::path::Path;

use crate::boundary::BoundaryWarning;
use crate::build::BuildPackager;
use crate::changelog;
use crate::domain::{tag_name, CommitId, PullRequestMetadata, ReleaseArtifact, Version};
use crate::error::{GitFlowError, Result};
use crate::gateway::{FileUpdate, NewRelease, PublishedRelease, RemoteFile};
use crate::metadata::ReleaseMetadataResolver;
use crate::version;
use crate::workflow::RunContext;

/// Project name used when no manifest names the project
pub const PLACEHOLDER_PROJECT: &str = "project";

/// What a completed release run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    /// Head of main after the release merge
    pub commit: CommitId,
    pub version: Version,
    pub tag: String,
    pub project: String,
    pub artifact: ReleaseArtifact,
    pub release: PublishedRelease,
}

/// Project name from manifest content, usable in a file name.
///
/// Scoped names lose their scope (`@acme/billing` becomes `billing`).
pub fn project_name(manifest: Option<&str>) -> String {
    manifest
        .and_then(|content| serde_json::from_str::<Value>(content).ok())
        .and_then(|value| value.get("name").and_then(Value::as_str).map(str::to_string))
        .map(|name| name.rsplit('/').next().unwrap_or_default().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_PROJECT.to_string())
}

/// Release name shown on the hosting platform
pub fn release_name(version: &Version) -> String {
    format!("Release v{}", version)
}

/// Release body: project heading, description and pull request link
pub fn release_body(project: &str, version: &Version, metadata: &PullRequestMetadata) -> String {
    let mut body = format!("## {} v{}\n\n{}\n", project, version, metadata.body.trim());
    if let Some(url) = &metadata.url {
        body.push_str(&format!("\nPull request: {}\n", url));
    }
    body
}

/// The release promotion pipeline for one release branch
pub struct ReleaseWorkflow<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> ReleaseWorkflow<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        ReleaseWorkflow { ctx }
    }

    fn branch(&self) -> &str {
        &self.ctx.branches.current
    }

    fn resolver(&self) -> ReleaseMetadataResolver<'_> {
        ReleaseMetadataResolver::new(self.ctx.gateway, &self.ctx.prefixes.release)
    }

    /// Run every step in order; the first fatal error stops the run
    pub fn run(&self) -> Result<ReleaseOutcome> {
        let ctx = self.ctx;
        let gateway = ctx.gateway;
        let branch = self.branch();

        let version = version::extract_version(branch, &ctx.prefixes.release)?;
        tracing::info!(%version, branch, "starting release");

        let manifest = self.read_manifest()?;
        let project = project_name(manifest.as_ref().map(|file| file.content.as_str()));
        tracing::info!(project = %project, "resolved project name");

        if let Some(file) = &manifest {
            self.bump_manifest(file, &version)?;
        }

        let early_metadata = self.changelog_step(&version)?;

        tracing::info!(to = %ctx.branches.development, "merging release");
        gateway.merge(branch, &ctx.branches.development)?;
        tracing::info!(to = %ctx.branches.main, "merging release");
        let commit = gateway.merge(branch, &ctx.branches.main)?;

        let tag = tag_name(branch, &ctx.prefixes.release, &ctx.prefixes.tag);
        gateway.create_tag(&tag, &commit)?;
        tracing::info!(tag = %tag, commit = %commit, "tagged release");

        let packager = BuildPackager::new(ctx.runner, ctx.project_dir, ctx.build);
        let artifact = packager.package(&project, &version, |descriptor| {
            self.commit_descriptor(descriptor, &version)
        })?;
        tracing::info!(artifact = %artifact.path.display(), kind = %artifact.kind, "artifact built");

        // step 8 reuses the lookup made for the changelog when it succeeded
        let metadata = match early_metadata {
            Some(metadata) => metadata,
            None => self.resolver().resolve(branch)?,
        };

        let release = gateway.create_release(&NewRelease {
            tag: tag.clone(),
            name: release_name(&version),
            body: release_body(&project, &version, &metadata),
            target: commit.clone(),
        })?;
        gateway.upload_release_asset(&release, &artifact.path)?;
        tracing::info!(url = %release.url, asset = %artifact.file_name(), "published release");

        gateway.delete_branch(branch)?;
        tracing::info!(branch, "deleted release branch");

        Ok(ReleaseOutcome {
            commit,
            version,
            tag,
            project,
            artifact,
            release,
        })
    }

    /// Manifest on the release branch; absent is not an error
    fn read_manifest(&self) -> Result<Option<RemoteFile>> {
        let path = &self.ctx.build.manifest;
        match self.ctx.gateway.get_file_content(path, self.branch()) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.is_not_found() => {
                BoundaryWarning::ManifestMissing { path: path.clone() }.log();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn bump_manifest(&self, file: &RemoteFile, version: &Version) -> Result<()> {
        let patched = version::patch_manifest_version(&file.content, version)?;
        let message = format!("chore(release): bump version to {}", version);
        self.ctx.gateway.update_file(&FileUpdate {
            path: &self.ctx.build.manifest,
            content: &patched,
            message: &message,
            branch: self.branch(),
            prior_sha: Some(file.sha.as_str()),
        })?;
        tracing::info!(path = %self.ctx.build.manifest, "bumped manifest version");
        Ok(())
    }

    /// Best-effort changelog update.
    ///
    /// Returns the pull request metadata if it could already be found, so the
    /// publish step can reuse it.
    fn changelog_step(&self, version: &Version) -> Result<Option<PullRequestMetadata>> {
        let metadata = match self.resolver().resolve(self.branch()) {
            Ok(metadata) => Some(metadata),
            Err(e) if e.is_not_found() => {
                BoundaryWarning::ChangelogWithoutPullRequest {
                    branch: self.branch().to_string(),
                }
                .log();
                None
            }
            Err(e) => {
                BoundaryWarning::ChangelogSkipped {
                    reason: e.to_string(),
                }
                .log();
                return Ok(None);
            }
        };

        match self.write_changelog(version, metadata.as_ref()) {
            Ok(()) => {}
            Err(e) if !e.is_fatal() => {
                BoundaryWarning::ChangelogSkipped {
                    reason: e.to_string(),
                }
                .log();
            }
            Err(e) => return Err(e),
        }
        Ok(metadata)
    }

    fn write_changelog(
        &self,
        version: &Version,
        metadata: Option<&PullRequestMetadata>,
    ) -> Result<()> {
        let path = &self.ctx.build.changelog;
        let existing = match self.ctx.gateway.get_file_content(path, self.branch()) {
            Ok(file) => Some(file),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(GitFlowError::changelog(format!("Cannot read '{}': {}", path, e))),
        };

        let body = metadata.map(|m| m.body.as_str()).unwrap_or("");
        let url = metadata.and_then(|m| m.url.as_deref());
        let content = changelog::merge_entry(
            existing.as_ref().map(|f| f.content.as_str()).unwrap_or(""),
            version,
            body,
            url,
        );

        let message = format!("docs(changelog): add entry for v{}", version);
        self.ctx
            .gateway
            .update_file(&FileUpdate {
                path,
                content: &content,
                message: &message,
                branch: self.branch(),
                prior_sha: existing.as_ref().map(|f| f.sha.as_str()),
            })
            .map_err(|e| GitFlowError::changelog(format!("Cannot write '{}': {}", path, e)))?;

        tracing::info!(path = %path, "changelog updated");
        Ok(())
    }

    /// Commit the descriptor version to the release branch
    fn commit_descriptor(&self, descriptor: &Path, version: &Version) -> Result<()> {
        let path = &self.ctx.build.archive_descriptor;
        let file = self.ctx.gateway.get_file_content(path, self.branch())?;

        if !version::descriptor_has_version(&file.content) {
            BoundaryWarning::DescriptorUnchanged { path: path.clone() }.log();
            return Ok(());
        }

        let patched = version::patch_descriptor_version(&file.content, version);
        if patched == file.content {
            tracing::info!(path = %path, "descriptor already at release version");
            return Ok(());
        }

        let message = format!("chore(release): set {} version to {}", path, version);
        self.ctx.gateway.update_file(&FileUpdate {
            path,
            content: &patched,
            message: &message,
            branch: self.branch(),
            prior_sha: Some(file.sha.as_str()),
        })?;
        tracing::info!(descriptor = %descriptor.display(), "descriptor version committed");
        Ok(())
    }
}
