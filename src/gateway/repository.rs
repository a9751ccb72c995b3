use crate::error::{GitFlowError, Result};
use git2::Repository as Git2Repo;
use std::env;
use std::fmt;
use std::path::Path;

/// Environment variable the CI runner sets to `owner/name`
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

/// `owner/name` of a hosted repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse `owner/name`
    pub fn parse(slug: &str) -> Result<Self> {
        let mut parts = slug.trim().splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some(owner), Some(name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoSlug {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(GitFlowError::config(format!(
                "Invalid repository '{}': expected owner/name",
                slug
            ))),
        }
    }

    /// Derive the slug from a remote URL.
    ///
    /// Handles `https://host/owner/name(.git)`, `ssh://git@host/owner/name`
    /// and scp-like `git@host:owner/name.git`.
    pub fn from_remote_url(url: &str) -> Result<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let path = if let Some((_, rest)) = trimmed.split_once("://") {
            rest.split_once('/').map(|(_, path)| path)
        } else {
            trimmed.split_once(':').map(|(_, path)| path)
        };

        let path = path.ok_or_else(|| {
            GitFlowError::config(format!("Cannot derive repository from remote '{}'", url))
        })?;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [.., owner, name] => Ok(RepoSlug {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(GitFlowError::config(format!(
                "Cannot derive repository from remote '{}'",
                url
            ))),
        }
    }

    /// Discover the slug from the `origin` remote of the checkout containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        let remote = repo.find_remote("origin").map_err(|e| {
            GitFlowError::config(format!("Cannot find remote 'origin': {}", e))
        })?;
        let url = remote
            .url()
            .ok_or_else(|| GitFlowError::config("Remote 'origin' has no UTF-8 URL"))?;
        Self::from_remote_url(url)
    }

    /// Resolve the slug for this run.
    ///
    /// Order: explicit flag, configured value, `GITHUB_REPOSITORY`, then the
    /// `origin` remote of the checkout at `project_dir`.
    pub fn resolve(
        explicit: Option<&str>,
        configured: Option<&str>,
        project_dir: &Path,
    ) -> Result<Self> {
        if let Some(slug) = explicit.or(configured) {
            return Self::parse(slug);
        }
        match env::var(REPOSITORY_VAR) {
            Ok(slug) if !slug.trim().is_empty() => Self::parse(&slug),
            _ => Self::discover(project_dir),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
