use std::fmt;

/// Non-fatal conditions met while running a workflow.
/// The run continues; these are reported to the operator.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Changelog maintenance failed and was skipped
    ChangelogSkipped { reason: String },
    /// No package manifest on the release branch
    ManifestMissing { path: String },
    /// Platform descriptor has no top-level `version:` line
    DescriptorUnchanged { path: String },
    /// Changelog entry written before a pull request could be found
    ChangelogWithoutPullRequest { branch: String },
}

impl BoundaryWarning {
    /// Log the warning through `tracing`
    pub fn log(&self) {
        tracing::warn!("{}", self);
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::ChangelogSkipped { reason } => {
                write!(f, "Changelog not updated: {}", reason)
            }
            BoundaryWarning::ManifestMissing { path } => {
                write!(
                    f,
                    "No '{}' on the release branch: using placeholder project name, version not bumped",
                    path
                )
            }
            BoundaryWarning::DescriptorUnchanged { path } => {
                write!(f, "'{}' has no top-level version line, left unchanged", path)
            }
            BoundaryWarning::ChangelogWithoutPullRequest { branch } => {
                write!(
                    f,
                    "No pull request found for '{}' yet: changelog entry has no release notes",
                    branch
                )
            }
        }
    }
}
