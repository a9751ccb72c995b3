//! Git-flow workflows and their selection
//!
//! Each workflow is a variant of the closed [`Workflow`] enum with a pure
//! applicability predicate ([`Workflow::test`]) and a handler
//! ([`Workflow::handle`]). The [`Dispatcher`] picks the first applicable one
//! in a fixed registration order.

pub mod dispatch;
pub mod merge;
pub mod release;

pub use dispatch::Dispatcher;
pub use release::{ReleaseOutcome, ReleaseWorkflow};

use std::fmt;
use std::path::Path;

use crate::build::CommandRunner;
use crate::config::BuildConfig;
use crate::domain::{BranchPrefixes, BranchSet, CommitId};
use crate::error::Result;
use crate::gateway::Gateway;

/// Everything one workflow run needs, fixed for the run's duration
pub struct RunContext<'a> {
    pub branches: &'a BranchSet,
    pub prefixes: &'a BranchPrefixes,
    pub build: &'a BuildConfig,
    pub gateway: &'a dyn Gateway,
    pub runner: &'a dyn CommandRunner,
    /// Local checkout the release build runs in
    pub project_dir: &'a Path,
}

/// The git-flow workflows this tool automates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// Promote a release branch to tag and published release
    Release,
    /// Merge a hotfix into main and development
    Hotfix,
    /// Merge a bugfix into development or a quality branch
    Bugfix,
    /// Merge a feature into development or a quality branch
    Feature,
}

fn names_branch(branch: &str, prefix: &str) -> bool {
    !prefix.is_empty() && branch.contains(prefix)
}

impl Workflow {
    pub fn name(&self) -> &'static str {
        match self {
            Workflow::Release => "release",
            Workflow::Hotfix => "hotfix",
            Workflow::Bugfix => "bugfix",
            Workflow::Feature => "feature",
        }
    }

    /// Whether this workflow applies to the branch pair.
    ///
    /// An empty prefix never matches.
    pub fn test(&self, branches: &BranchSet, prefixes: &BranchPrefixes) -> bool {
        match self {
            Workflow::Release => names_branch(&branches.current, &prefixes.release),
            Workflow::Hotfix => names_branch(&branches.current, &prefixes.hotfix),
            Workflow::Bugfix => {
                names_branch(&branches.current, &prefixes.bugfix) && branches.targets_integration()
            }
            Workflow::Feature => {
                names_branch(&branches.current, &prefixes.feature)
                    && branches.targets_integration()
            }
        }
    }

    /// Run the workflow; returns the resulting commit identifier
    pub fn handle(&self, ctx: &RunContext<'_>) -> Result<CommitId> {
        match self {
            Workflow::Release => ReleaseWorkflow::new(ctx).run().map(|outcome| outcome.commit),
            Workflow::Hotfix => merge::promote_hotfix(ctx),
            Workflow::Bugfix | Workflow::Feature => merge::merge_down(ctx),
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
