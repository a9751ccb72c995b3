use crate::domain::{BranchPrefixes, BranchSet, CommitId};
use crate::error::{GitFlowError, Result};
use crate::workflow::{RunContext, Workflow};

/// Registration order. First match wins, so broader predicates that could
/// overlap on branch names (release, hotfix) come before the narrower ones.
pub const REGISTRATION_ORDER: [Workflow; 4] = [
    Workflow::Release,
    Workflow::Hotfix,
    Workflow::Bugfix,
    Workflow::Feature,
];

/// Selects the workflow for an event by first-match over an ordered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    workflows: Vec<Workflow>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher {
            workflows: REGISTRATION_ORDER.to_vec(),
        }
    }
}

impl Dispatcher {
    /// Dispatcher with a custom order
    pub fn with_order(workflows: Vec<Workflow>) -> Self {
        Dispatcher { workflows }
    }

    pub fn workflows(&self) -> &[Workflow] {
        &self.workflows
    }

    /// First workflow whose predicate holds, or `NoMatchingWorkflow`
    pub fn select(&self, branches: &BranchSet, prefixes: &BranchPrefixes) -> Result<Workflow> {
        self.workflows
            .iter()
            .copied()
            .find(|workflow| workflow.test(branches, prefixes))
            .ok_or_else(|| GitFlowError::NoMatchingWorkflow {
                current: branches.current.clone(),
                target: branches.target.clone(),
            })
    }

    /// Select and run the matching workflow
    pub fn dispatch(&self, ctx: &RunContext<'_>) -> Result<(Workflow, CommitId)> {
        let workflow = self.select(ctx.branches, ctx.prefixes)?;
        tracing::info!(
            workflow = workflow.name(),
            current = %ctx.branches.current,
            target = %ctx.branches.target,
            "dispatching"
        );
        let commit = workflow.handle(ctx)?;
        Ok((workflow, commit))
    }
}
