//! Merge-only workflows: feature and bugfix merge-down, hotfix promotion.

use crate::domain::CommitId;
use crate::error::Result;
use crate::workflow::RunContext;

/// Merge `current` into `target` and delete `current`.
///
/// Used by the feature and bugfix workflows; returns the merge commit.
pub fn merge_down(ctx: &RunContext<'_>) -> Result<CommitId> {
    let branches = ctx.branches;

    tracing::info!(from = %branches.current, to = %branches.target, "merging");
    let commit = ctx.gateway.merge(&branches.current, &branches.target)?;

    ctx.gateway.delete_branch(&branches.current)?;
    tracing::info!(branch = %branches.current, "deleted merged branch");
    Ok(commit)
}

/// Merge a hotfix into main, then into development, then delete it.
///
/// Returns the commit on main.
pub fn promote_hotfix(ctx: &RunContext<'_>) -> Result<CommitId> {
    let branches = ctx.branches;

    tracing::info!(from = %branches.current, to = %branches.main, "merging");
    let main_commit = ctx.gateway.merge(&branches.current, &branches.main)?;

    tracing::info!(from = %branches.current, to = %branches.development, "merging");
    ctx.gateway.merge(&branches.current, &branches.development)?;

    ctx.gateway.delete_branch(&branches.current)?;
    tracing::info!(branch = %branches.current, "deleted hotfix branch");
    Ok(main_commit)
}
