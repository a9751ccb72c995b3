//! Branch resolution from the triggering pull request event.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BranchConfig;
use crate::domain::BranchSet;
use crate::error::{GitFlowError, Result};

/// Environment variable the CI runner sets to the event payload path
pub const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";

#[derive(Debug, Deserialize)]
struct EventRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    head: EventRef,
    base: EventRef,
}

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    pull_request: EventPullRequest,
}

/// Head and base branch of a pull request (or pull request review) event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPair {
    pub current: String,
    pub target: String,
}

impl BranchPair {
    /// Parse an event payload
    pub fn from_event_json(json: &str) -> Result<Self> {
        let event: PullRequestEvent = serde_json::from_str(json).map_err(|e| {
            GitFlowError::config(format!("Event payload has no pull request branches: {}", e))
        })?;
        Ok(BranchPair {
            current: event.pull_request.head.name,
            target: event.pull_request.base.name,
        })
    }

    /// Read and parse an event payload file
    pub fn from_event_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            GitFlowError::config(format!("Cannot read event '{}': {}", path.display(), e))
        })?;
        Self::from_event_json(&json)
    }
}

/// Event payload path from the environment, if set
pub fn event_path_from_env() -> Option<PathBuf> {
    env::var_os(EVENT_PATH_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Resolve the branch set for this run.
///
/// Explicit `current`/`target` win; whichever is missing comes from the event
/// payload at `event_path`. Long-lived branch names come from configuration.
pub fn resolve_branches(
    config: &BranchConfig,
    current: Option<String>,
    target: Option<String>,
    event_path: Option<&Path>,
) -> Result<BranchSet> {
    let (current, target) = match (current, target) {
        (Some(current), Some(target)) => (current, target),
        (current, target) => {
            let path = event_path.ok_or_else(|| {
                GitFlowError::config(format!(
                    "No branches given: pass --current and --target, --event, or set {}",
                    EVENT_PATH_VAR
                ))
            })?;
            let pair = BranchPair::from_event_file(path)?;
            (current.unwrap_or(pair.current), target.unwrap_or(pair.target))
        }
    };

    if current.trim().is_empty() || target.trim().is_empty() {
        return Err(GitFlowError::config("Current and target branch must not be empty"));
    }

    Ok(BranchSet {
        current,
        target,
        main: config.main.clone(),
        development: config.development.clone(),
        quality: config.quality.clone(),
    })
}
