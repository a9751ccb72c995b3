use serde::{Deserialize, Serialize};

/// The branches involved in one workflow run.
///
/// Resolved once from the triggering event and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSet {
    /// Branch the pull request comes from
    pub current: String,
    /// Branch the pull request targets
    pub target: String,
    pub main: String,
    pub development: String,
    /// Names (or name prefixes) of quality branches
    pub quality: Vec<String>,
}

impl BranchSet {
    /// Whether `target` is the development branch or a quality branch
    pub fn targets_integration(&self) -> bool {
        self.target == self.development || self.is_quality(&self.target)
    }

    /// A branch is a quality branch if it equals or starts with a configured quality name
    pub fn is_quality(&self, branch: &str) -> bool {
        self.quality
            .iter()
            .filter(|name| !name.is_empty())
            .any(|name| branch == name || branch.starts_with(name.as_str()))
    }
}

/// Git-flow naming prefixes, constant for the run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BranchPrefixes {
    pub feature: String,
    pub bugfix: String,
    pub hotfix: String,
    pub release: String,
    pub support: String,
    pub tag: String,
}

impl Default for BranchPrefixes {
    fn default() -> Self {
        BranchPrefixes {
            feature: "feature/".to_string(),
            bugfix: "bugfix/".to_string(),
            hotfix: "hotfix/".to_string(),
            release: "release/".to_string(),
            support: "support/".to_string(),
            tag: "v".to_string(),
        }
    }
}
