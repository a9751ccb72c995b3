use serde::Deserialize;

/// Head of a pull request: the branch it comes from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestHead {
    #[serde(rename = "ref")]
    pub name: String,
    /// `owner:branch`
    #[serde(default)]
    pub label: String,
}

/// Pull request as returned by a head-reference search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub head: PullRequestHead,
}

impl PullRequestSummary {
    /// Whether `head` names this pull request's head, bare or owner-qualified
    pub fn head_matches(&self, head: &str) -> bool {
        self.head.name == head || self.head.label == head
    }
}

/// Full pull request detail
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestDetail {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "html_url", default)]
    pub url: String,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub commits: u64,
}

/// Description and link used for the changelog entry and the published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestMetadata {
    pub body: String,
    pub url: Option<String>,
}
