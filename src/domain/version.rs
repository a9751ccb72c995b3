use crate::error::{GitFlowError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static VERSION_LITERAL: OnceLock<Regex> = OnceLock::new();

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse an exact `major.minor.patch` literal.
    ///
    /// The whole input must match; leading `v`, pre-release suffixes and
    /// surrounding whitespace are all rejected.
    pub fn parse(literal: &str) -> Result<Self> {
        let re = VERSION_LITERAL.get_or_init(|| {
            Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("VERSION_LITERAL should be valid")
        });
        let captures = re.captures(literal).ok_or_else(|| {
            GitFlowError::validation(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                literal
            ))
        })?;

        let component = |index: usize| -> Result<u32> {
            captures[index].parse::<u32>().map_err(|_| {
                GitFlowError::validation(format!(
                    "Version component out of range: {}",
                    &captures[index]
                ))
            })
        };

        Ok(Version {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
