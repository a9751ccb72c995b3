//! Version text transforms.
//!
//! Pure functions: extract the release version from a branch name and
//! write a version into the package manifest or the platform descriptor.

use regex::{NoExpand, Regex};
use serde_json::Value;
use std::sync::OnceLock;

use crate::domain::Version;
use crate::error::{GitFlowError, Result};

static DESCRIPTOR_VERSION_LINE: OnceLock<Regex> = OnceLock::new();

fn descriptor_version_line() -> &'static Regex {
    DESCRIPTOR_VERSION_LINE.get_or_init(|| {
        Regex::new(r"(?m)^version:[ \t]*[^\r\n]*").expect("DESCRIPTOR_VERSION_LINE should be valid")
    })
}

/// Extract the release version from a branch name.
///
/// The branch must be exactly `release_prefix` followed by `major.minor.patch`;
/// anything else is a validation error.
///
/// # Examples
/// ```
/// # use gitflow_release::version::extract_version;
/// let version = extract_version("release/1.2.0", "release/").unwrap();
/// assert_eq!(version.to_string(), "1.2.0");
/// assert!(extract_version("release/1.2.0-rc1", "release/").is_err());
/// ```
pub fn extract_version(branch_name: &str, release_prefix: &str) -> Result<Version> {
    let literal = branch_name.strip_prefix(release_prefix).ok_or_else(|| {
        GitFlowError::validation(format!(
            "Branch '{}' does not start with release prefix '{}'",
            branch_name, release_prefix
        ))
    })?;

    Version::parse(literal).map_err(|_| {
        GitFlowError::validation(format!(
            "Branch '{}' is not a release branch: expected '{}X.Y.Z'",
            branch_name, release_prefix
        ))
    })
}

/// Set the `version` field of a JSON package manifest.
///
/// Key order is kept; output uses 2-space indentation and keeps a trailing
/// newline if the input had one.
pub fn patch_manifest_version(content: &str, version: &Version) -> Result<String> {
    let mut manifest: Value = serde_json::from_str(content)
        .map_err(|e| GitFlowError::format(format!("Manifest is not valid JSON: {}", e)))?;

    let object = manifest
        .as_object_mut()
        .ok_or_else(|| GitFlowError::format("Manifest root is not a JSON object"))?;
    object.insert("version".to_string(), Value::String(version.to_string()));

    let mut patched = serde_json::to_string_pretty(&manifest)?;
    if content.ends_with('\n') {
        patched.push('\n');
    }
    Ok(patched)
}

/// Replace the first `version:` line of a YAML-like descriptor.
///
/// Content without such a line is returned unchanged.
pub fn patch_descriptor_version(content: &str, version: &Version) -> String {
    let replacement = format!("version: {}", version);
    descriptor_version_line().replacen(content, 1, NoExpand(&replacement)).into_owned()
}

/// Whether the descriptor carries a `version:` line that would be patched
pub fn descriptor_has_version(content: &str) -> bool {
    descriptor_version_line().is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_version_from_release_branch() {
        for (major, minor, patch) in [(0, 0, 0), (1, 2, 0), (10, 20, 30)] {
            let branch = format!("release/{}.{}.{}", major, minor, patch);
            assert_eq!(
                extract_version(&branch, "release/").unwrap(),
                Version::new(major, minor, patch)
            );
        }
    }

    #[test]
    fn test_extract_version_rejects_other_shapes() {
        let rejected = [
            "release/abc",
            "release/1.2",
            "release/1.2.0-beta",
            "release/1.2.0/extra",
            "release/v1.2.0",
            "1.2.0",
            "feature/1.2.0",
            "xrelease/1.2.0",
        ];
        for branch in rejected {
            let err = extract_version(branch, "release/").unwrap_err();
            assert!(
                matches!(err, GitFlowError::Validation(_)),
                "{} should fail validation",
                branch
            );
        }
    }

    #[test]
    fn test_patch_manifest_version_keeps_key_order() {
        let content = "{\n  \"name\": \"billing\",\n  \"version\": \"1.1.0\",\n  \"private\": true\n}\n";
        let patched = patch_manifest_version(content, &Version::new(1, 2, 0)).unwrap();
        assert_eq!(
            patched,
            "{\n  \"name\": \"billing\",\n  \"version\": \"1.2.0\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn test_patch_manifest_version_adds_missing_field() {
        let patched = patch_manifest_version("{\"name\":\"billing\"}", &Version::new(2, 0, 0)).unwrap();
        assert_eq!(patched, "{\n  \"name\": \"billing\",\n  \"version\": \"2.0.0\"\n}");
    }

    #[test]
    fn test_patch_manifest_version_rejects_invalid_json() {
        let err = patch_manifest_version("name: billing", &Version::new(1, 0, 0)).unwrap_err();
        assert!(matches!(err, GitFlowError::Format(_)));

        let err = patch_manifest_version("[1, 2]", &Version::new(1, 0, 0)).unwrap_err();
        assert!(matches!(err, GitFlowError::Format(_)));
    }

    #[test]
    fn test_patch_descriptor_version_replaces_first_line_only() {
        let content = "_schema-version: '3.1'\nID: billing\nversion: 1.1.0\nmodules:\n  - name: srv\nversion: 9.9.9\n";
        let patched = patch_descriptor_version(content, &Version::new(1, 2, 0));
        assert_eq!(
            patched,
            "_schema-version: '3.1'\nID: billing\nversion: 1.2.0\nmodules:\n  - name: srv\nversion: 9.9.9\n"
        );
    }

    #[test]
    fn test_patch_descriptor_version_ignores_indented_keys() {
        let content = "ID: billing\nmodules:\n  - name: srv\n    version: 0.0.1\n";
        let patched = patch_descriptor_version(content, &Version::new(1, 2, 0));
        assert_eq!(patched, content);
        assert!(!descriptor_has_version(content));
    }

    #[test]
    fn test_patch_descriptor_version_is_idempotent() {
        let content = "ID: billing\nversion:   0.9.0 # bumped by CI\n";
        let version = Version::new(1, 2, 0);
        let once = patch_descriptor_version(content, &version);
        let twice = patch_descriptor_version(&once, &version);
        assert_eq!(once, twice);
        assert_eq!(once, "ID: billing\nversion: 1.2.0\n");
    }

    #[test]
    fn test_patch_descriptor_version_keeps_crlf() {
        let content = "ID: billing\r\nversion: 1.1.0\r\nmodules:\r\n";
        let patched = patch_descriptor_version(content, &Version::new(1, 2, 0));
        assert_eq!(patched, "ID: billing\r\nversion: 1.2.0\r\nmodules:\r\n");
        assert_eq!(patch_descriptor_version(&patched, &Version::new(1, 2, 0)), patched);
    }

    #[test]
    fn test_patch_descriptor_without_version_is_noop() {
        let content = "ID: billing\n";
        assert_eq!(patch_descriptor_version(content, &Version::new(1, 0, 0)), content);
    }
}
