use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::BranchPrefixes;
use crate::error::{GitFlowError, Result};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "gitflow.toml";

/// Represents the complete configuration for gitflow-release.
///
/// Contains the long-lived branch names, git-flow prefixes, build and
/// packaging layout, and the optional repository slug.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchConfig,

    #[serde(default)]
    pub prefixes: BranchPrefixes,

    #[serde(default)]
    pub build: BuildConfig,

    /// `owner/name` of the hosted repository
    #[serde(default)]
    pub repository: Option<String>,
}

/// Long-lived branches of the git-flow model
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchConfig {
    #[serde(default = "default_main")]
    pub main: String,

    #[serde(default = "default_development")]
    pub development: String,

    /// Quality branch names; a branch equal to or starting with one of these qualifies
    #[serde(default = "default_quality")]
    pub quality: Vec<String>,
}

fn default_main() -> String {
    "main".to_string()
}

fn default_development() -> String {
    "develop".to_string()
}

fn default_quality() -> Vec<String> {
    vec!["quality".to_string()]
}

impl Default for BranchConfig {
    fn default() -> Self {
        BranchConfig {
            main: default_main(),
            development: default_development(),
            quality: default_quality(),
        }
    }
}

/// Project layout used by the release build and changelog steps.
///
/// All paths are relative to the project root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    /// JSON package manifest carrying `name` and `version`
    pub manifest: String,
    pub changelog: String,
    /// Presence of this file marks an archive-build
    pub archive_descriptor: String,
    pub archive_dir: String,
    pub archive_extension: String,
    /// File a standard build must leave behind
    pub standard_output: String,
    /// Root-level paths zipped into a standard release package
    pub package_paths: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            manifest: "package.json".to_string(),
            changelog: "CHANGELOG.md".to_string(),
            archive_descriptor: "mta.yaml".to_string(),
            archive_dir: "mta_archives".to_string(),
            archive_extension: "mtar".to_string(),
            standard_output: "dist/index.js".to_string(),
            package_paths: vec![
                "dist".to_string(),
                "action.yml".to_string(),
                "package.json".to_string(),
                "README.md".to_string(),
                "LICENSE".to_string(),
            ],
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitflow.toml` in current directory
/// 3. `.gitflow.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read(Path::new(path))?
    } else if Path::new(CONFIG_FILE).exists() {
        read(Path::new(CONFIG_FILE))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE));
        if config_path.exists() {
            read(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| GitFlowError::config(format!("Invalid configuration: {}", e)))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        GitFlowError::config(format!("Cannot read config '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.branches.main, "main");
        assert_eq!(config.branches.development, "develop");
        assert_eq!(config.prefixes.release, "release/");
        assert_eq!(config.build.archive_extension, "mtar");
        assert!(config.repository.is_none());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = parse_config(
            r#"
[branches]
development = "dev"

[prefixes]
tag = "version-"
"#,
        )
        .unwrap();
        assert_eq!(config.branches.main, "main");
        assert_eq!(config.branches.development, "dev");
        assert_eq!(config.branches.quality, vec!["quality".to_string()]);
        assert_eq!(config.prefixes.tag, "version-");
        assert_eq!(config.prefixes.release, "release/");
        assert_eq!(config.build, BuildConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = parse_config("[branches\nmain = ").unwrap_err();
        assert!(matches!(err, GitFlowError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = load_config(Some("/nonexistent/gitflow.toml")).unwrap_err();
        assert!(matches!(err, GitFlowError::Config(_)));
    }
}
