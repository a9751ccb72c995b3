// tests/config_test.rs
use gitflow_release::config::{load_config, parse_config, Config};
use gitflow_release::GitFlowError;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
repository = "acme/billing"

[branches]
main = "master"
development = "dev"
quality = ["qa", "staging"]

[prefixes]
release = "rel/"
tag = "release-"

[build]
archive_extension = "zip"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.repository.as_deref(), Some("acme/billing"));
    assert_eq!(config.branches.main, "master");
    assert_eq!(config.branches.development, "dev");
    assert_eq!(config.branches.quality, vec!["qa", "staging"]);
    assert_eq!(config.prefixes.release, "rel/");
    assert_eq!(config.prefixes.tag, "release-");
    // unset keys keep their defaults
    assert_eq!(config.prefixes.hotfix, "hotfix/");
    assert_eq!(config.build.archive_extension, "zip");
    assert_eq!(config.build.manifest, "package.json");
}

#[test]
fn test_empty_file_is_default() {
    assert_eq!(parse_config("").unwrap(), Config::default());
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let err = load_config(Some("/nonexistent/gitflow.toml")).unwrap_err();
    assert!(matches!(err, GitFlowError::Config(_)));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = parse_config("[branches\nmain = ").unwrap_err();
    assert!(matches!(err, GitFlowError::Config(_)));
}
