// tests/workflow_test.rs
use gitflow_release::build::ScriptedRunner;
use gitflow_release::config::BuildConfig;
use gitflow_release::domain::{BranchPrefixes, BranchSet};
use gitflow_release::gateway::{GatewayCall, MockGateway};
use gitflow_release::workflow::{Dispatcher, RunContext, Workflow};
use gitflow_release::GitFlowError;
use std::path::Path;

fn branches(current: &str, target: &str) -> BranchSet {
    BranchSet {
        current: current.to_string(),
        target: target.to_string(),
        main: "main".to_string(),
        development: "develop".to_string(),
        quality: vec!["quality".to_string()],
    }
}

fn gateway_with(extra: &[&str]) -> MockGateway {
    let mut gateway = MockGateway::new("acme");
    for branch in ["main", "develop", "quality-eu"].iter().chain(extra) {
        gateway.add_branch(*branch, format!("{}-head", branch));
    }
    gateway
}

fn run(set: &BranchSet, gateway: &MockGateway) -> gitflow_release::Result<(Workflow, String)> {
    let prefixes = BranchPrefixes::default();
    let build = BuildConfig::default();
    let runner = ScriptedRunner::succeeding();
    let ctx = RunContext {
        branches: set,
        prefixes: &prefixes,
        build: &build,
        gateway,
        runner: &runner,
        project_dir: Path::new("."),
    };
    Dispatcher::default().dispatch(&ctx)
}

#[test]
fn test_feature_into_development() {
    let gateway = gateway_with(&["feature/login"]);
    let (workflow, commit) = run(&branches("feature/login", "develop"), &gateway).unwrap();

    assert_eq!(workflow, Workflow::Feature);
    assert_eq!(gateway.branch_head("develop"), Some(commit));
    assert_eq!(gateway.branch_head("feature/login"), None);
    assert_eq!(
        gateway.mutations(),
        vec![
            GatewayCall::Merge {
                from: "feature/login".to_string(),
                to: "develop".to_string()
            },
            GatewayCall::DeleteBranch("feature/login".to_string()),
        ]
    );
}

#[test]
fn test_bugfix_into_quality_branch() {
    let gateway = gateway_with(&["bugfix/rounding"]);
    let (workflow, commit) = run(&branches("bugfix/rounding", "quality-eu"), &gateway).unwrap();

    assert_eq!(workflow, Workflow::Bugfix);
    assert_eq!(gateway.branch_head("quality-eu"), Some(commit));
}

#[test]
fn test_feature_into_main_is_not_handled() {
    let gateway = gateway_with(&["feature/login"]);
    let err = run(&branches("feature/login", "main"), &gateway).unwrap_err();

    assert!(matches!(err, GitFlowError::NoMatchingWorkflow { .. }));
    assert!(gateway.calls().is_empty());
    assert!(gateway.branch_head("feature/login").is_some());
}

#[test]
fn test_hotfix_reaches_main_and_development() {
    let gateway = gateway_with(&["hotfix/crash"]);
    let (workflow, commit) = run(&branches("hotfix/crash", "main"), &gateway).unwrap();

    assert_eq!(workflow, Workflow::Hotfix);
    assert_eq!(gateway.branch_head("main"), Some(commit));
    assert_ne!(gateway.branch_head("develop").as_deref(), Some("develop-head"));
    assert_eq!(gateway.branch_head("hotfix/crash"), None);
}

#[test]
fn test_unrelated_branch_reports_both_names() {
    let gateway = gateway_with(&["chore/deps"]);
    let err = run(&branches("chore/deps", "develop"), &gateway).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("chore/deps"), "{}", message);
    assert!(message.contains("develop"), "{}", message);
}

#[test]
fn test_release_prefix_wins_over_feature() {
    let set = branches("release/feature/2.0.0", "develop");
    let selected = Dispatcher::default()
        .select(&set, &BranchPrefixes::default())
        .unwrap();
    assert_eq!(selected, Workflow::Release);
}
