use hcvss::cli::check::{check_against_file, check_against_provider};
use hcvss::cli::fetch::fetch_and_save;
use hcvss::cli::output::{render_check_table, render_json};
use hcvss::integrity::{LengthPolicy, SecretSnapshot};
use serde_json::json;

use super::support::{hcp_with_baseline, static_secret, MockHcp, Workspace};

#[tokio::test]
async fn check_after_fetch_is_clean() {
    let hcp = hcp_with_baseline().await;
    let workspace = Workspace::new();
    let config = hcp.config();
    let client = hcp.client();

    fetch_and_save(&client, &config, &workspace.snapshot_path()).await.unwrap();
    let report = check_against_provider(&client, &config, &workspace.snapshot_path(), &LengthPolicy::default())
        .await
        .unwrap();

    assert!(!report.diff.has_drift());
    assert_eq!(report.diff.unchanged, 2);
    assert!(report.violations.is_empty());
    assert!(report.passed());
    assert_eq!(report.current_source, "hcp:test-org/test-project/test-app");
}

#[tokio::test]
async fn check_reports_drift_against_live_secrets() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([
        static_secret("db_password", "rotated-horse-battery-staple", 4),
        static_secret("webhook_secret", "whsec_abcdefghijklmnopqrstuvwxyz", 1),
    ]))
    .await;

    let workspace = Workspace::new();
    SecretSnapshot::from_values([
        ("db_password", "correct-horse-battery-staple"),
        ("api_key", "sk_live_0123456789abcdef"),
    ])
    .unwrap()
    .save(&workspace.snapshot_path())
    .unwrap();

    let report = check_against_provider(
        &hcp.client(),
        &hcp.config(),
        &workspace.snapshot_path(),
        &LengthPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.diff.added.iter().collect::<Vec<_>>(), vec!["webhook_secret"]);
    assert_eq!(report.diff.removed.iter().collect::<Vec<_>>(), vec!["api_key"]);
    assert_eq!(report.diff.changed.iter().collect::<Vec<_>>(), vec!["db_password"]);
    assert!(!report.passed());

    let table = render_check_table(&report);
    assert!(table.contains("changed    db_password"));
    assert!(!table.contains("rotated-horse-battery-staple"));
    assert!(table.ends_with("Result: FAILED\n"));
}

#[tokio::test]
async fn check_without_snapshot_reports_everything_added() {
    let hcp = hcp_with_baseline().await;
    let workspace = Workspace::new();

    let report = check_against_provider(
        &hcp.client(),
        &hcp.config(),
        &workspace.snapshot_path(),
        &LengthPolicy::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.diff.added.len(), 2);
    assert!(report.previous_captured_at.is_none());
    assert!(!report.passed());
}

#[tokio::test]
async fn check_with_corrupt_snapshot_fails() {
    let hcp = hcp_with_baseline().await;
    let workspace = Workspace::new();
    std::fs::write(workspace.snapshot_path(), "{ not json").unwrap();

    let err = check_against_provider(
        &hcp.client(),
        &hcp.config(),
        &workspace.snapshot_path(),
        &LengthPolicy::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, hcvss::Error::Serialization { .. }));
    assert!(err.to_string().contains("hcvss-snapshot.json"));
}

#[tokio::test]
async fn check_propagates_provider_authentication_failure() {
    let hcp = MockHcp::start().await;
    hcp.mock_token_response(401, json!({ "error": "invalid_client" })).await;
    let workspace = Workspace::new();

    let err = check_against_provider(
        &hcp.client(),
        &hcp.config(),
        &workspace.snapshot_path(),
        &LengthPolicy::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, hcvss::Error::Authentication { .. }));
}

#[test]
fn offline_check_flags_short_values_without_drift() {
    let workspace = Workspace::new();
    let snapshot = SecretSnapshot::from_values([
        ("short", "short"),
        ("also_short", "also_short"),
        ("long", "this_is_long_enough_secret"),
    ])
    .unwrap();
    snapshot.save(&workspace.path("previous.json")).unwrap();
    snapshot.save(&workspace.path("current.json")).unwrap();

    let report = check_against_file(
        &workspace.path("previous.json"),
        &workspace.path("current.json"),
        &LengthPolicy::default(),
    )
    .unwrap();

    assert!(!report.diff.has_drift());
    assert_eq!(report.violations.len(), 2);
    assert!(!report.passed());

    let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
    assert_eq!(json["violations"][0]["name"], "also_short");
    assert_eq!(json["violations"][1]["length"], 5);
}
