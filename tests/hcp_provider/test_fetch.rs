//! Reading secrets through `secrets:open`

use hcvss::secrets::SecretsProvider;
use hcvss::Error;
use serde_json::json;

use super::mocks::{credentials, scope, static_secret, MockHcp};

#[tokio::test]
async fn test_fetch_single_page() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([
        static_secret("db_password", "correct-horse-battery-staple", 3),
        static_secret("api_key", "short", 1),
    ]))
    .await;

    let snapshot = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["api_key", "db_password"]);
    assert_eq!(snapshot.scope(), Some(&scope()));

    let entry = snapshot.get("db_password").unwrap();
    assert_eq!(entry.value.expose_secret(), "correct-horse-battery-staple");
    assert_eq!(entry.metadata.version, Some(3));
    assert_eq!(
        entry.metadata.created_at.map(|t| t.to_rfc3339()),
        Some("2024-05-02T12:30:00+00:00".to_string())
    );
}

#[tokio::test]
async fn test_fetch_follows_pagination() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_two_pages(
        json!([static_secret("first", "value-on-page-one", 1)]),
        json!([static_secret("second", "value-on-page-two", 2)]),
    )
    .await;

    let snapshot = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap();

    assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["first", "second"]);
    hcp.server.verify().await;
}

#[tokio::test]
async fn test_fetch_pagination_cycle_is_fetch_error() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_page(None, json!([static_secret("first", "value-on-page-one", 1)]), "token-a").await;
    hcp.mock_page(Some("token-a"), json!([static_secret("second", "value-on-page-two", 1)]), "token-b")
        .await;
    hcp.mock_page(Some("token-b"), json!([static_secret("third", "value-on-page-three", 1)]), "token-a")
        .await;

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        hcp.client().fetch_snapshot(&credentials(), &scope()),
    )
    .await
    .expect("pagination cycle must terminate");

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Fetch { status: None, .. }));
    assert!(err.to_string().contains("revisited a page token"));

    let requests = hcp.server.received_requests().await.unwrap_or_default();
    let page_requests = requests.iter().filter(|r| r.method.as_str() == "GET").count();
    assert_eq!(page_requests, 3);
}

#[tokio::test]
async fn test_fetch_empty_application() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([])).await;

    let snapshot = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_fetch_unauthorized_is_authentication_error() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets_status(401).await;

    let err = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn test_fetch_server_error_is_fetch_error() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets_status(500).await;

    let err = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap_err();
    match err {
        Error::Fetch { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.contains("upstream says no"));
        }
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_null_value_is_invalid_snapshot() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([
        static_secret("fine", "a-perfectly-fine-value", 1),
        { "name": "broken", "static_version": { "version": "1", "value": null } },
    ]))
    .await;

    let err = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidSnapshot { .. }));
    assert_eq!(err.secret_name(), Some("broken"));
}

#[tokio::test]
async fn test_fetch_rotating_secret_is_invalid_snapshot() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([{ "name": "rotating", "type": "rotating", "latest_version": 4 }])).await;

    let err = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap_err();
    assert_eq!(err.secret_name(), Some("rotating"));
}

#[tokio::test]
async fn test_fetch_duplicate_names_is_invalid_snapshot() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([
        static_secret("twice", "first-value-is-long-enough", 1),
        static_secret("twice", "second-value-is-long-enough", 2),
    ]))
    .await;

    let err = hcp.client().fetch_snapshot(&credentials(), &scope()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidSnapshot { .. }));
    assert_eq!(err.secret_name(), Some("twice"));
}

#[tokio::test]
async fn test_fetch_configured_uses_config_scope() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;
    hcp.mock_secrets(json!([static_secret("only", "value-from-config-scope", 7)])).await;

    let config = hcp.config();
    let snapshot = hcp.client().fetch_configured(&config).await.unwrap();
    assert!(snapshot.contains("only"));
}
