//! Token exchange against the identity provider

use hcvss::secrets::{Credentials, SecretsProvider};
use hcvss::Error;
use serde_json::json;

use super::mocks::{credentials, MockHcp, ACCESS_TOKEN};

#[tokio::test]
async fn test_authenticate_success() {
    let hcp = MockHcp::start().await;
    hcp.mock_token().await;

    let token = hcp.client().authenticate(&credentials()).await.unwrap();
    assert_eq!(token.bearer(), ACCESS_TOKEN);
    assert_eq!(token.expires_in, Some(3600));
}

#[tokio::test]
async fn test_authenticate_rejected_credentials() {
    let hcp = MockHcp::start().await;
    hcp.mock_token_response(401, json!({ "error": "invalid_client" })).await;

    let err = hcp.client().authenticate(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_authenticate_without_access_token() {
    let hcp = MockHcp::start().await;
    hcp.mock_token_response(200, json!({ "token_type": "Bearer" })).await;

    let err = hcp.client().authenticate(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(err.to_string().contains("No access token found in the response"));
}

#[tokio::test]
async fn test_authenticate_error_does_not_leak_client_secret() {
    let hcp = MockHcp::start().await;
    hcp.mock_token_response(400, json!({ "error": "invalid_request" })).await;

    let err = hcp.client().authenticate(&credentials()).await.unwrap_err();
    assert!(!err.to_string().contains(super::mocks::CLIENT_SECRET));
    assert!(!format!("{:?}", err).contains(super::mocks::CLIENT_SECRET));
}

#[tokio::test]
async fn test_authenticate_rejects_empty_credentials_without_request() {
    let hcp = MockHcp::start().await;

    let err = hcp.client().authenticate(&Credentials::new("", "")).await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
    assert!(hcp.server.received_requests().await.unwrap_or_default().is_empty());
}
