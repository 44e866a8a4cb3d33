use std::time::Duration;

use folio::api::{Credential, DataError, DataSource, GraphqlClient, queries};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

const ENDPOINT: &str = "/v1/graphql";

fn client_for(server: &MockServer) -> GraphqlClient {
    GraphqlClient::new(format!("{}{}", server.uri(), ENDPOINT), Duration::from_secs(5))
}

fn token() -> Credential {
    Credential::new("test-token")
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Success
// ============================================================================

#[tokio::test]
async fn test_query_returns_data_object() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": { "me": [{ "id": 7, "username": "reader" }] }
        })),
    )
    .await;

    let data = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap();
    assert_eq!(data["me"][0]["username"], "reader");
}

#[tokio::test]
async fn test_request_carries_bearer_token_and_operation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "operationName": "UserBooks",
            "variables": { "limit": 25, "offset": 50 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "user_books": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = client_for(&server)
        .query(&token(), &queries::user_books(7, None, 25, 50))
        .await
        .unwrap();
    assert_eq!(data["user_books"], json!([]));
}

#[tokio::test]
async fn test_prefixed_token_is_not_doubled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer already-prefixed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .query(&Credential::new("Bearer already-prefixed"), &queries::me())
        .await;
    assert!(result.is_ok());
}

// ============================================================================
// HTTP Errors
// ============================================================================

#[tokio::test]
async fn test_401_is_unauthorized() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(401).set_body_string("invalid token")).await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert_eq!(err, DataError::Unauthorized("invalid token".into()));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_429_is_rate_limited() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(429)).await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert_eq!(err, DataError::RateLimited);
}

#[tokio::test]
async fn test_500_is_server_error() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(500).set_body_string("boom")).await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Server { status: 500, ref message } if message == "boom"));
}

// ============================================================================
// GraphQL Errors
// ============================================================================

#[tokio::test]
async fn test_graphql_error_is_server_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "field 'nope' not found" }]
        })),
    )
    .await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Server { status: 200, ref message } if message.contains("nope")));
}

#[tokio::test]
async fn test_graphql_jwt_error_is_unauthorized() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{
                "message": "Could not verify JWT: JWTExpired",
                "extensions": { "code": "invalid-jwt" }
            }]
        })),
    )
    .await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_missing_data_is_parse_error() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Parse(_)));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

    let err = client_for(&server)
        .query(&token(), &queries::me())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Parse(_)));
}
