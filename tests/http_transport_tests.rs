//! Integration tests for the reqwest-backed GraphQL transport, using a
//! local mock server.

use serde_json::json;
use shopify_orm::client::{GraphqlTransport, HttpTransport, TransportError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer) -> String {
    format!("{}/admin/api/2024-04/graphql.json", server.uri())
}

#[tokio::test]
async fn test_execute_posts_query_and_variables_with_the_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-04/graphql.json"))
        .and(header("X-Shopify-Access-Token", "test-token"))
        .and(body_partial_json(json!({
            "query": "query { shop { name } }",
            "variables": {}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "name": "Test Shop" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(endpoint(&server), "test-token");
    let body = transport
        .execute("query { shop { name } }", json!({}))
        .await
        .unwrap();

    assert_eq!(body["data"]["shop"]["name"], "Test Shop");
}

#[tokio::test]
async fn test_non_success_status_carries_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Throttled"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(endpoint(&server), "test-token");
    let error = transport
        .execute("query { shop { name } }", json!({}))
        .await
        .unwrap_err();

    let TransportError::Status { code, message } = error else {
        panic!("expected a status error, got {error:?}");
    };
    assert_eq!(code, 429);
    assert_eq!(message, "Throttled");
}

#[tokio::test]
async fn test_malformed_body_is_an_invalid_body_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(endpoint(&server), "test-token");
    let error = transport
        .execute("query { shop { name } }", json!({}))
        .await
        .unwrap_err();

    assert!(matches!(error, TransportError::InvalidBody(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_network_error() {
    let transport = HttpTransport::new("http://127.0.0.1:1/graphql.json", "test-token");
    let error = transport
        .execute("query { shop { name } }", json!({}))
        .await
        .unwrap_err();

    assert!(matches!(error, TransportError::Network(_)));
}
