//! Reqwest-backed GraphQL transport.
//!
//! Posts `{query, variables}` bodies to a Shopify GraphQL endpoint with the
//! access-token header. This is the only module in the crate that performs
//! I/O; everything above it works on rendered documents and parsed JSON.

use serde_json::Value;

use crate::client::{GraphqlTransport, TransportError};

/// HTTP transport for a Shopify GraphQL endpoint.
///
/// # Thread Safety
///
/// `HttpTransport` is `Send + Sync`, making it safe to share across async
/// tasks (typically behind an `Arc`).
///
/// # Example
///
/// ```rust
/// use shopify_orm::client::HttpTransport;
///
/// let transport = HttpTransport::new(
///     "https://my-store.myshopify.com/admin/api/2025-10/graphql.json",
///     "access-token",
/// );
/// # let _ = transport;
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

// Verify HttpTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpTransport>();
};

impl HttpTransport {
    /// Creates a transport for the given endpoint URL and access token.
    ///
    /// The endpoint is used verbatim; build it from your shop domain and
    /// API version, e.g.
    /// `https://{shop}.myshopify.com/admin/api/{version}/graphql.json`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            access_token: access_token.into(),
        }
    }

    /// Returns the endpoint URL this transport posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GraphqlTransport for HttpTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables
        });

        tracing::debug!(endpoint = %self.endpoint, "executing GraphQL query");

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let code = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&code) {
            return Err(TransportError::Status {
                code,
                message: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_stores_endpoint_verbatim() {
        let transport = HttpTransport::new("https://example.test/graphql.json", "token");
        assert_eq!(transport.endpoint(), "https://example.test/graphql.json");
    }

    #[test]
    fn test_transport_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTransport>();
    }
}
