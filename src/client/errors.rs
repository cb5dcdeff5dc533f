//! Transport-level error types.
//!
//! These cover everything that can go wrong between rendering a query
//! document and receiving a parsed JSON body: network failures, non-2xx
//! statuses, and unparseable bodies. GraphQL-level `errors` arrays are not
//! a transport concern; the core surfaces those separately as
//! [`OrmError::Graphql`](crate::OrmError::Graphql).

use thiserror::Error;

/// Error type for GraphQL transport operations.
///
/// # Example
///
/// ```rust
/// use shopify_orm::client::TransportError;
///
/// let error = TransportError::Status {
///     code: 500,
///     message: "Internal Server Error".to_string(),
/// };
/// assert!(error.to_string().contains("500"));
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// A network-level failure from the HTTP client.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint returned a non-success HTTP status.
    ///
    /// GraphQL endpoints usually answer 200 even for query errors, so this
    /// indicates an endpoint, authorization, or throttling problem.
    #[error("GraphQL endpoint returned HTTP {code}: {message}")]
    Status {
        /// The HTTP status code.
        code: u16,
        /// The response body, verbatim.
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("response body was not valid JSON: {0}")]
    InvalidBody(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_includes_code_and_body() {
        let error = TransportError::Status {
            code: 429,
            message: "Throttled".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("Throttled"));
    }

    #[test]
    fn test_invalid_body_error_message() {
        let error = TransportError::InvalidBody("expected value at line 1".to_string());
        assert!(error.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = TransportError::InvalidBody("oops".to_string());
        let _: &dyn std::error::Error = &error;
    }
}
