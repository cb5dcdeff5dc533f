//! Transport boundary for GraphQL query execution.
//!
//! The ORM core never talks HTTP directly. It renders a query document and
//! hands it to a [`GraphqlTransport`], which returns the raw response body
//! as JSON. This keeps the core synchronous-per-request and free of retry,
//! rate-limit, and authentication concerns, which belong to the transport.
//!
//! A reqwest-backed implementation, [`HttpTransport`], is provided for the
//! Admin GraphQL endpoint. Tests typically supply an in-process transport
//! returning canned bodies.
//!
//! # Example
//!
//! ```rust
//! use shopify_orm::client::{GraphqlTransport, TransportError};
//! use serde_json::{json, Value};
//!
//! struct Canned(Value);
//!
//! impl GraphqlTransport for Canned {
//!     async fn execute(&self, _query: &str, _variables: Value) -> Result<Value, TransportError> {
//!         Ok(self.0.clone())
//!     }
//! }
//!
//! let transport = Canned(json!({"data": {"shop": {"name": "demo"}}}));
//! # let _ = transport;
//! ```

mod errors;
mod http;

pub use errors::TransportError;
pub use http::HttpTransport;

use serde_json::Value;

/// Executes GraphQL documents against an API endpoint.
///
/// Implementations must return a JSON body with a `data` key (and
/// optionally `errors`). One call to [`execute`](Self::execute) is one
/// blocking request from the core's point of view; the core never overlaps
/// the issuance of one query with the next.
#[allow(async_fn_in_trait)]
pub trait GraphqlTransport {
    /// Executes a GraphQL document with the given variables.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] for network failures, non-success HTTP
    /// statuses, and bodies that are not valid JSON. These propagate to the
    /// caller unmodified; the core performs no retry.
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, TransportError>;
}
