//! Error types for the ORM core.
//!
//! This module contains the error taxonomy used throughout the crate:
//! configuration problems, illegal API usage, response-mapping failures,
//! and the [`OrmError`] umbrella returned by query-issuing operations.
//!
//! # Error Handling
//!
//! Each concern has its own enum so callers can match on exactly the
//! failures they can handle. [`OrmError`] wraps the narrower enums via
//! `#[error(transparent)]`, so `?` works across the layers.
//!
//! # Example
//!
//! ```rust
//! use shopify_orm::{ConfigError, OrmError};
//!
//! let error = OrmError::NotFound {
//!     resource: "Order".to_string(),
//!     id: "gid://shopify/Order/123".to_string(),
//! };
//! assert!(error.to_string().contains("Order"));
//!
//! let error = ConfigError::UnknownModel { model: "Widget".to_string() };
//! assert!(error.to_string().contains("Widget"));
//! ```

use thiserror::Error;

use crate::client::TransportError;

/// Errors that can occur while configuring a loader or model schema.
///
/// These are fatal and surfaced before any query executes. They are never
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No GraphQL transport was supplied to the loader builder.
    #[error("No GraphQL transport configured. Provide one with LoaderBuilder::transport before building.")]
    MissingTransport,

    /// No model registry was supplied to the loader builder.
    #[error("No model registry configured. Provide one with LoaderBuilder::registry before building.")]
    MissingRegistry,

    /// A model type name was not found in the registry.
    #[error("Unknown model type '{model}'. Register its schema before querying.")]
    UnknownModel {
        /// The type name that was requested.
        model: String,
    },

    /// The named schema is not a metaobject definition.
    #[error("'{model}' is not a metaobject definition")]
    NotAMetaobject {
        /// The type name that was requested.
        model: String,
    },

    /// The named schema is not a viewer-style (current customer) model.
    #[error("'{model}' is not a viewer-style model and cannot be fetched without an id")]
    NotAViewerModel {
        /// The type name that was requested.
        model: String,
    },

    /// The named schema is a metaobject definition and cannot be queried
    /// through type-specific root fields.
    #[error("'{model}' is a metaobject definition; query it through Loader::metaobjects")]
    MetaobjectModel {
        /// The type name that was requested.
        model: String,
    },

    /// A connection name is not declared on the model it was requested from.
    #[error("'{name}' is not a declared connection on {model}")]
    UnknownConnection {
        /// The connection name that was requested.
        name: String,
        /// The model the connection was requested from.
        model: String,
    },

    /// A one-to-one connection was requested through the collection API.
    #[error("connection '{name}' on {model} is singular; use Loader::related_record")]
    SingularConnection {
        /// The connection name that was requested.
        name: String,
        /// The model the connection was requested from.
        model: String,
    },

    /// A collection connection was requested through the one-to-one API.
    #[error("connection '{name}' on {model} is a collection; use Loader::related")]
    PluralConnection {
        /// The connection name that was requested.
        name: String,
        /// The model the connection was requested from.
        model: String,
    },
}

/// Errors caused by illegal use of the relation API.
///
/// These indicate programmer errors at the call site and are intended to be
/// caught during development, not recovered from at runtime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A second non-empty condition set was chained onto a relation.
    #[error("conditions have already been applied to this relation; combine them in a single filter call")]
    ConditionsAlreadyApplied,

    /// Both an `after` and a `before` cursor were supplied for one fetch.
    #[error("a page fetch accepts either an 'after' or a 'before' cursor, not both")]
    ConflictingCursors,

    /// A global id named a different resource type than the model queried.
    #[error("expected a {expected} global id, got '{found}'")]
    MismatchedGid {
        /// The resource type the relation queries.
        expected: String,
        /// The global id that was supplied.
        found: String,
    },

    /// A record without an id was used as the parent of a nested query.
    #[error("record has no id; fetch it before loading its connections")]
    MissingRecordId,
}

/// Errors raised while mapping a GraphQL response into records.
///
/// Data-shape problems do not self-heal on retry, so these are surfaced
/// once and never retried. The variant names the attribute and its source
/// path to aid debugging.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A non-nullable attribute resolved to null after defaulting and
    /// transforming.
    #[error("attribute '{attribute}' (from '{path}') is not nullable but resolved to null")]
    NullAttribute {
        /// The declared attribute name.
        attribute: String,
        /// The source path the value was read from.
        path: String,
    },
}

/// Unified error type for query-issuing operations.
///
/// # Example
///
/// ```rust
/// use shopify_orm::{OrmError, UsageError};
///
/// fn check(result: Result<(), OrmError>) {
///     match result {
///         Ok(()) => {}
///         Err(OrmError::NotFound { resource, id }) => {
///             println!("{resource} {id} does not exist");
///         }
///         Err(OrmError::Usage(UsageError::ConditionsAlreadyApplied)) => {
///             println!("combine conditions in one filter call");
///         }
///         Err(e) => println!("other error: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum OrmError {
    /// `find` was given a real id that the server reports as absent.
    ///
    /// This is a distinct, catchable condition rather than a silent `None`.
    /// Contrast with `find_by`, which tolerates absence.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The model type name.
        resource: String,
        /// The id that was requested.
        id: String,
    },

    /// The response carried a GraphQL `errors` array and no usable data.
    ///
    /// The errors value is propagated unmodified; the core performs no
    /// retry or backoff.
    #[error("GraphQL response contained errors: {errors}")]
    Graphql {
        /// The untouched `errors` value from the response body.
        errors: serde_json::Value,
    },

    /// A configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An illegal use of the relation API.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// A response-mapping failure.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// A transport-level failure, propagated unmodified.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
