//! Connection (relationship) declaration.

use serde_json::Value;

use crate::query::camel_case;

/// A declared relationship between two model types.
///
/// The target is named rather than referenced so mutually-related schemas
/// can be registered independently; names resolve through the
/// [`Registry`](crate::schema::Registry) at query and mapping time.
///
/// # Example
///
/// ```rust
/// use shopify_orm::schema::ConnectionConfig;
///
/// let conn = ConnectionConfig::has_many("line_items", "LineItem")
///     .nested()
///     .inverse_of("order");
/// assert_eq!(conn.query_field(), "lineItems");
/// assert!(!conn.singular());
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    name: String,
    target: String,
    query_field: String,
    default_arguments: Vec<(String, Value)>,
    nested: bool,
    singular: bool,
    inverse_of: Option<String>,
}

impl ConnectionConfig {
    /// Declares a has-many connection. The query field defaults to the
    /// lowerCamelCase form of the name.
    #[must_use]
    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        let query_field = camel_case(&name);
        Self {
            name,
            target: target.into(),
            query_field,
            default_arguments: Vec::new(),
            nested: false,
            singular: false,
            inverse_of: None,
        }
    }

    /// Declares a has-one connection.
    #[must_use]
    pub fn has_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut conn = Self::has_many(name, target);
        conn.singular = true;
        conn
    }

    /// Overrides the GraphQL field this connection is queried through.
    #[must_use]
    pub fn query_field_name(mut self, field: impl Into<String>) -> Self {
        self.query_field = field.into();
        self
    }

    /// Marks the connection as queried through its parent record rather
    /// than through a root-level field.
    #[must_use]
    pub const fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    /// Adds a default argument applied whenever the connection is queried.
    #[must_use]
    pub fn default_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.default_arguments.push((name.into(), value));
        self
    }

    /// Names the connection on the target type that points back at this
    /// model. During eager loading, each related record's cache is seeded
    /// with the parent under that name.
    #[must_use]
    pub fn inverse_of(mut self, name: impl Into<String>) -> Self {
        self.inverse_of = Some(name.into());
        self
    }

    /// The declared connection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target model type name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The GraphQL field the connection is queried through.
    #[must_use]
    pub fn query_field(&self) -> &str {
        &self.query_field
    }

    /// Default arguments applied whenever the connection is queried.
    #[must_use]
    pub fn default_arguments(&self) -> &[(String, Value)] {
        &self.default_arguments
    }

    /// Whether the connection is queried through its parent record.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.nested
    }

    /// Whether the relationship is one-to-one.
    #[must_use]
    pub const fn singular(&self) -> bool {
        self.singular
    }

    /// The declared inverse connection name, if any.
    #[must_use]
    pub fn inverse(&self) -> Option<&str> {
        self.inverse_of.as_deref()
    }
}
