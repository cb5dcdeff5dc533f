//! Attribute declaration and mapped attribute values.
//!
//! An [`AttributeConfig`] is declared once at model-definition time and is
//! immutable afterwards. It names the GraphQL source path a value is read
//! from, the declared type it is coerced to, and the defaulting/transform
//! pipeline applied during mapping.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;

use crate::query::camel_case;

/// A value-level transform applied to the raw (already-defaulted) JSON
/// value during mapping.
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The declared type an attribute's value is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Pass through `to_string`.
    String,
    /// Parse numerically; unparseable values coerce to zero.
    Integer,
    /// Parse numerically; unparseable values coerce to zero.
    Float,
    /// Literal `true` or `"true"` is true, everything else is false.
    Boolean,
    /// ISO-8601 parse, falling back to the raw string on failure.
    DateTime,
    /// Identity; the JSON value is kept as-is.
    Json,
}

/// A single declared attribute on a model.
///
/// # Example
///
/// ```rust
/// use shopify_orm::schema::{AttributeConfig, AttributeKind};
///
/// let attr = AttributeConfig::new("total_price", AttributeKind::Float)
///     .path("totalPriceSet.shopMoney.amount")
///     .not_null();
/// assert_eq!(attr.source_path(), "totalPriceSet.shopMoney.amount");
/// assert!(!attr.nullable());
/// ```
#[derive(Clone)]
pub struct AttributeConfig {
    name: String,
    path: String,
    kind: AttributeKind,
    nullable: bool,
    default: Option<Value>,
    transform: Option<Transform>,
    raw: Option<String>,
}

impl AttributeConfig {
    /// Declares an attribute. The source path defaults to the lowerCamelCase
    /// form of the name; attributes are nullable unless marked otherwise.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        let name = name.into();
        let path = camel_case(&name);
        Self {
            name,
            path,
            kind,
            nullable: true,
            default: None,
            transform: None,
            raw: None,
        }
    }

    /// Overrides the source path. Dotted paths dig through nested objects.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Declares the attribute non-nullable. Mapping a null value then
    /// becomes a reportable error.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets a default substituted when the raw value is null.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets a transform applied to the already-defaulted value.
    #[must_use]
    pub fn transform(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Supplies a raw GraphQL selection for this attribute instead of the
    /// generated field. The first dotted segment of the path is treated as
    /// the selection's alias during mapping.
    #[must_use]
    pub fn raw_graphql(mut self, selection: impl Into<String>) -> Self {
        self.raw = Some(selection.into());
        self
    }

    /// The declared attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source path the value is read from.
    #[must_use]
    pub fn source_path(&self) -> &str {
        &self.path
    }

    /// The declared type.
    #[must_use]
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Whether null is an acceptable mapped value.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// The configured default, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The configured transform, if any.
    #[must_use]
    pub const fn transform_fn(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// The raw GraphQL selection, if any.
    #[must_use]
    pub fn raw_selection(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl fmt::Debug for AttributeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeConfig")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .field("raw", &self.raw)
            .finish()
    }
}

/// A mapped attribute value after type coercion.
///
/// Arrays bypass scalar coercion entirely, regardless of the declared
/// kind, and keep their raw JSON elements. Values serialize untagged, so
/// a serialized record reads like plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Null (only stored for nullable attributes).
    Null,
    /// A string value.
    String(String),
    /// An integer value.
    Integer(i64),
    /// A float value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A parsed ISO-8601 datetime.
    DateTime(DateTime<FixedOffset>),
    /// An uncoerced JSON value.
    Json(Value),
    /// A JSON array, elements kept raw.
    Array(Vec<Value>),
}

impl AttributeValue {
    /// Returns `true` for [`AttributeValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer value, if this is an integer.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// The float value, if this is a float.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The datetime value, if this is a parsed datetime.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_defaults_to_camel_case_of_name() {
        let attr = AttributeConfig::new("display_name", AttributeKind::String);
        assert_eq!(attr.source_path(), "displayName");
    }

    #[test]
    fn test_explicit_path_overrides_default() {
        let attr = AttributeConfig::new("total_price", AttributeKind::Float)
            .path("totalPriceSet.shopMoney.amount");
        assert_eq!(attr.source_path(), "totalPriceSet.shopMoney.amount");
    }

    #[test]
    fn test_attributes_are_nullable_by_default() {
        let attr = AttributeConfig::new("note", AttributeKind::String);
        assert!(attr.nullable());
        assert!(!attr.clone().not_null().nullable());
    }

    #[test]
    fn test_default_and_transform_are_stored() {
        let attr = AttributeConfig::new("tags", AttributeKind::Json)
            .default(json!([]))
            .transform(|v| v);
        assert_eq!(attr.default_value(), Some(&json!([])));
        assert!(attr.transform_fn().is_some());
    }

    #[test]
    fn test_debug_output_masks_transform() {
        let attr = AttributeConfig::new("tags", AttributeKind::Json).transform(|v| v);
        let debug = format!("{attr:?}");
        assert!(debug.contains("<fn>"));
    }

    #[test]
    fn test_attribute_value_accessors() {
        assert_eq!(AttributeValue::Integer(3).as_i64(), Some(3));
        assert_eq!(AttributeValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(AttributeValue::Boolean(true).as_bool(), Some(true));
        assert_eq!(AttributeValue::String("x".to_string()).as_str(), Some("x"));
        assert!(AttributeValue::Null.is_null());
    }
}
