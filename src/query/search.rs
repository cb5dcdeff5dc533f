//! Search/filter query building.
//!
//! Structured conditions are translated into Shopify search syntax
//! (`key:value key2:value2`) for use as a connection's `query:` argument.
//! The rendered string is embedded directly into the document text, so
//! conditions are treated as untrusted-but-structured: embedded double
//! quotes are always escaped before interpolation.

use serde_json::Value;

/// Filter conditions for a relation.
///
/// Raw strings and clause lists pass through unchanged; mappings render
/// as space-joined `key:value` clauses.
///
/// # Example
///
/// ```rust
/// use shopify_orm::query::Conditions;
/// use serde_json::json;
///
/// let conditions = Conditions::map(vec![
///     ("status".to_string(), json!("open")),
///     ("total_price".to_string(), json!(">10")),
/// ]);
/// assert_eq!(
///     conditions.to_search_query().unwrap(),
///     "status:open total_price:>10"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub enum Conditions {
    /// No conditions.
    #[default]
    None,
    /// A raw search string, passed through unchanged.
    Raw(String),
    /// Pre-built clauses, joined with spaces.
    Clauses(Vec<String>),
    /// Structured key/value pairs, rendered as `key:value` clauses in
    /// insertion order.
    Map(Vec<(String, Value)>),
}

impl Conditions {
    /// Creates structured conditions from key/value pairs.
    #[must_use]
    pub fn map(pairs: Vec<(String, Value)>) -> Self {
        Self::Map(pairs)
    }

    /// Creates a raw passthrough condition string.
    #[must_use]
    pub fn raw(query: impl Into<String>) -> Self {
        Self::Raw(query.into())
    }

    /// Returns `true` if no search clause would render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Raw(s) => s.is_empty(),
            Self::Clauses(c) => c.is_empty(),
            Self::Map(m) => m.is_empty(),
        }
    }

    /// Renders the search query string, or `None` when empty.
    #[must_use]
    pub fn to_search_query(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        match self {
            Self::None => None,
            Self::Raw(s) => Some(s.clone()),
            Self::Clauses(clauses) => Some(clauses.join(" ")),
            Self::Map(pairs) => Some(
                pairs
                    .iter()
                    .map(|(key, value)| format!("{key}:{}", clause_value(value)))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}

/// Renders a condition value for interpolation into a search clause.
fn clause_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.replace('"', "\\\""),
        other => other.to_string(),
    }
}
