//! GraphQL argument rendering.
//!
//! Arguments keep their insertion order and render to a `(name: value, …)`
//! list. The formatting rules are load-bearing for wire compatibility:
//!
//! - integers and booleans render unquoted
//! - strings are quoted **only** for the fixed set of argument names known
//!   to need quoting (`query`, `after`, `before`), with embedded quotes
//!   escaped
//! - every other value falls back to its string form, unquoted
//! - null/absent values are omitted entirely, never rendered as `null`
//! - argument names are converted to lowerCamelCase

use serde_json::Value;

/// Argument names whose string values are rendered quoted.
const QUOTED_ARGUMENTS: [&str; 3] = ["query", "after", "before"];

/// An ordered list of GraphQL arguments.
///
/// # Example
///
/// ```rust
/// use shopify_orm::query::Arguments;
/// use serde_json::json;
///
/// let mut args = Arguments::new();
/// args.push("first", json!(10));
/// args.push("after", json!("abc"));
/// args.push("query", json!("status:open"));
/// args.push("before", json!(null));
/// assert_eq!(args.render(), r#"(first: 10, after: "abc", query: "status:open")"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments(Vec<(String, Value)>);

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument. Null values are kept here and dropped at render
    /// time, so callers can push optional values unconditionally.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.0.push((name.into(), value));
    }

    /// Returns `true` if no argument would render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, v)| v.is_null())
    }

    /// Renders the argument list, including the surrounding parentheses.
    ///
    /// Returns an empty string when every argument is null or the list is
    /// empty, so the result can be appended to a field name directly.
    #[must_use]
    pub fn render(&self) -> String {
        let rendered: Vec<String> = self
            .0
            .iter()
            .filter_map(|(name, value)| {
                let name = camel_case(name);
                render_value(&name, value).map(|v| format!("{name}: {v}"))
            })
            .collect();

        if rendered.is_empty() {
            String::new()
        } else {
            format!("({})", rendered.join(", "))
        }
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Arguments {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Renders a single argument value, or `None` for null.
fn render_value(name: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            if QUOTED_ARGUMENTS.contains(&name) {
                Some(format!("\"{}\"", s.replace('"', "\\\"")))
            } else {
                Some(s.clone())
            }
        }
        other => Some(other.to_string()),
    }
}

/// Converts a snake_case name to lowerCamelCase.
///
/// Names without underscores pass through unchanged, so already-camel
/// GraphQL names are safe to feed back in.
#[must_use]
pub fn camel_case(name: &str) -> String {
    let mut parts = name.split('_');
    let mut out = String::with_capacity(name.len());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        let mut chars = part.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
