//! Query construction: the node AST, argument formatting, search-query
//! building, eager-load include paths, and document assembly.
//!
//! Everything in this module is pure string building over in-memory
//! state; execution lives behind [`crate::client::GraphqlTransport`].

mod arguments;
pub mod document;
mod node;
mod search;

pub use arguments::{camel_case, Arguments};
pub use node::QueryNode;
pub use search::Conditions;

/// An eager-load selection: a connection name plus nested sub-selections.
///
/// Parsed from dotted paths, so `"line_items.product"` requests the
/// `line_items` connection and, on each related record, its `product`
/// connection.
///
/// # Example
///
/// ```rust
/// use shopify_orm::query::Include;
///
/// let includes = Include::list(&["line_items.product", "customer"]);
/// assert_eq!(includes.len(), 2);
/// assert_eq!(includes[0].name, "line_items");
/// assert_eq!(includes[0].children[0].name, "product");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// The declared connection name.
    pub name: String,
    /// Nested sub-selections on the related records.
    pub children: Vec<Include>,
}

impl Include {
    /// Parses a dotted include path.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let mut segments = path.split('.');
        let name = segments.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = segments.collect();
        let children = if rest.is_empty() {
            Vec::new()
        } else {
            vec![Self::parse(&rest.join("."))]
        };
        Self { name, children }
    }

    /// Parses a list of dotted include paths, merging duplicate heads.
    #[must_use]
    pub fn list(paths: &[&str]) -> Vec<Self> {
        let mut out: Vec<Self> = Vec::new();
        for path in paths {
            let parsed = Self::parse(path);
            if let Some(existing) = out.iter_mut().find(|i| i.name == parsed.name) {
                existing.children.extend(parsed.children);
            } else {
                out.push(parsed);
            }
        }
        out
    }
}
