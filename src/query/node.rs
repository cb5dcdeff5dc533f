//! The query node AST.
//!
//! Every GraphQL document this crate sends is assembled from [`QueryNode`]
//! values. Each node renders itself to a document fragment via
//! [`render`](QueryNode::render), a pure function of its own state and
//! children; no node performs I/O. Trees are built fresh per query and
//! discarded after rendering.
//!
//! Composite variants cover the shapes the ORM needs: single-record and
//! viewer-style root queries, paginated connections at the root or nested
//! under a parent record, fragments, and a raw escape hatch for selections
//! the AST cannot otherwise express.
//!
//! # Example
//!
//! ```rust
//! use shopify_orm::query::{Arguments, QueryNode};
//!
//! let field = QueryNode::field("displayName");
//! assert_eq!(field.render(), "displayName");
//!
//! let aliased = QueryNode::aliased_field("name", "displayName");
//! assert_eq!(aliased.render(), "name: displayName");
//! ```

use crate::query::Arguments;

/// The standard pageInfo selection rendered by connection nodes.
const PAGE_INFO_BLOCK: &str =
    "pageInfo { hasNextPage hasPreviousPage startCursor endCursor }";

/// A node in a GraphQL query document.
///
/// Parent nodes exclusively own their children; the tree is acyclic.
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// A plain field selection: `alias: name(args) { children }`.
    ///
    /// The alias is emitted only when it differs from the field name.
    Field {
        /// The GraphQL field name.
        name: String,
        /// Optional alias for the selection.
        alias: Option<String>,
        /// Field arguments.
        arguments: Arguments,
        /// Child selections; empty for leaf fields.
        children: Vec<QueryNode>,
    },

    /// A paginated connection selection usable inside another node.
    ///
    /// Renders `alias: field(args) { pageInfo {…} nodes { children } }`;
    /// the pageInfo block is optional.
    Connection {
        /// The connection field name.
        field: String,
        /// Optional alias for the selection.
        alias: Option<String>,
        /// Connection arguments (`first`, `after`, `query`, …).
        arguments: Arguments,
        /// Selections applied to each node of the connection.
        children: Vec<QueryNode>,
        /// Whether to include the pageInfo block.
        page_info: bool,
    },

    /// A root-level connection query document.
    ///
    /// With `singular` set, renders a single nested object selection
    /// instead of a paginated `nodes` wrapper.
    RootConnection {
        /// The root query field name.
        field: String,
        /// Connection arguments.
        arguments: Arguments,
        /// Selections applied to each node.
        children: Vec<QueryNode>,
        /// Whether to include the pageInfo block.
        page_info: bool,
        /// One-to-one rendering: no pageInfo, no nodes wrapper.
        singular: bool,
    },

    /// A connection queried through a parent record.
    ///
    /// Renders a document fetching the parent by `$id` and selecting one
    /// of its relationship fields.
    NestedConnection {
        /// The parent's root query field name.
        parent_field: String,
        /// The connection field on the parent.
        field: String,
        /// Optional alias for the connection selection.
        alias: Option<String>,
        /// Connection arguments.
        arguments: Arguments,
        /// Selections applied to each node.
        children: Vec<QueryNode>,
        /// Whether to include the pageInfo block.
        page_info: bool,
        /// One-to-one rendering: no pageInfo, no nodes wrapper.
        singular: bool,
    },

    /// A root query for one record keyed by an `$id` variable.
    SingleRecord {
        /// The root query field name.
        field: String,
        /// Selections on the record.
        children: Vec<QueryNode>,
    },

    /// A viewer-style root query with no identifying argument.
    CurrentCustomer {
        /// The root query field name.
        field: String,
        /// Selections on the record.
        children: Vec<QueryNode>,
    },

    /// A one-to-one nested object selection: `alias: field(args) { children }`.
    Singular {
        /// The field name.
        field: String,
        /// Optional alias for the selection.
        alias: Option<String>,
        /// Field arguments.
        arguments: Arguments,
        /// Selections on the object.
        children: Vec<QueryNode>,
    },

    /// A named fragment declaration: `fragment Name on Type { children }`.
    ///
    /// Fragments are emitted once per document and referenced by name;
    /// deduplication is the document assembler's responsibility, not the
    /// node's.
    Fragment {
        /// The fragment name.
        name: String,
        /// The GraphQL type the fragment applies to.
        type_name: String,
        /// The fragment's selections.
        children: Vec<QueryNode>,
    },

    /// An inline fragment: `... on Type { children }`.
    InlineFragment {
        /// The GraphQL type the fragment applies to.
        type_name: String,
        /// The fragment's selections.
        children: Vec<QueryNode>,
    },

    /// Verbatim GraphQL text, rendered exactly as provided. No validation.
    Raw(String),
}

impl QueryNode {
    /// Creates a leaf field selection with no alias or arguments.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            alias: None,
            arguments: Arguments::new(),
            children: Vec::new(),
        }
    }

    /// Creates a leaf field selection with an alias.
    #[must_use]
    pub fn aliased_field(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Field {
            name: name.into(),
            alias: Some(alias.into()),
            arguments: Arguments::new(),
            children: Vec::new(),
        }
    }

    /// Creates a field selection with children.
    #[must_use]
    pub fn object(name: impl Into<String>, children: Vec<QueryNode>) -> Self {
        Self::Field {
            name: name.into(),
            alias: None,
            arguments: Arguments::new(),
            children,
        }
    }

    /// Renders this node to GraphQL document text.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Field {
                name,
                alias,
                arguments,
                children,
            } => {
                let head = render_head(name, alias.as_deref(), arguments);
                if children.is_empty() {
                    head
                } else {
                    format!("{head} {{ {} }}", render_children(children))
                }
            }
            Self::Connection {
                field,
                alias,
                arguments,
                children,
                page_info,
            } => {
                let head = render_head(field, alias.as_deref(), arguments);
                format!(
                    "{head} {{ {} }}",
                    connection_body(children, *page_info)
                )
            }
            Self::RootConnection {
                field,
                arguments,
                children,
                page_info,
                singular,
            } => {
                let head = render_head(field, None, arguments);
                if *singular {
                    format!("query {{ {head} {{ {} }} }}", render_children(children))
                } else {
                    format!(
                        "query {{ {head} {{ {} }} }}",
                        connection_body(children, *page_info)
                    )
                }
            }
            Self::NestedConnection {
                parent_field,
                field,
                alias,
                arguments,
                children,
                page_info,
                singular,
            } => {
                let head = render_head(field, alias.as_deref(), arguments);
                let inner = if *singular {
                    format!("{head} {{ {} }}", render_children(children))
                } else {
                    format!("{head} {{ {} }}", connection_body(children, *page_info))
                };
                format!("query($id: ID!) {{ {parent_field}(id: $id) {{ {inner} }} }}")
            }
            Self::SingleRecord { field, children } => {
                format!(
                    "query($id: ID!) {{ {field}(id: $id) {{ {} }} }}",
                    render_children(children)
                )
            }
            Self::CurrentCustomer { field, children } => {
                format!("query {{ {field} {{ {} }} }}", render_children(children))
            }
            Self::Singular {
                field,
                alias,
                arguments,
                children,
            } => {
                let head = render_head(field, alias.as_deref(), arguments);
                format!("{head} {{ {} }}", render_children(children))
            }
            Self::Fragment {
                name,
                type_name,
                children,
            } => {
                format!(
                    "fragment {name} on {type_name} {{ {} }}",
                    render_children(children)
                )
            }
            Self::InlineFragment {
                type_name,
                children,
            } => {
                format!("... on {type_name} {{ {} }}", render_children(children))
            }
            Self::Raw(text) => text.clone(),
        }
    }
}

/// Renders `alias: name(args)`, omitting the alias when it matches the name.
fn render_head(name: &str, alias: Option<&str>, arguments: &Arguments) -> String {
    let args = arguments.render();
    match alias {
        Some(a) if a != name => format!("{a}: {name}{args}"),
        _ => format!("{name}{args}"),
    }
}

fn render_children(children: &[QueryNode]) -> String {
    children
        .iter()
        .map(QueryNode::render)
        .collect::<Vec<_>>()
        .join(" ")
}

fn connection_body(children: &[QueryNode], page_info: bool) -> String {
    let nodes = format!("nodes {{ {} }}", render_children(children));
    if page_info {
        format!("{PAGE_INFO_BLOCK} {nodes}")
    } else {
        nodes
    }
}
