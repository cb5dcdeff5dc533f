//! Document assembly: turning a model schema plus eager-load includes
//! into a complete GraphQL document string.
//!
//! Scalar selections for each model type live in a named fragment
//! (`<Type>Fields on <Type>`), referenced by spread wherever the type
//! appears and declared once per document regardless of how many
//! connections reach it. Connection selections are inlined, aliased to
//! their declared name so the mapper can read them back without knowing
//! the underlying query field.
//!
//! # Example
//!
//! ```rust
//! use shopify_orm::query::document::DocumentBuilder;
//! use shopify_orm::schema::{AttributeConfig, AttributeKind, ModelSchema, Registry};
//!
//! let order = ModelSchema::builder("Order")
//!     .attribute(AttributeConfig::new("name", AttributeKind::String))
//!     .build();
//! let mut registry = Registry::new();
//! registry.register(order.clone());
//!
//! let builder = DocumentBuilder::new(&registry, 50);
//! let document = builder.single_record("order", &order, &[]);
//! assert_eq!(
//!     document,
//!     "query($id: ID!) { order(id: $id) { ...OrderFields } } \
//!      fragment OrderFields on Order { id name }"
//! );
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use crate::query::{Arguments, Include, QueryNode};
use crate::schema::{ConnectionConfig, ModelKind, ModelSchema, Registry};

/// Assembles query documents against a schema registry.
///
/// `include_page_size` is the `first` argument applied to eager-loaded
/// connections that declare no page size of their own.
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'a> {
    registry: &'a Registry,
    include_page_size: u32,
}

impl<'a> DocumentBuilder<'a> {
    /// Creates a builder over the given registry.
    #[must_use]
    pub const fn new(registry: &'a Registry, include_page_size: u32) -> Self {
        Self {
            registry,
            include_page_size,
        }
    }

    /// A single-record document keyed by an `$id` variable.
    #[must_use]
    pub fn single_record(
        &self,
        field: &str,
        schema: &Arc<ModelSchema>,
        includes: &[Include],
    ) -> String {
        let mut fragments = BTreeMap::new();
        let root = QueryNode::SingleRecord {
            field: field.to_string(),
            children: self.node_selection(schema, includes, &mut fragments),
        };
        assemble(&root, &fragments)
    }

    /// A viewer-style document with no identifying argument.
    #[must_use]
    pub fn current_record(
        &self,
        field: &str,
        schema: &Arc<ModelSchema>,
        includes: &[Include],
    ) -> String {
        let mut fragments = BTreeMap::new();
        let root = QueryNode::CurrentCustomer {
            field: field.to_string(),
            children: self.node_selection(schema, includes, &mut fragments),
        };
        assemble(&root, &fragments)
    }

    /// A paginated root-connection document.
    #[must_use]
    pub fn root_connection(
        &self,
        field: &str,
        arguments: Arguments,
        schema: &Arc<ModelSchema>,
        includes: &[Include],
    ) -> String {
        let mut fragments = BTreeMap::new();
        let root = QueryNode::RootConnection {
            field: field.to_string(),
            arguments,
            children: self.node_selection(schema, includes, &mut fragments),
            page_info: true,
            singular: false,
        };
        assemble(&root, &fragments)
    }

    /// A document selecting one connection of a parent record fetched by
    /// `$id`. Singular connections render a plain object selection.
    #[must_use]
    pub fn nested_connection(
        &self,
        parent_field: &str,
        conn: &ConnectionConfig,
        arguments: Arguments,
        schema: &Arc<ModelSchema>,
        includes: &[Include],
    ) -> String {
        let mut fragments = BTreeMap::new();
        let root = QueryNode::NestedConnection {
            parent_field: parent_field.to_string(),
            field: conn.query_field().to_string(),
            alias: Some(conn.name().to_string()),
            arguments,
            children: self.node_selection(schema, includes, &mut fragments),
            page_info: !conn.singular(),
            singular: conn.singular(),
        };
        assemble(&root, &fragments)
    }

    /// A document selecting one connection of the viewer record, which is
    /// fetched without an identifying argument.
    #[must_use]
    pub fn viewer_connection(
        &self,
        viewer_field: &str,
        conn: &ConnectionConfig,
        arguments: Arguments,
        schema: &Arc<ModelSchema>,
        includes: &[Include],
    ) -> String {
        let mut fragments = BTreeMap::new();
        let children = self.node_selection(schema, includes, &mut fragments);
        let inner = if conn.singular() {
            QueryNode::Singular {
                field: conn.query_field().to_string(),
                alias: Some(conn.name().to_string()),
                arguments,
                children,
            }
        } else {
            QueryNode::Connection {
                field: conn.query_field().to_string(),
                alias: Some(conn.name().to_string()),
                arguments,
                children,
                page_info: true,
            }
        };
        let root = QueryNode::CurrentCustomer {
            field: viewer_field.to_string(),
            children: vec![inner],
        };
        assemble(&root, &fragments)
    }

    /// The selection for one appearance of a model: the type's scalar
    /// fragment spread plus the requested connection selections. Registers
    /// the fragment declaration, deduplicated by name.
    fn node_selection(
        &self,
        schema: &Arc<ModelSchema>,
        includes: &[Include],
        fragments: &mut BTreeMap<String, QueryNode>,
    ) -> Vec<QueryNode> {
        let fragment_name = format!("{}Fields", schema.name());
        fragments.entry(fragment_name.clone()).or_insert_with(|| {
            QueryNode::Fragment {
                name: fragment_name.clone(),
                type_name: schema.name().to_string(),
                children: scalar_selection(schema),
            }
        });

        let mut selection = vec![QueryNode::Raw(format!("...{fragment_name}"))];
        for include in includes {
            let Some(conn) = schema.connection(&include.name) else {
                continue;
            };
            let Some(target) = self.registry.get(conn.target()) else {
                continue;
            };
            let target = Arc::clone(target);
            selection.push(self.connection_selection(conn, &target, &include.children, fragments));
        }
        selection
    }

    fn connection_selection(
        &self,
        conn: &ConnectionConfig,
        target: &Arc<ModelSchema>,
        children: &[Include],
        fragments: &mut BTreeMap<String, QueryNode>,
    ) -> QueryNode {
        let mut arguments: Arguments = conn
            .default_arguments()
            .iter()
            .cloned()
            .collect();
        let selection = self.node_selection(target, children, fragments);
        if conn.singular() {
            QueryNode::Singular {
                field: conn.query_field().to_string(),
                alias: Some(conn.name().to_string()),
                arguments,
                children: selection,
            }
        } else {
            if !conn
                .default_arguments()
                .iter()
                .any(|(name, _)| name == "first")
            {
                arguments.push("first", json!(self.include_page_size));
            }
            QueryNode::Connection {
                field: conn.query_field().to_string(),
                alias: Some(conn.name().to_string()),
                arguments,
                children: selection,
                page_info: false,
            }
        }
    }
}

/// A single-metaobject document keyed by an `$id` variable.
///
/// Metaobject documents need no registry or fragments, so these are free
/// functions rather than [`DocumentBuilder`] methods.
#[must_use]
pub fn metaobject_by_id(schema: &ModelSchema) -> String {
    let root = QueryNode::SingleRecord {
        field: "metaobject".to_string(),
        children: metaobject_selection(schema),
    };
    root.render()
}

/// A paginated `metaobjects(type: …)` document. Paging and search
/// arguments come from the caller; the type argument is prepended here.
#[must_use]
pub fn metaobjects(schema: &ModelSchema, arguments: Arguments) -> String {
    let mut all = Arguments::new();
    if let ModelKind::Metaobject { metaobject_type } = schema.kind() {
        // `type` is not in the quoted-argument set, so the value is
        // pre-quoted here.
        all.push("type", json!(format!("\"{metaobject_type}\"")));
    }
    for (name, value) in arguments {
        all.push(name, value);
    }
    let root = QueryNode::RootConnection {
        field: "metaobjects".to_string(),
        arguments: all,
        children: metaobject_selection(schema),
        page_info: true,
        singular: false,
    };
    root.render()
}

/// The scalar selections for a model: identity `id` plus every declared
/// attribute. Raw selections pass through verbatim, dotted paths become
/// nested object selections, flat paths are aliased to the attribute name.
fn scalar_selection(schema: &ModelSchema) -> Vec<QueryNode> {
    let mut selection = vec![QueryNode::field("id")];
    for attr in schema.attributes() {
        if let Some(raw) = attr.raw_selection() {
            selection.push(QueryNode::Raw(raw.to_string()));
        } else if attr.source_path().contains('.') {
            let mut segments = attr.source_path().rsplit('.');
            let mut node = QueryNode::field(segments.next().unwrap_or_default());
            for segment in segments {
                node = QueryNode::object(segment, vec![node]);
            }
            selection.push(node);
        } else {
            selection.push(QueryNode::aliased_field(attr.name(), attr.source_path()));
        }
    }
    selection
}

/// The selections for a metaobject node: identity fields, an aliased
/// `field(key: …)` per declared attribute, and the generic `fields` array.
fn metaobject_selection(schema: &ModelSchema) -> Vec<QueryNode> {
    let mut selection = vec![
        QueryNode::field("id"),
        QueryNode::field("handle"),
        QueryNode::field("displayName"),
        QueryNode::field("type"),
    ];
    for attr in schema.attributes() {
        if let Some(raw) = attr.raw_selection() {
            selection.push(QueryNode::Raw(raw.to_string()));
        } else {
            selection.push(QueryNode::Raw(format!(
                "{}: field(key: \"{}\") {{ value }}",
                attr.name(),
                attr.source_path()
            )));
        }
    }
    selection.push(QueryNode::Raw("fields { key value }".to_string()));
    selection
}

/// Renders the root followed by each fragment declaration, each exactly
/// once, in name order.
fn assemble(root: &QueryNode, fragments: &BTreeMap<String, QueryNode>) -> String {
    let mut parts = vec![root.render()];
    parts.extend(fragments.values().map(QueryNode::render));
    parts.join(" ")
}
