//! Model schemas: the static attribute/connection configuration tables
//! the query builder and response mapper are driven by.
//!
//! A [`ModelSchema`] is assembled once through [`ModelSchemaBuilder`] and
//! immutable afterwards. Declaration is two-phase: the base configuration
//! first, then named per-loader overrides, each merged into a complete
//! variant schema at build time (computed once and cached, never
//! recomputed per call). Inheritance is copy-on-inherit: [`extend`]
//! seeds a new builder with copies of the parent's declarations, so
//! subtypes never share mutable state with their parent.
//!
//! Schemas are looked up by type name through a [`Registry`], which is
//! injected explicitly at loader construction; there is no global schema
//! state.
//!
//! [`extend`]: ModelSchema::extend
//!
//! # Example
//!
//! ```rust
//! use shopify_orm::schema::{
//!     AttributeConfig, AttributeKind, ConnectionConfig, ModelSchema, Registry,
//! };
//!
//! let order = ModelSchema::builder("Order")
//!     .attribute(AttributeConfig::new("name", AttributeKind::String))
//!     .attribute(
//!         AttributeConfig::new("total_price", AttributeKind::Float)
//!             .path("totalPriceSet.shopMoney.amount"),
//!     )
//!     .connection(ConnectionConfig::has_many("line_items", "LineItem").nested())
//!     .build();
//!
//! let mut registry = Registry::new();
//! registry.register(order);
//! assert!(registry.get("Order").is_some());
//! ```

mod attribute;
mod connection;
mod gid;

pub use attribute::{AttributeConfig, AttributeKind, AttributeValue, Transform};
pub use connection::ConnectionConfig;
pub use gid::normalize_gid;

use std::collections::HashMap;
use std::sync::Arc;

use crate::query::camel_case;

/// How a model is reached through the GraphQL root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKind {
    /// A type with dedicated root fields (`order`, `orders`).
    Typed {
        /// The singular root query field.
        query_field: String,
        /// The plural (connection) root query field.
        plural_query_field: String,
    },
    /// A viewer-style type fetched with no identifying argument.
    CurrentCustomer {
        /// The root query field.
        query_field: String,
    },
    /// A metaobject definition, queried through the generic
    /// `metaobject`/`metaobjects(type: …)` root fields.
    Metaobject {
        /// The metaobject definition type, e.g. `"faq"`.
        metaobject_type: String,
    },
}

/// The immutable configuration for one model type.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    name: String,
    kind: ModelKind,
    attributes: Vec<AttributeConfig>,
    connections: Vec<ConnectionConfig>,
    loader_variants: HashMap<String, Arc<ModelSchema>>,
}

impl ModelSchema {
    /// Starts a builder for a typed model. Root query fields default to the
    /// lowerCamelCase form of the name and its naive plural.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        let name = name.into();
        let mut chars = name.chars();
        let query_field = chars.next().map_or_else(String::new, |c| {
            let lowered: String = c.to_lowercase().chain(chars.clone()).collect();
            camel_case(&lowered)
        });
        let plural_query_field = format!("{query_field}s");
        ModelSchemaBuilder {
            name,
            kind: ModelKind::Typed {
                query_field,
                plural_query_field,
            },
            attributes: Vec::new(),
            connections: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Starts a builder seeded with copies of this schema's declarations.
    ///
    /// Loader overrides are not inherited; declare them on the subtype.
    #[must_use]
    pub fn extend(&self, name: impl Into<String>) -> ModelSchemaBuilder {
        let mut builder = Self::builder(name);
        builder.attributes = self.attributes.clone();
        builder.connections = self.connections.clone();
        builder
    }

    /// The GraphQL type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the model is reached through the root.
    #[must_use]
    pub const fn kind(&self) -> &ModelKind {
        &self.kind
    }

    /// The singular root query field, if the model has one.
    #[must_use]
    pub fn query_field(&self) -> Option<&str> {
        match &self.kind {
            ModelKind::Typed { query_field, .. }
            | ModelKind::CurrentCustomer { query_field } => Some(query_field),
            ModelKind::Metaobject { .. } => None,
        }
    }

    /// The plural root query field, if the model has one.
    #[must_use]
    pub fn plural_query_field(&self) -> Option<&str> {
        match &self.kind {
            ModelKind::Typed {
                plural_query_field, ..
            } => Some(plural_query_field),
            _ => None,
        }
    }

    /// The declared attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeConfig] {
        &self.attributes
    }

    /// The declared connections, in declaration order.
    #[must_use]
    pub fn connections(&self) -> &[ConnectionConfig] {
        &self.connections
    }

    /// Looks up a connection by declared name.
    #[must_use]
    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.iter().find(|c| c.name() == name)
    }

    /// Looks up an attribute by declared name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeConfig> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Returns the merged variant for the named loader, if one was
    /// declared. Variants are computed at build time; this is a map lookup.
    #[must_use]
    pub fn variant_for(&self, loader: &str) -> Option<&Arc<Self>> {
        self.loader_variants.get(loader)
    }
}

/// Builder for [`ModelSchema`].
pub struct ModelSchemaBuilder {
    name: String,
    kind: ModelKind,
    attributes: Vec<AttributeConfig>,
    connections: Vec<ConnectionConfig>,
    #[allow(clippy::type_complexity)]
    overrides: Vec<(String, Box<dyn FnOnce(&mut Self) + Send>)>,
}

impl ModelSchemaBuilder {
    /// Overrides the singular root query field.
    #[must_use]
    pub fn query_field(mut self, field: impl Into<String>) -> Self {
        if let ModelKind::Typed { query_field, .. } = &mut self.kind {
            *query_field = field.into();
        }
        self
    }

    /// Overrides the plural root query field (for irregular plurals).
    #[must_use]
    pub fn plural_query_field(mut self, field: impl Into<String>) -> Self {
        if let ModelKind::Typed {
            plural_query_field, ..
        } = &mut self.kind
        {
            *plural_query_field = field.into();
        }
        self
    }

    /// Marks the model as viewer-style: fetched through the given root
    /// field with no identifying argument.
    #[must_use]
    pub fn viewer(mut self, field: impl Into<String>) -> Self {
        self.kind = ModelKind::CurrentCustomer {
            query_field: field.into(),
        };
        self
    }

    /// Marks the model as a metaobject definition of the given type.
    #[must_use]
    pub fn metaobject(mut self, metaobject_type: impl Into<String>) -> Self {
        self.kind = ModelKind::Metaobject {
            metaobject_type: metaobject_type.into(),
        };
        self
    }

    /// Declares an attribute. Re-declaring a name replaces the earlier
    /// config in place, which is what loader overrides rely on.
    #[must_use]
    pub fn attribute(mut self, attr: AttributeConfig) -> Self {
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.name() == attr.name())
        {
            *existing = attr;
        } else {
            self.attributes.push(attr);
        }
        self
    }

    /// Declares a connection. Re-declaring a name replaces the earlier
    /// config in place.
    #[must_use]
    pub fn connection(mut self, conn: ConnectionConfig) -> Self {
        if let Some(existing) = self
            .connections
            .iter_mut()
            .find(|c| c.name() == conn.name())
        {
            *existing = conn;
        } else {
            self.connections.push(conn);
        }
        self
    }

    /// Registers a named per-loader override. The closure receives a copy
    /// of the base configuration and adjusts it; the merged variant is
    /// built once, when [`build`](Self::build) runs.
    #[must_use]
    pub fn for_loader(
        mut self,
        loader: impl Into<String>,
        f: impl FnOnce(&mut Self) + Send + 'static,
    ) -> Self {
        self.overrides.push((loader.into(), Box::new(f)));
        self
    }

    /// Builds the schema, computing all loader variants.
    #[must_use]
    pub fn build(mut self) -> Arc<ModelSchema> {
        let overrides = std::mem::take(&mut self.overrides);
        let mut variants = HashMap::new();
        for (loader, f) in overrides {
            let mut variant = Self {
                name: self.name.clone(),
                kind: self.kind.clone(),
                attributes: self.attributes.clone(),
                connections: self.connections.clone(),
                overrides: Vec::new(),
            };
            f(&mut variant);
            variants.insert(
                loader,
                Arc::new(ModelSchema {
                    name: variant.name,
                    kind: variant.kind,
                    attributes: variant.attributes,
                    connections: variant.connections,
                    loader_variants: HashMap::new(),
                }),
            );
        }
        Arc::new(ModelSchema {
            name: self.name,
            kind: self.kind,
            attributes: self.attributes,
            connections: self.connections,
            loader_variants: variants,
        })
    }

    /// In-place attribute declaration for use inside loader overrides.
    pub fn set_attribute(&mut self, attr: AttributeConfig) {
        if let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|a| a.name() == attr.name())
        {
            *existing = attr;
        } else {
            self.attributes.push(attr);
        }
    }

    /// In-place connection declaration for use inside loader overrides.
    pub fn set_connection(&mut self, conn: ConnectionConfig) {
        if let Some(existing) = self
            .connections
            .iter_mut()
            .find(|c| c.name() == conn.name())
        {
            *existing = conn;
        } else {
            self.connections.push(conn);
        }
    }
}

/// A name-to-schema lookup table.
///
/// Connections reference their target type by name; the registry resolves
/// those names at query and mapping time. The registry is injected into
/// each loader at construction rather than held globally.
#[derive(Debug, Default)]
pub struct Registry {
    models: HashMap<String, Arc<ModelSchema>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its type name.
    pub fn register(&mut self, schema: Arc<ModelSchema>) {
        self.models.insert(schema.name().to_string(), schema);
    }

    /// Looks up a schema by type name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ModelSchema>> {
        self.models.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_schema() -> Arc<ModelSchema> {
        ModelSchema::builder("Order")
            .attribute(AttributeConfig::new("name", AttributeKind::String))
            .connection(ConnectionConfig::has_many("line_items", "LineItem").nested())
            .build()
    }

    #[test]
    fn test_root_fields_default_from_type_name() {
        let schema = order_schema();
        assert_eq!(schema.query_field(), Some("order"));
        assert_eq!(schema.plural_query_field(), Some("orders"));
    }

    #[test]
    fn test_plural_override_for_irregular_names() {
        let schema = ModelSchema::builder("Company")
            .plural_query_field("companies")
            .build();
        assert_eq!(schema.plural_query_field(), Some("companies"));
    }

    #[test]
    fn test_extend_copies_rather_than_shares() {
        let base = order_schema();
        let draft = base
            .extend("DraftOrder")
            .attribute(AttributeConfig::new("status", AttributeKind::String))
            .build();

        assert!(draft.attribute("name").is_some());
        assert!(draft.attribute("status").is_some());
        // the parent is untouched
        assert!(base.attribute("status").is_none());
    }

    #[test]
    fn test_redeclaring_an_attribute_replaces_it() {
        let schema = ModelSchema::builder("Order")
            .attribute(AttributeConfig::new("name", AttributeKind::String))
            .attribute(AttributeConfig::new("name", AttributeKind::Json))
            .build();
        assert_eq!(schema.attributes().len(), 1);
        assert_eq!(schema.attribute("name").unwrap().kind(), AttributeKind::Json);
    }

    #[test]
    fn test_loader_variants_are_merged_at_build_time() {
        let schema = ModelSchema::builder("Order")
            .attribute(AttributeConfig::new("name", AttributeKind::String))
            .for_loader("customer_account", |b| {
                b.set_attribute(
                    AttributeConfig::new("name", AttributeKind::String).path("number"),
                );
                b.set_attribute(AttributeConfig::new("financial_status", AttributeKind::String));
            })
            .build();

        let variant = schema.variant_for("customer_account").unwrap();
        assert_eq!(variant.attribute("name").unwrap().source_path(), "number");
        assert!(variant.attribute("financial_status").is_some());

        // the base schema keeps its own configuration
        assert_eq!(schema.attribute("name").unwrap().source_path(), "name");
        assert!(schema.attribute("financial_status").is_none());
        assert!(schema.variant_for("admin").is_none());
    }

    #[test]
    fn test_metaobject_kind_has_no_root_fields() {
        let schema = ModelSchema::builder("Faq").metaobject("faq").build();
        assert!(schema.query_field().is_none());
        assert!(schema.plural_query_field().is_none());
        assert_eq!(
            schema.kind(),
            &ModelKind::Metaobject {
                metaobject_type: "faq".to_string()
            }
        );
    }

    #[test]
    fn test_registry_resolves_by_type_name() {
        let mut registry = Registry::new();
        registry.register(order_schema());
        assert!(registry.get("Order").is_some());
        assert!(registry.get("Product").is_none());
    }

    #[test]
    fn test_default_arguments_survive_into_schema() {
        let schema = ModelSchema::builder("Customer")
            .connection(
                ConnectionConfig::has_many("orders", "Order")
                    .default_argument("sort_key", json!("CREATED_AT")),
            )
            .build();
        let conn = schema.connection("orders").unwrap();
        assert_eq!(conn.default_arguments().len(), 1);
    }
}
