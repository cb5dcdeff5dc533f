//! Mapped model instances.
//!
//! A [`Record`] is a plain attribute holder produced by the response
//! mapper. Identity attributes (`id`, `handle`, `display_name`, `type`)
//! are stored alongside the declared domain attributes. Each record also
//! carries a transient, per-instance connection cache holding related
//! records that were eager-loaded with it, including inverse
//! back-references. The cache is exactly that: clearing it never
//! invalidates the underlying data.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::schema::{AttributeValue, ModelSchema};

/// A resolved related record or record list in a connection cache.
#[derive(Debug, Clone)]
pub enum ConnectionValue {
    /// A has-one relationship.
    One(Box<Record>),
    /// A has-many relationship.
    Many(Vec<Record>),
}

/// A mapped model instance.
///
/// # Example
///
/// ```rust
/// use shopify_orm::record::Record;
/// use shopify_orm::schema::{AttributeValue, ModelSchema};
///
/// let schema = ModelSchema::builder("Order").build();
/// let mut record = Record::new(schema);
/// record.set_attribute("id", AttributeValue::String("gid://shopify/Order/1".into()));
/// assert_eq!(record.id(), Some("gid://shopify/Order/1"));
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<ModelSchema>,
    attributes: BTreeMap<String, AttributeValue>,
    connections: HashMap<String, ConnectionValue>,
}

impl Record {
    /// Creates an empty record for the given schema.
    #[must_use]
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            attributes: BTreeMap::new(),
            connections: HashMap::new(),
        }
    }

    /// The schema this record was mapped with.
    #[must_use]
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// The model type name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    /// Sets an attribute value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Reads an attribute value by declared name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// All mapped attributes, ordered by name.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    /// The record's global id, when present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(AttributeValue::as_str)
    }

    /// The record's handle, when present.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.get("handle").and_then(AttributeValue::as_str)
    }

    /// The record's display name, when present.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.get("display_name").and_then(AttributeValue::as_str)
    }

    /// The record's metaobject type, when present.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.get("type").and_then(AttributeValue::as_str)
    }

    /// Reads an already-resolved connection from the cache.
    #[must_use]
    pub fn connection(&self, name: &str) -> Option<&ConnectionValue> {
        self.connections.get(name)
    }

    /// Seeds the connection cache with an already-resolved value.
    ///
    /// This is the explicit injection seam: use it to hand-wire related
    /// records in tests or when related data was fetched out of band. The
    /// mapper's own writes go through an internal path, so seeded values
    /// and mapped values are never confused by the write API they used.
    pub fn seed_connection(&mut self, name: impl Into<String>, value: ConnectionValue) {
        self.connections.insert(name.into(), value);
    }

    /// Internal write path used by the response mapper.
    pub(crate) fn store_connection(&mut self, name: impl Into<String>, value: ConnectionValue) {
        self.connections.insert(name.into(), value);
    }
}
