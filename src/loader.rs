//! Loaders: the dependency-injected entry point tying a transport, a
//! model registry, and runtime configuration together.
//!
//! A [`Loader`] is named after the API surface it talks to (`"admin"`,
//! `"customer_account"`, …); schemas registered with per-loader overrides
//! resolve to their merged variant for that name. All configuration is
//! explicit and validated at build time, so a misconfigured loader fails
//! before any query executes.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopify_orm::client::HttpTransport;
//! use shopify_orm::loader::Loader;
//! use shopify_orm::schema::{AttributeConfig, AttributeKind, ModelSchema, Registry};
//!
//! # async fn example() -> Result<(), shopify_orm::OrmError> {
//! let mut registry = Registry::new();
//! registry.register(
//!     ModelSchema::builder("Order")
//!         .attribute(AttributeConfig::new("name", AttributeKind::String))
//!         .build(),
//! );
//!
//! let loader = Loader::builder()
//!     .transport(HttpTransport::new(
//!         "https://example.myshopify.com/admin/api/2024-04/graphql.json",
//!         "token",
//!     ))
//!     .registry(registry)
//!     .build()?;
//!
//! let order = loader.relation("Order")?.find("123").await?;
//! println!("{:?}", order.id());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::client::GraphqlTransport;
use crate::error::{ConfigError, OrmError};
use crate::mapper;
use crate::query::document::DocumentBuilder;
use crate::query::Arguments;
use crate::record::{ConnectionValue, Record};
use crate::relation::{Relation, RelationRoot};
use crate::metaobject::MetaobjectRelation;
use crate::schema::{ModelKind, ModelSchema, Registry};

/// Runtime limits for the pagination engine.
#[derive(Debug, Clone)]
pub struct OrmConfig {
    /// The hard upper bound the server enforces on one page.
    pub max_page_size: u32,
    /// The page size used when a relation sets none.
    pub default_page_size: u32,
}

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            max_page_size: 250,
            default_page_size: 50,
        }
    }
}

/// The query entry point for one API surface.
pub struct Loader<C> {
    transport: Arc<C>,
    registry: Arc<Registry>,
    config: OrmConfig,
    name: String,
}

impl<C> fmt::Debug for Loader<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("config", &self.config)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<C> Loader<C> {
    /// Starts a loader builder.
    #[must_use]
    pub fn builder() -> LoaderBuilder<C> {
        LoaderBuilder {
            transport: None,
            registry: None,
            config: OrmConfig::default(),
            name: "admin".to_string(),
        }
    }

    /// The loader name used for schema variant resolution.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The runtime configuration.
    #[must_use]
    pub const fn config(&self) -> &OrmConfig {
        &self.config
    }

    /// Resolves a model schema, preferring the variant declared for this
    /// loader's name.
    fn resolve(&self, model: &str) -> Result<Arc<ModelSchema>, ConfigError> {
        let schema = self
            .registry
            .get(model)
            .ok_or_else(|| ConfigError::UnknownModel {
                model: model.to_string(),
            })?;
        Ok(schema
            .variant_for(&self.name)
            .map_or_else(|| Arc::clone(schema), Arc::clone))
    }

    /// Starts a relation over the named model's root collection.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unregistered models and for
    /// metaobject definitions, which have no type-specific root fields.
    pub fn relation(&self, model: &str) -> Result<Relation<C>, ConfigError> {
        let schema = self.resolve(model)?;
        if matches!(schema.kind(), ModelKind::Metaobject { .. }) {
            return Err(ConfigError::MetaobjectModel {
                model: model.to_string(),
            });
        }
        Ok(Relation::new(
            schema,
            Arc::clone(&self.registry),
            Arc::clone(&self.transport),
            self.config.clone(),
            RelationRoot::Collection,
        ))
    }

    /// Starts a metaobject relation over the named definition.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the model is unregistered or is
    /// not a metaobject definition.
    pub fn metaobjects(&self, model: &str) -> Result<MetaobjectRelation<C>, ConfigError> {
        let schema = self.resolve(model)?;
        if !matches!(schema.kind(), ModelKind::Metaobject { .. }) {
            return Err(ConfigError::NotAMetaobject {
                model: model.to_string(),
            });
        }
        Ok(MetaobjectRelation::new(
            schema,
            Arc::clone(&self.transport),
            self.config.clone(),
        ))
    }

    /// Starts a relation over one of a record's collection connections.
    ///
    /// Nested connections are queried through the parent record by id;
    /// non-nested ones through their own root field; connections of a
    /// viewer-style parent through the viewer root.
    ///
    /// # Errors
    ///
    /// Returns configuration errors for undeclared connections, singular
    /// connections (use [`related_record`](Self::related_record)), and
    /// unregistered targets, and a usage error when a nested query's
    /// parent has no id.
    pub fn related(&self, parent: &Record, name: &str) -> Result<Relation<C>, OrmError> {
        let parent_schema = parent.schema();
        let Some(conn) = parent_schema.connection(name) else {
            return Err(ConfigError::UnknownConnection {
                name: name.to_string(),
                model: parent_schema.name().to_string(),
            }
            .into());
        };
        if conn.singular() {
            return Err(ConfigError::SingularConnection {
                name: name.to_string(),
                model: parent_schema.name().to_string(),
            }
            .into());
        }
        let target = self.resolve(conn.target())?;

        let root = match parent_schema.kind() {
            ModelKind::CurrentCustomer { query_field } => RelationRoot::Viewer {
                viewer_field: query_field.clone(),
                connection: conn.clone(),
            },
            _ if conn.is_nested() => RelationRoot::Nested {
                parent_field: self.parent_field(parent_schema)?,
                parent_id: self.parent_id(parent)?,
                connection: conn.clone(),
            },
            _ => RelationRoot::RootConnection {
                connection: conn.clone(),
            },
        };
        Ok(Relation::new(
            target,
            Arc::clone(&self.registry),
            Arc::clone(&self.transport),
            self.config.clone(),
            root,
        ))
    }

    fn parent_field(&self, schema: &ModelSchema) -> Result<String, OrmError> {
        schema
            .query_field()
            .map(ToString::to_string)
            .ok_or_else(|| {
                ConfigError::UnknownModel {
                    model: schema.name().to_string(),
                }
                .into()
            })
    }

    fn parent_id(&self, parent: &Record) -> Result<String, OrmError> {
        parent
            .id()
            .map(ToString::to_string)
            .ok_or_else(|| crate::error::UsageError::MissingRecordId.into())
    }
}

impl<C: GraphqlTransport> Loader<C> {
    /// Fetches one of a record's one-to-one connections.
    ///
    /// An already-cached related record is returned without a query.
    ///
    /// # Errors
    ///
    /// Returns configuration errors for undeclared connections and
    /// collection connections (use [`related`](Self::related)), and
    /// propagates transport and mapping errors; absence is `None`, not an
    /// error.
    pub async fn related_record(
        &self,
        parent: &Record,
        name: &str,
    ) -> Result<Option<Record>, OrmError> {
        let parent_schema = Arc::clone(parent.schema());
        let Some(conn) = parent_schema.connection(name) else {
            return Err(ConfigError::UnknownConnection {
                name: name.to_string(),
                model: parent_schema.name().to_string(),
            }
            .into());
        };
        if !conn.singular() {
            return Err(ConfigError::PluralConnection {
                name: name.to_string(),
                model: parent_schema.name().to_string(),
            }
            .into());
        }
        if let Some(ConnectionValue::One(cached)) = parent.connection(name) {
            return Ok(Some((**cached).clone()));
        }
        let target = self.resolve(conn.target())?;
        let builder = DocumentBuilder::new(&self.registry, self.config.default_page_size);

        let (document, variables) = match parent_schema.kind() {
            ModelKind::CurrentCustomer { query_field } => (
                builder.viewer_connection(query_field, conn, Arguments::new(), &target, &[]),
                json!({}),
            ),
            _ => {
                let parent_field = self.parent_field(&parent_schema)?;
                let document =
                    builder.nested_connection(&parent_field, conn, Arguments::new(), &target, &[]);
                (document, json!({ "id": self.parent_id(parent)? }))
            }
        };

        tracing::debug!(
            model = %parent_schema.name(),
            connection = %name,
            "fetching related record"
        );
        let body = self.transport.execute(&document, variables).await?;
        mapper::check_errors(&body)?;

        let parent_field = match parent_schema.kind() {
            ModelKind::CurrentCustomer { query_field } => query_field.clone(),
            _ => self.parent_field(&parent_schema)?,
        };
        let Some(node) = mapper::data_field(&body, &[parent_field.as_str(), conn.name()]) else {
            return Ok(None);
        };
        Ok(Some(mapper::map_node(node, &target, &[], &self.registry)?))
    }

    /// Fetches the viewer record of a viewer-style model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotAViewerModel`] for other model kinds,
    /// [`OrmError::NotFound`] when the viewer resolves to null, and
    /// propagates transport and mapping errors.
    pub async fn current(&self, model: &str) -> Result<Record, OrmError> {
        let schema = self.resolve(model)?;
        let ModelKind::CurrentCustomer { query_field } = schema.kind() else {
            return Err(ConfigError::NotAViewerModel {
                model: model.to_string(),
            }
            .into());
        };
        let builder = DocumentBuilder::new(&self.registry, self.config.default_page_size);
        let document = builder.current_record(query_field, &schema, &[]);

        tracing::debug!(model = %model, "fetching viewer record");
        let body = self.transport.execute(&document, json!({})).await?;
        mapper::check_errors(&body)?;

        let Some(node) = mapper::data_field(&body, &[query_field.as_str()]) else {
            return Err(OrmError::NotFound {
                resource: model.to_string(),
                id: query_field.clone(),
            });
        };
        Ok(mapper::map_node(node, &schema, &[], &self.registry)?)
    }
}

/// Builder for [`Loader`], validating required collaborators before any
/// query executes.
pub struct LoaderBuilder<C> {
    transport: Option<Arc<C>>,
    registry: Option<Registry>,
    config: OrmConfig,
    name: String,
}

impl<C> LoaderBuilder<C> {
    /// Sets the GraphQL transport.
    #[must_use]
    pub fn transport(mut self, transport: C) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets the model registry.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Overrides the runtime configuration.
    #[must_use]
    pub fn config(mut self, config: OrmConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the loader name used for schema variant resolution. Defaults
    /// to `"admin"`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builds the loader.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTransport`] or
    /// [`ConfigError::MissingRegistry`] when a collaborator was not
    /// supplied.
    pub fn build(self) -> Result<Loader<C>, ConfigError> {
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;
        let registry = self.registry.ok_or(ConfigError::MissingRegistry)?;
        Ok(Loader {
            transport,
            registry: Arc::new(registry),
            config: self.config,
            name: self.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::schema::{AttributeConfig, AttributeKind, ConnectionConfig};
    use serde_json::Value;

    struct NullTransport;

    impl GraphqlTransport for NullTransport {
        async fn execute(&self, _query: &str, _variables: Value) -> Result<Value, TransportError> {
            Ok(json!({ "data": {} }))
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(
            ModelSchema::builder("Order")
                .attribute(AttributeConfig::new("name", AttributeKind::String))
                .connection(ConnectionConfig::has_many("line_items", "LineItem").nested())
                .connection(ConnectionConfig::has_one("customer", "Customer"))
                .for_loader("customer_account", |b| {
                    b.set_attribute(
                        AttributeConfig::new("name", AttributeKind::String).path("number"),
                    );
                })
                .build(),
        );
        registry.register(ModelSchema::builder("LineItem").build());
        registry.register(ModelSchema::builder("Customer").build());
        registry.register(ModelSchema::builder("Faq").metaobject("faq").build());
        registry
    }

    fn loader() -> Loader<NullTransport> {
        Loader::builder()
            .transport(NullTransport)
            .registry(registry())
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_transport_and_registry() {
        let error = Loader::<NullTransport>::builder()
            .registry(Registry::new())
            .build()
            .unwrap_err();
        assert_eq!(error, ConfigError::MissingTransport);

        let error = Loader::builder()
            .transport(NullTransport)
            .build()
            .unwrap_err();
        assert_eq!(error, ConfigError::MissingRegistry);
    }

    #[test]
    fn test_relation_rejects_unknown_and_metaobject_models() {
        let loader = loader();
        assert!(matches!(
            loader.relation("Widget"),
            Err(ConfigError::UnknownModel { .. })
        ));
        assert!(matches!(
            loader.relation("Faq"),
            Err(ConfigError::MetaobjectModel { .. })
        ));
        assert!(loader.relation("Order").is_ok());
    }

    #[test]
    fn test_metaobjects_rejects_typed_models() {
        let loader = loader();
        assert!(matches!(
            loader.metaobjects("Order"),
            Err(ConfigError::NotAMetaobject { .. })
        ));
        assert!(loader.metaobjects("Faq").is_ok());
    }

    #[test]
    fn test_loader_name_selects_schema_variant() {
        let loader = Loader::builder()
            .transport(NullTransport)
            .registry(registry())
            .name("customer_account")
            .build()
            .unwrap();
        let relation = loader.relation("Order").unwrap();
        assert_eq!(
            relation.schema().attribute("name").unwrap().source_path(),
            "number"
        );

        let admin = self::loader();
        let relation = admin.relation("Order").unwrap();
        assert_eq!(
            relation.schema().attribute("name").unwrap().source_path(),
            "name"
        );
    }

    #[test]
    fn test_related_guards_connection_shape() {
        let loader = loader();
        let order = loader.relation("Order").unwrap();
        let mut record = Record::new(Arc::clone(order.schema()));
        record.set_attribute(
            "id",
            crate::schema::AttributeValue::String("gid://shopify/Order/1".to_string()),
        );

        assert!(loader.related(&record, "line_items").is_ok());
        assert!(matches!(
            loader.related(&record, "customer"),
            Err(OrmError::Config(ConfigError::SingularConnection { .. }))
        ));
        assert!(matches!(
            loader.related(&record, "nope"),
            Err(OrmError::Config(ConfigError::UnknownConnection { .. }))
        ));
    }

    #[test]
    fn test_related_requires_parent_id_for_nested_queries() {
        let loader = loader();
        let order = loader.relation("Order").unwrap();
        let record = Record::new(Arc::clone(order.schema()));
        assert!(matches!(
            loader.related(&record, "line_items"),
            Err(OrmError::Usage(crate::error::UsageError::MissingRecordId))
        ));
    }

    #[tokio::test]
    async fn test_related_record_prefers_the_cache() {
        let loader = loader();
        let order_schema = Arc::clone(loader.relation("Order").unwrap().schema());
        let customer_schema = loader.resolve("Customer").unwrap();

        let mut customer = Record::new(customer_schema);
        customer.set_attribute(
            "id",
            crate::schema::AttributeValue::String("gid://shopify/Customer/7".to_string()),
        );
        let mut order = Record::new(order_schema);
        order.seed_connection("customer", ConnectionValue::One(Box::new(customer)));

        let related = loader.related_record(&order, "customer").await.unwrap();
        assert_eq!(related.unwrap().id(), Some("gid://shopify/Customer/7"));
    }
}
