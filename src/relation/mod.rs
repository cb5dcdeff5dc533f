//! Relations: immutable, chainable query descriptors and the pagination
//! engine that drives them.
//!
//! A [`Relation`] describes one collection query: the model, its search
//! conditions, an optional total limit, a page size, and eager-load
//! includes. Chaining methods return a new relation and leave the
//! receiver untouched, so a relation can be stored and refined along
//! several branches safely. Execution happens only through the fetching
//! methods; building a relation performs no I/O.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopify_orm::query::Conditions;
//! # use shopify_orm::client::HttpTransport;
//! # use shopify_orm::loader::Loader;
//! # async fn example(loader: Loader<HttpTransport>) -> Result<(), shopify_orm::OrmError> {
//! let orders = loader
//!     .relation("Order")?
//!     .filter(Conditions::raw("financial_status:paid"))?
//!     .limit(100)
//!     .including(&["line_items"]);
//!
//! let mut pages = orders.pages();
//! while let Some(page) = pages.next().await? {
//!     for record in page.records()? {
//!         println!("{:?}", record.id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod page;
mod page_info;

pub use page::{PaginatedResult, Pages};
pub use page_info::{PageArgs, PageInfo};

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};

use crate::client::GraphqlTransport;
use crate::error::{ConfigError, OrmError, UsageError};
use crate::loader::OrmConfig;
use crate::mapper;
use crate::query::document::DocumentBuilder;
use crate::query::{Arguments, Conditions, Include};
use crate::record::Record;
use crate::schema::{normalize_gid, ConnectionConfig, ModelSchema, Registry};

/// Where a relation's collection lives in the query root.
#[derive(Debug, Clone)]
pub(crate) enum RelationRoot {
    /// The model's plural root field.
    Collection,
    /// A connection of a parent record fetched by id.
    Nested {
        parent_field: String,
        parent_id: String,
        connection: ConnectionConfig,
    },
    /// A connection declared non-nested, queried through its own
    /// root-level field.
    RootConnection { connection: ConnectionConfig },
    /// A connection of the viewer record.
    Viewer {
        viewer_field: String,
        connection: ConnectionConfig,
    },
}

/// An immutable description of one collection query.
pub struct Relation<C> {
    schema: Arc<ModelSchema>,
    registry: Arc<Registry>,
    transport: Arc<C>,
    config: OrmConfig,
    root: RelationRoot,
    conditions: Conditions,
    includes: Vec<Include>,
    total_limit: Option<usize>,
    page_size: Option<u32>,
    cache: OnceLock<Vec<Record>>,
}

impl<C> fmt::Debug for Relation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("config", &self.config)
            .field("root", &self.root)
            .field("conditions", &self.conditions)
            .field("includes", &self.includes)
            .field("total_limit", &self.total_limit)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl<C> Relation<C> {
    pub(crate) fn new(
        schema: Arc<ModelSchema>,
        registry: Arc<Registry>,
        transport: Arc<C>,
        config: OrmConfig,
        root: RelationRoot,
    ) -> Self {
        Self {
            schema,
            registry,
            transport,
            config,
            root,
            conditions: Conditions::None,
            includes: Vec::new(),
            total_limit: None,
            page_size: None,
            cache: OnceLock::new(),
        }
    }

    /// The model schema this relation queries.
    #[must_use]
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// The applied conditions.
    #[must_use]
    pub const fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// The applied total limit.
    #[must_use]
    pub const fn total_limit(&self) -> Option<usize> {
        self.total_limit
    }

    pub(crate) fn includes(&self) -> &[Include] {
        &self.includes
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the relation itself, unmodified. The materialized-record
    /// cache is not shared with the copy.
    #[must_use]
    pub fn all(&self) -> Self {
        self.fork()
    }

    /// Applies search conditions.
    ///
    /// Empty conditions are a no-op. Chaining a second non-empty condition
    /// set is rejected; combine them in a single call instead.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::ConditionsAlreadyApplied`] when non-empty
    /// conditions were applied earlier in the chain.
    pub fn filter(&self, conditions: Conditions) -> Result<Self, UsageError> {
        if conditions.is_empty() {
            return Ok(self.fork());
        }
        if !self.conditions.is_empty() {
            return Err(UsageError::ConditionsAlreadyApplied);
        }
        let mut relation = self.fork();
        relation.conditions = conditions;
        Ok(relation)
    }

    /// Caps the total number of records the relation will yield across
    /// all pages.
    #[must_use]
    pub fn limit(&self, n: usize) -> Self {
        let mut relation = self.fork();
        relation.total_limit = Some(n);
        relation
    }

    /// Sets the page size requested per fetch.
    #[must_use]
    pub fn per_page(&self, n: u32) -> Self {
        let mut relation = self.fork();
        relation.page_size = Some(n);
        relation
    }

    /// Adds eager-load include paths, dotted for nesting
    /// (`"line_items.product"`).
    #[must_use]
    pub fn including(&self, paths: &[&str]) -> Self {
        let mut relation = self.fork();
        for include in Include::list(paths) {
            if let Some(existing) = relation
                .includes
                .iter_mut()
                .find(|i| i.name == include.name)
            {
                existing.children.extend(include.children);
            } else {
                relation.includes.push(include);
            }
        }
        relation
    }

    /// The page size one fetch will request: the configured size clamped
    /// by the total limit and the transport-wide maximum.
    pub(crate) fn effective_page_size(&self) -> u32 {
        let mut size = self.page_size.unwrap_or(self.config.default_page_size);
        if let Some(limit) = self.total_limit {
            size = size.min(u32::try_from(limit).unwrap_or(u32::MAX));
        }
        size.min(self.config.max_page_size)
    }

    fn fork(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            registry: Arc::clone(&self.registry),
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
            root: self.root.clone(),
            conditions: self.conditions.clone(),
            includes: self.includes.clone(),
            total_limit: self.total_limit,
            page_size: self.page_size,
            cache: OnceLock::new(),
        }
    }
}

impl<C> Clone for Relation<C> {
    fn clone(&self) -> Self {
        self.fork()
    }
}

impl<C: GraphqlTransport> Relation<C> {
    /// Fetches one record by id through the model's singular root field.
    ///
    /// The id is normalized to GID form first, so plain numeric ids are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NotFound`] when the server reports the record
    /// as absent; contrast with [`find_by`](Self::find_by), which
    /// tolerates absence.
    pub async fn find(&self, id: &str) -> Result<Record, OrmError> {
        let Some(field) = self.schema.query_field() else {
            return Err(ConfigError::UnknownModel {
                model: self.schema.name().to_string(),
            }
            .into());
        };
        let gid = normalize_gid(id, self.schema.name())?;
        let builder = DocumentBuilder::new(&self.registry, self.config.default_page_size);
        let document = builder.single_record(field, &self.schema, &self.includes);

        tracing::debug!(model = %self.schema.name(), id = %gid, "fetching record");
        let body = self
            .transport
            .execute(&document, json!({ "id": gid }))
            .await?;
        mapper::check_errors(&body)?;

        let Some(node) = mapper::data_field(&body, &[field]) else {
            return Err(OrmError::NotFound {
                resource: self.schema.name().to_string(),
                id: gid,
            });
        };
        Ok(mapper::map_node(node, &self.schema, &self.includes, &self.registry)?)
    }

    /// Fetches the first record matching the given conditions, or `None`
    /// when nothing matches.
    ///
    /// # Errors
    ///
    /// Propagates transport, mapping, and usage errors; absence is not an
    /// error.
    pub async fn find_by(&self, conditions: Conditions) -> Result<Option<Record>, OrmError> {
        let relation = self.filter(conditions)?.limit(1).per_page(1);
        let page = relation.fetch_page(PageArgs::default()).await?;
        Ok(page.records()?.first().cloned())
    }

    /// Fetches the first record of the relation, or `None` when the
    /// collection is empty.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors.
    pub async fn first(&self) -> Result<Option<Record>, OrmError> {
        let relation = self.limit(1).per_page(1);
        let page = relation.fetch_page(PageArgs::default()).await?;
        Ok(page.records()?.first().cloned())
    }

    /// Fetches the first `n` records of the relation.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors.
    pub async fn first_n(&self, n: usize) -> Result<Vec<Record>, OrmError> {
        self.limit(n).to_vec().await
    }

    /// Fetches one page of results.
    ///
    /// # Errors
    ///
    /// Returns a usage error for conflicting cursors, a transport error
    /// for request failures, and [`OrmError::Graphql`] when the response
    /// carries an `errors` array.
    pub async fn fetch_page(&self, args: PageArgs) -> Result<PaginatedResult<'_, C>, OrmError> {
        args.validate()?;
        let size = self.effective_page_size();

        let mut arguments = Arguments::new();
        if let RelationRoot::Nested { connection, .. }
        | RelationRoot::RootConnection { connection }
        | RelationRoot::Viewer { connection, .. } = &self.root
        {
            for (name, value) in connection.default_arguments() {
                if !matches!(name.as_str(), "first" | "last" | "after" | "before" | "query") {
                    arguments.push(name.clone(), value.clone());
                }
            }
        }
        if args.is_backward() {
            arguments.push("last", json!(size));
            arguments.push("before", args.before.clone().map_or(Value::Null, Value::String));
        } else {
            arguments.push("first", json!(size));
            arguments.push("after", args.after.clone().map_or(Value::Null, Value::String));
        }
        if let Some(query) = self.conditions.to_search_query() {
            arguments.push("query", Value::String(query));
        }

        let builder = DocumentBuilder::new(&self.registry, self.config.default_page_size);
        let (document, variables, path) = match &self.root {
            RelationRoot::Collection => {
                let Some(field) = self.schema.plural_query_field() else {
                    return Err(ConfigError::UnknownModel {
                        model: self.schema.name().to_string(),
                    }
                    .into());
                };
                (
                    builder.root_connection(field, arguments, &self.schema, &self.includes),
                    json!({}),
                    vec![field],
                )
            }
            RelationRoot::Nested {
                parent_field,
                parent_id,
                connection,
            } => (
                builder.nested_connection(
                    parent_field,
                    connection,
                    arguments,
                    &self.schema,
                    &self.includes,
                ),
                json!({ "id": parent_id }),
                vec![parent_field.as_str(), connection.name()],
            ),
            RelationRoot::RootConnection { connection } => (
                builder.root_connection(
                    connection.query_field(),
                    arguments,
                    &self.schema,
                    &self.includes,
                ),
                json!({}),
                vec![connection.query_field()],
            ),
            RelationRoot::Viewer {
                viewer_field,
                connection,
            } => (
                builder.viewer_connection(
                    viewer_field,
                    connection,
                    arguments,
                    &self.schema,
                    &self.includes,
                ),
                json!({}),
                vec![viewer_field.as_str(), connection.name()],
            ),
        };

        tracing::debug!(model = %self.schema.name(), page_size = size, "fetching page");
        let body = self.transport.execute(&document, variables).await?;
        mapper::check_errors(&body)?;

        let Some(node) = mapper::data_field(&body, &path) else {
            return Ok(PaginatedResult::new(self, Vec::new(), PageInfo::default()));
        };
        let page_info = node
            .get("pageInfo")
            .map_or_else(PageInfo::default, PageInfo::from_json);
        let nodes = node
            .get("nodes")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(PaginatedResult::new(self, nodes, page_info))
    }

    /// Returns a page driver over the whole relation.
    #[must_use]
    pub fn pages(&self) -> Pages<'_, C> {
        Pages::new(self)
    }

    /// Fetches every page and flattens the records in order, honoring the
    /// total limit. The materialized sequence is cached on this relation
    /// instance; chaining produces relations with fresh caches.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors.
    pub async fn to_vec(&self) -> Result<Vec<Record>, OrmError> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached.clone());
        }
        let mut out = Vec::new();
        let mut pages = self.pages();
        while let Some(page) = pages.next().await? {
            out.extend(page.records()?.iter().cloned());
        }
        let _ = self.cache.set(out.clone());
        Ok(out)
    }
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Relation<crate::client::HttpTransport>>();
};
