//! The metaobject query track.
//!
//! Metaobjects have no type-specific root fields; every definition is
//! queried through the generic `metaobject(id:)` and
//! `metaobjects(type: …)` roots, and its fields arrive either as aliased
//! single-field selections or inside a generic `fields` array. The
//! chaining and paging semantics mirror [`Relation`](crate::relation::Relation);
//! eager includes do not apply.
//!
//! # Example
//!
//! ```rust,no_run
//! # use shopify_orm::client::HttpTransport;
//! # use shopify_orm::loader::Loader;
//! # async fn example(loader: Loader<HttpTransport>) -> Result<(), shopify_orm::OrmError> {
//! let faqs = loader.metaobjects("Faq")?.limit(20);
//! for faq in faqs.to_vec().await? {
//!     println!("{:?}", faq.handle());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, OnceLock};

use serde_json::{json, Value};

use crate::client::GraphqlTransport;
use crate::error::{OrmError, UsageError};
use crate::loader::OrmConfig;
use crate::mapper;
use crate::query::{document, Arguments, Conditions};
use crate::record::Record;
use crate::relation::{PageArgs, PageInfo};
use crate::schema::{normalize_gid, ModelSchema};

/// An immutable description of one metaobject collection query.
pub struct MetaobjectRelation<C> {
    schema: Arc<ModelSchema>,
    transport: Arc<C>,
    config: OrmConfig,
    conditions: Conditions,
    total_limit: Option<usize>,
    page_size: Option<u32>,
    cache: OnceLock<Vec<Record>>,
}

impl<C> MetaobjectRelation<C> {
    pub(crate) fn new(schema: Arc<ModelSchema>, transport: Arc<C>, config: OrmConfig) -> Self {
        Self {
            schema,
            transport,
            config,
            conditions: Conditions::None,
            total_limit: None,
            page_size: None,
            cache: OnceLock::new(),
        }
    }

    /// The metaobject model schema this relation queries.
    #[must_use]
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// The applied total limit.
    #[must_use]
    pub const fn total_limit(&self) -> Option<usize> {
        self.total_limit
    }

    /// Applies search conditions, with the same merge-or-reject contract
    /// as [`Relation::filter`](crate::relation::Relation::filter).
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

    /// Caps the total number of records yielded across all pages.
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

    fn effective_page_size(&self) -> u32 {
        let mut size = self.page_size.unwrap_or(self.config.default_page_size);
        if let Some(limit) = self.total_limit {
            size = size.min(u32::try_from(limit).unwrap_or(u32::MAX));
        }
        size.min(self.config.max_page_size)
    }

    fn fork(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
            conditions: self.conditions.clone(),
            total_limit: self.total_limit,
            page_size: self.page_size,
            cache: OnceLock::new(),
        }
    }
}

impl<C> Clone for MetaobjectRelation<C> {
    fn clone(&self) -> Self {
        self.fork()
    }
}

impl<C: GraphqlTransport> MetaobjectRelation<C> {
    /// Fetches one metaobject by id.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NotFound`] when the server reports the record
    /// as absent.
    pub async fn find(&self, id: &str) -> Result<Record, OrmError> {
        let gid = normalize_gid(id, "Metaobject")?;
        let query = document::metaobject_by_id(&self.schema);

        tracing::debug!(model = %self.schema.name(), id = %gid, "fetching metaobject");
        let body = self.transport.execute(&query, json!({ "id": gid })).await?;
        mapper::check_errors(&body)?;

        let Some(node) = mapper::data_field(&body, &["metaobject"]) else {
            return Err(OrmError::NotFound {
                resource: self.schema.name().to_string(),
                id: gid,
            });
        };
        Ok(mapper::map_metaobject_node(node, &self.schema)?)
    }

    /// Fetches the first metaobject of the relation, or `None` when the
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

    /// Fetches one page of results.
    ///
    /// # Errors
    ///
    /// Returns a usage error for conflicting cursors and propagates
    /// transport and GraphQL errors.
    pub async fn fetch_page(
        &self,
        args: PageArgs,
    ) -> Result<MetaobjectPaginatedResult<'_, C>, OrmError> {
        args.validate()?;
        let size = self.effective_page_size();

        let mut arguments = Arguments::new();
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

        let query = document::metaobjects(&self.schema, arguments);
        tracing::debug!(model = %self.schema.name(), page_size = size, "fetching metaobject page");
        let body = self.transport.execute(&query, json!({})).await?;
        mapper::check_errors(&body)?;

        let Some(node) = mapper::data_field(&body, &["metaobjects"]) else {
            return Ok(MetaobjectPaginatedResult::new(
                self,
                Vec::new(),
                PageInfo::default(),
            ));
        };
        let page_info = node
            .get("pageInfo")
            .map_or_else(PageInfo::default, PageInfo::from_json);
        let nodes = node
            .get("nodes")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(MetaobjectPaginatedResult::new(self, nodes, page_info))
    }

    /// Returns a page driver over the whole relation.
    #[must_use]
    pub fn pages(&self) -> MetaobjectPages<'_, C> {
        MetaobjectPages {
            relation: self,
            cursor: None,
            yielded: 0,
            done: false,
        }
    }

    /// Fetches every page and flattens the records in order, honoring the
    /// total limit. The materialized sequence is cached on this relation
    /// instance.
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

/// One page of a metaobject query, with the same lazy materialization as
/// [`PaginatedResult`](crate::relation::PaginatedResult).
pub struct MetaobjectPaginatedResult<'a, C> {
    relation: &'a MetaobjectRelation<C>,
    nodes: Vec<Value>,
    page_info: PageInfo,
    records: OnceLock<Result<Vec<Record>, crate::error::MappingError>>,
}

impl<'a, C> MetaobjectPaginatedResult<'a, C> {
    fn new(relation: &'a MetaobjectRelation<C>, nodes: Vec<Value>, page_info: PageInfo) -> Self {
        Self {
            relation,
            nodes,
            page_info,
            records: OnceLock::new(),
        }
    }

    /// The page's cursor metadata.
    #[must_use]
    pub const fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    /// The number of nodes on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the page has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The materialized records of this page, mapped once and cached.
    ///
    /// # Errors
    ///
    /// Returns the mapping error raised while materializing.
    pub fn records(&self) -> Result<&[Record], crate::error::MappingError> {
        let result = self.records.get_or_init(|| {
            self.nodes
                .iter()
                .map(|node| mapper::map_metaobject_node(node, self.relation.schema()))
                .collect()
        });
        match result {
            Ok(records) => Ok(records.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    fn truncate(&mut self, n: usize) {
        self.nodes.truncate(n);
        let _ = self.records.take();
    }
}

impl<'a, C: GraphqlTransport> MetaobjectPaginatedResult<'a, C> {
    /// Fetches the following page, or `None` on the last page.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors from the fetch.
    pub async fn next_page(&self) -> Result<Option<MetaobjectPaginatedResult<'a, C>>, OrmError> {
        if !self.page_info.has_next_page() {
            return Ok(None);
        }
        let cursor = self.page_info.end_cursor().map(ToString::to_string);
        self.relation
            .fetch_page(PageArgs::forward(cursor))
            .await
            .map(Some)
    }
}

/// Walks a metaobject relation's pages in order, with the same stopping
/// rules as [`Pages`](crate::relation::Pages).
pub struct MetaobjectPages<'a, C> {
    relation: &'a MetaobjectRelation<C>,
    cursor: Option<String>,
    yielded: usize,
    done: bool,
}

impl<'a, C: GraphqlTransport> MetaobjectPages<'a, C> {
    /// Fetches the next page, or `None` when the walk is complete.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors.
    pub async fn next(&mut self) -> Result<Option<MetaobjectPaginatedResult<'a, C>>, OrmError> {
        if self.done {
            return Ok(None);
        }
        if let Some(limit) = self.relation.total_limit() {
            if self.yielded >= limit {
                self.done = true;
                return Ok(None);
            }
        }

        let mut page = self
            .relation
            .fetch_page(PageArgs::forward(self.cursor.clone()))
            .await?;
        if page.is_empty() {
            self.done = true;
            return Ok(None);
        }

        if let Some(limit) = self.relation.total_limit() {
            let remaining = limit - self.yielded;
            if page.len() > remaining {
                page.truncate(remaining);
                self.done = true;
            }
        }

        self.yielded += page.len();
        self.cursor = page.page_info().end_cursor().map(ToString::to_string);
        if !page.page_info().has_next_page() {
            self.done = true;
        }
        Ok(Some(page))
    }
}
