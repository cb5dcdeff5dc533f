//! One fetched page of results and the driver that walks pages in
//! sequence.

use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use crate::client::GraphqlTransport;
use crate::error::{MappingError, OrmError};
use crate::mapper;
use crate::record::Record;
use crate::relation::{PageArgs, PageInfo, Relation};

/// One page of a paginated query.
///
/// The page holds its raw response nodes; records are materialized
/// lazily on first access and cached for the lifetime of this page
/// instance. Navigation methods fetch adjacent pages through the owning
/// relation.
pub struct PaginatedResult<'a, C> {
    relation: &'a Relation<C>,
    nodes: Vec<Value>,
    page_info: PageInfo,
    records: OnceLock<Result<Vec<Record>, MappingError>>,
}

impl<C> fmt::Debug for PaginatedResult<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatedResult")
            .field("nodes", &self.nodes)
            .field("page_info", &self.page_info)
            .finish_non_exhaustive()
    }
}

impl<'a, C> PaginatedResult<'a, C> {
    pub(crate) fn new(relation: &'a Relation<C>, nodes: Vec<Value>, page_info: PageInfo) -> Self {
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

    /// The materialized records of this page.
    ///
    /// Mapping runs once; subsequent calls return the cached result.
    ///
    /// # Errors
    ///
    /// Returns the mapping error raised while materializing, on every
    /// call.
    pub fn records(&self) -> Result<&[Record], MappingError> {
        let result = self.records.get_or_init(|| {
            self.nodes
                .iter()
                .map(|node| {
                    mapper::map_node(
                        node,
                        self.relation.schema(),
                        self.relation.includes(),
                        self.relation.registry(),
                    )
                })
                .collect()
        });
        match result {
            Ok(records) => Ok(records.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Drops all but the first `n` nodes. Called before materialization
    /// when a total limit cuts a page short.
    pub(crate) fn truncate(&mut self, n: usize) {
        self.nodes.truncate(n);
        let _ = self.records.take();
    }
}

impl<'a, C: GraphqlTransport> PaginatedResult<'a, C> {
    /// Fetches the following page, or `None` on the last page.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors from the fetch.
    pub async fn next_page(&self) -> Result<Option<PaginatedResult<'a, C>>, OrmError> {
        if !self.page_info.has_next_page() {
            return Ok(None);
        }
        let cursor = self.page_info.end_cursor().map(ToString::to_string);
        self.relation
            .fetch_page(PageArgs::forward(cursor))
            .await
            .map(Some)
    }

    /// Fetches the preceding page, or `None` on the first page.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors from the fetch.
    pub async fn prev_page(&self) -> Result<Option<PaginatedResult<'a, C>>, OrmError> {
        if !self.page_info.has_previous_page() {
            return Ok(None);
        }
        let Some(cursor) = self.page_info.start_cursor() else {
            return Ok(None);
        };
        self.relation
            .fetch_page(PageArgs::backward(cursor.to_string()))
            .await
            .map(Some)
    }
}

/// Walks a relation's pages in order.
///
/// Stops on an empty page, on an exhausted total limit (truncating the
/// final page so the cumulative yield never exceeds it), or when the
/// server reports no further page.
pub struct Pages<'a, C> {
    relation: &'a Relation<C>,
    cursor: Option<String>,
    yielded: usize,
    done: bool,
}

impl<'a, C: GraphqlTransport> Pages<'a, C> {
    pub(crate) fn new(relation: &'a Relation<C>) -> Self {
        Self {
            relation,
            cursor: None,
            yielded: 0,
            done: false,
        }
    }

    /// Fetches the next page, or `None` when the walk is complete.
    ///
    /// # Errors
    ///
    /// Propagates transport and mapping errors; a failed fetch does not
    /// advance the cursor.
    pub async fn next(&mut self) -> Result<Option<PaginatedResult<'a, C>>, OrmError> {
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
