//! # Shopify ORM
//!
//! An ORM-style mapping layer over the Shopify GraphQL Admin and Customer
//! Account APIs: declare model schemas once, then query them through
//! chainable relations that build GraphQL documents, drive cursor
//! pagination, and map nested responses back into typed record graphs.
//!
//! ## Overview
//!
//! This crate provides:
//! - A query-node AST that renders GraphQL documents as pure string
//!   building, via [`query::QueryNode`] and [`query::document`]
//! - A search-query builder with Shopify's `key:value` syntax, via
//!   [`query::Conditions`]
//! - Static model configuration tables built once through
//!   [`schema::ModelSchemaBuilder`], with per-loader override variants
//! - Immutable chainable relations with cursor pagination, via
//!   [`relation::Relation`] and [`relation::Pages`]
//! - A response mapper reconstructing typed record graphs, including
//!   eager-loaded connections and inverse back-references, via [`mapper`]
//! - A parallel metaobject track through the generic
//!   `metaobject`/`metaobjects` root fields, via
//!   [`metaobject::MetaobjectRelation`]
//! - A dependency-injected entry point tying transport, registry, and
//!   configuration together, via [`loader::Loader`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shopify_orm::client::HttpTransport;
//! use shopify_orm::loader::Loader;
//! use shopify_orm::query::Conditions;
//! use shopify_orm::schema::{
//!     AttributeConfig, AttributeKind, ConnectionConfig, ModelSchema, Registry,
//! };
//!
//! # async fn example() -> Result<(), shopify_orm::OrmError> {
//! // Declare model schemas once, at startup.
//! let mut registry = Registry::new();
//! registry.register(
//!     ModelSchema::builder("Order")
//!         .attribute(AttributeConfig::new("name", AttributeKind::String))
//!         .attribute(
//!             AttributeConfig::new("total_price", AttributeKind::Float)
//!                 .path("totalPriceSet.shopMoney.amount"),
//!         )
//!         .connection(
//!             ConnectionConfig::has_many("line_items", "LineItem")
//!                 .nested()
//!                 .inverse_of("order"),
//!         )
//!         .build(),
//! );
//! registry.register(
//!     ModelSchema::builder("LineItem")
//!         .attribute(AttributeConfig::new("title", AttributeKind::String))
//!         .connection(ConnectionConfig::has_one("order", "Order"))
//!         .build(),
//! );
//!
//! let loader = Loader::builder()
//!     .transport(HttpTransport::new(
//!         "https://example.myshopify.com/admin/api/2024-04/graphql.json",
//!         "access-token",
//!     ))
//!     .registry(registry)
//!     .build()?;
//!
//! // Fetch one record with its line items eager-loaded.
//! let order = loader
//!     .relation("Order")?
//!     .including(&["line_items"])
//!     .find("gid://shopify/Order/123")
//!     .await?;
//! println!("{:?} has {:?}", order.id(), order.connection("line_items"));
//!
//! // Walk a filtered collection page by page.
//! let paid = loader
//!     .relation("Order")?
//!     .filter(Conditions::raw("financial_status:paid"))?
//!     .limit(100);
//! let mut pages = paid.pages();
//! while let Some(page) = pages.next().await? {
//!     for record in page.records()? {
//!         println!("{:?} {:?}", record.id(), record.get("total_price"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: the registry and transport are passed explicitly
//!   into each loader
//! - **Immutable relations**: chaining returns a new descriptor, safe to
//!   hand to multiple callers
//! - **Fail-fast configuration**: missing collaborators surface as
//!   [`ConfigError`] before any query executes
//! - **No retries**: transport and GraphQL failures propagate unmodified
//! - **Async-first**: designed for use with the Tokio runtime

pub mod client;
pub mod error;
pub mod loader;
pub mod mapper;
pub mod metaobject;
pub mod query;
pub mod record;
pub mod relation;
pub mod schema;

// Re-export the common types at the crate root for convenience
pub use client::{GraphqlTransport, HttpTransport, TransportError};
pub use error::{ConfigError, MappingError, OrmError, UsageError};
pub use loader::{Loader, LoaderBuilder, OrmConfig};
pub use record::{ConnectionValue, Record};
pub use relation::{PageArgs, PageInfo, PaginatedResult, Pages, Relation};
