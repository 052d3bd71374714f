//! Cursor-based (keyset) pagination over ordered relations.
//!
//! Pages are addressed by opaque cursor tokens that encode the sort-key values
//! of a boundary record, instead of by offsets. Fetching the next page
//! compares rows against those values, so inserts and deletes between
//! requests never shift rows across page boundaries, and deep pages cost the
//! same as the first one.
//!
//! The storage side is abstracted by the [`Relation`] trait. This crate ships
//! [`MemoryRelation`] for already-loaded data; the `sqlx-sqlite-keyset` crate
//! implements it for SQLite tables.
//!
//! # Example
//!
//! ```
//! use indexmap::IndexMap;
//! use keyset_paginator::{Direction, MemoryRelation, Paginate};
//! use serde_json::{Value, json};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> keyset_paginator::Result<()> {
//! let rows: Vec<IndexMap<String, Value>> = (1..=10)
//!    .map(|id| {
//!       [("id".to_string(), json!(id)), ("age".to_string(), json!(20 + id % 3))]
//!          .into_iter()
//!          .collect()
//!    })
//!    .collect();
//!
//! let users = MemoryRelation::new(["id", "age"], rows).desc("age").asc("id");
//!
//! let page = users.paginate(4, None, Direction::Forward).await?;
//! assert!(page.has_next_page());
//!
//! let next = users
//!    .paginate(4, page.last_cursor(), Direction::Forward)
//!    .await?;
//! assert!(next.has_previous_page());
//! # Ok(())
//! # }
//! ```

mod condition;
mod config;
mod cursor;
mod error;
mod memory;
mod order;
mod page;
mod paginator;
mod relation;
mod value;

pub use condition::{ComparisonOp, Predicate, keyset_condition};
pub use config::PaginatorConfig;
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use memory::MemoryRelation;
pub use order::{Direction, OrderColumn, OrderSpec, SortDirection};
pub use page::Page;
pub use paginator::{Paginator, checked_per_page};
pub use relation::{Paginate, Record, Relation};
pub use value::CursorValue;
