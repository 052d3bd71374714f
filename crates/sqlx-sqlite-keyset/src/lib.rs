//! SQLite tables as [`keyset_paginator`] relations.
//!
//! [`SqliteRelation`] turns the paginator's boundary predicates into
//! parameterized SQL (`WHERE ("a" > $1) OR ("a" = $2 AND "b" > $3)`), adds
//! the declared `ORDER BY` and `LIMIT`, and decodes rows to
//! `IndexMap<String, serde_json::Value>`.
//!
//! Enable `tracing` at TRACE level to see the generated SQL.

mod bind;
mod decode;
mod error;
mod relation;
mod schema;
mod sql;

pub use error::{Error, Result};
pub use relation::SqliteRelation;
