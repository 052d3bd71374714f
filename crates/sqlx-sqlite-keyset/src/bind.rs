//! Parameter binding for generated queries.

use keyset_paginator::CursorValue;
use serde_json::Value as JsonValue;
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use time::format_description::well_known::Rfc3339;

use crate::{Error, Result};

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Prepare `sql`, binding scope values first and then cursor values.
pub(crate) fn bind_all<'q>(
   sql: &'q str,
   scope_values: Vec<JsonValue>,
   cursor_values: &[CursorValue],
) -> Result<SqliteQuery<'q>> {
   let mut q = sqlx::query(sql);
   for value in scope_values {
      q = bind_json(q, value);
   }
   for value in cursor_values {
      q = bind_cursor_value(q, value)?;
   }
   Ok(q)
}

/// Bind a caller-supplied scope value.
fn bind_json(query: SqliteQuery<'_>, value: JsonValue) -> SqliteQuery<'_> {
   match value {
      JsonValue::Null => query.bind(None::<JsonValue>),
      JsonValue::Bool(b) => query.bind(b),
      JsonValue::String(s) => query.bind(s),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      other => query.bind(other),
   }
}

/// Bind a cursor value with its native SQLite type.
///
/// Timestamps bind as RFC 3339 text, the form they take inside cursors.
fn bind_cursor_value<'q>(
   query: SqliteQuery<'q>,
   value: &CursorValue,
) -> Result<SqliteQuery<'q>> {
   let query = match value {
      CursorValue::Null => query.bind(None::<String>),
      CursorValue::Bool(b) => query.bind(*b),
      CursorValue::Integer(i) => query.bind(*i),
      CursorValue::Float(f) => query.bind(*f),
      CursorValue::Text(s) => query.bind(s.clone()),
      CursorValue::Timestamp(ts) => {
         let text = ts
            .format(&Rfc3339)
            .map_err(|e| Error::InvalidTimestamp(e.to_string()))?;
         query.bind(text)
      }
   };
   Ok(query)
}
