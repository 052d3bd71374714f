//! SQLite table as a paginatable relation.

use std::sync::Arc;

use indexmap::IndexMap;
use keyset_paginator::{CursorValue, OrderColumn, Predicate, Relation};
use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use tracing::trace;

use crate::bind::bind_all;
use crate::decode::decode_rows;
use crate::schema::query_table_columns;
use crate::sql::{Scope, build_select};
use crate::{Error, Result};

/// Query over one SQLite table.
///
/// Builder methods return a new relation; the pool and column list are shared.
///
/// # Example
///
/// ```no_run
/// use keyset_paginator::{Direction, Paginate};
/// use serde_json::json;
/// use sqlx::SqlitePool;
/// use sqlx_sqlite_keyset::SqliteRelation;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let adults = SqliteRelation::from_table(pool, "users")
///    .await?
///    .scope("age >= $1", vec![json!(18)])
///    .desc("created_at")
///    .asc("id");
///
/// let page = adults.paginate(20, None, Direction::Forward).await?;
/// let next = adults
///    .paginate(20, page.last_cursor(), Direction::Forward)
///    .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteRelation {
   pool: SqlitePool,
   table: Arc<str>,
   columns: Arc<Vec<String>>,
   scope: Option<Arc<Scope>>,
   order: Vec<OrderColumn>,
   filters: Vec<Predicate>,
   limit: Option<usize>,
}

impl SqliteRelation {
   /// Create a relation over every row of `table`.
   ///
   /// Fails with [`Error::TableNotFound`] if the table does not exist.
   pub async fn from_table(pool: SqlitePool, table: impl Into<String>) -> Result<Self> {
      let table = table.into();
      let columns = query_table_columns(&pool, &table).await?;

      Ok(Self {
         pool,
         table: Arc::from(table),
         columns: Arc::new(columns),
         scope: None,
         order: Vec::new(),
         filters: Vec::new(),
         limit: None,
      })
   }

   /// Restrict rows with a raw WHERE fragment.
   ///
   /// `condition` may reference `$1..$k`, bound from `values` in order. Any
   /// generated placeholders are numbered after them. Replaces an earlier
   /// scope.
   pub fn scope(mut self, condition: impl Into<String>, values: Vec<JsonValue>) -> Self {
      self.scope = Some(Arc::new(Scope {
         condition: condition.into(),
         values,
      }));
      self
   }

   /// Append a column to the declared order.
   pub fn order_by(mut self, column: OrderColumn) -> Self {
      self.order.push(column);
      self
   }

   pub fn asc(self, column: impl Into<String>) -> Self {
      self.order_by(OrderColumn::asc(column))
   }

   pub fn desc(self, column: impl Into<String>) -> Self {
      self.order_by(OrderColumn::desc(column))
   }

   pub fn table(&self) -> &str {
      &self.table
   }

   /// Render the query for `projection`, returning SQL and the values to bind.
   fn to_sql(
      &self,
      projection: &str,
      with_order: bool,
      limit: Option<usize>,
   ) -> Result<(String, Vec<JsonValue>, Vec<CursorValue>)> {
      let order: &[OrderColumn] = if with_order { &self.order } else { &[] };
      let (sql, cursor_values) = build_select(
         &self.table,
         projection,
         self.scope.as_deref(),
         &self.filters,
         order,
         limit,
      )?;
      let scope_values = self
         .scope
         .as_ref()
         .map(|s| s.values.clone())
         .unwrap_or_default();

      Ok((sql, scope_values, cursor_values))
   }
}

impl Relation for SqliteRelation {
   type Record = IndexMap<String, JsonValue>;
   type Error = Error;

   fn column_names(&self) -> &[String] {
      &self.columns
   }

   fn current_order(&self) -> Vec<OrderColumn> {
      self.order.clone()
   }

   fn reverse_order(&self) -> Self {
      Self {
         order: self.order.iter().map(OrderColumn::reversed).collect(),
         ..self.clone()
      }
   }

   fn filter(&self, predicate: Predicate) -> Self {
      let mut next = self.clone();
      next.filters.push(predicate);
      next
   }

   fn limit(&self, limit: usize) -> Self {
      Self {
         limit: Some(limit),
         ..self.clone()
      }
   }

   async fn to_list(&self) -> Result<Vec<IndexMap<String, JsonValue>>> {
      let (sql, scope_values, cursor_values) = self.to_sql("*", true, self.limit)?;
      trace!(sql = %sql, binds = scope_values.len() + cursor_values.len(), "Fetching rows");

      let rows = bind_all(&sql, scope_values, &cursor_values)?
         .fetch_all(&self.pool)
         .await?;
      decode_rows(rows)
   }

   async fn exists(&self) -> Result<bool> {
      // Never read more than one row; a zero limit still matches nothing
      let limit = self.limit.map_or(1, |l| l.min(1));
      let (sql, scope_values, cursor_values) = self.to_sql("1", false, Some(limit))?;
      trace!(sql = %sql, "Probing for rows");

      let row = bind_all(&sql, scope_values, &cursor_values)?
         .fetch_optional(&self.pool)
         .await?;

      Ok(row.is_some())
   }
}
