//! In-memory [`Relation`] over a snapshot of records.
//!
//! Useful for tests and for paginating data that is already loaded. Ordering
//! and comparisons follow SQLite's rules, so a `MemoryRelation` pages the
//! same way the SQLite adapter does over the same rows.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::sync::Arc;

use crate::condition::{ComparisonOp, Predicate};
use crate::order::{OrderColumn, SortDirection};
use crate::relation::{Record, Relation};
use crate::value::CursorValue;

/// Immutable snapshot of records plus the query built on top of it.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use keyset_paginator::MemoryRelation;
/// use serde_json::{Value, json};
///
/// let rows: Vec<IndexMap<String, Value>> = (1..=3)
///    .map(|id| [("id".to_string(), json!(id))].into_iter().collect())
///    .collect();
///
/// let relation = MemoryRelation::new(["id"], rows).desc("id");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryRelation<T> {
   rows: Arc<Vec<T>>,
   columns: Arc<Vec<String>>,
   order: Vec<OrderColumn>,
   filters: Vec<Predicate>,
   limit: Option<usize>,
}

impl<T: Record + Clone> MemoryRelation<T> {
   /// Snapshot `rows`, exposing `columns` as the record shape.
   pub fn new<I, S>(columns: I, rows: impl IntoIterator<Item = T>) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      Self {
         rows: Arc::new(rows.into_iter().collect()),
         columns: Arc::new(columns.into_iter().map(Into::into).collect()),
         order: Vec::new(),
         filters: Vec::new(),
         limit: None,
      }
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

   /// Number of rows in the snapshot, ignoring filters and limit.
   pub fn snapshot_len(&self) -> usize {
      self.rows.len()
   }

   fn matching(&self) -> Vec<&T> {
      let mut rows: Vec<&T> = self
         .rows
         .iter()
         .filter(|row| self.filters.iter().all(|p| evaluate(*row, p)))
         .collect();

      rows.sort_by(|a, b| compare_rows(*a, *b, &self.order));

      if let Some(limit) = self.limit {
         rows.truncate(limit);
      }
      rows
   }
}

impl<T: Record + Clone> Relation for MemoryRelation<T> {
   type Record = T;
   type Error = Infallible;

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

   async fn to_list(&self) -> Result<Vec<T>, Infallible> {
      Ok(self.matching().into_iter().cloned().collect())
   }

   async fn exists(&self) -> Result<bool, Infallible> {
      Ok(!self.matching().is_empty())
   }
}

fn field_or_null<T: Record>(row: &T, column: &str) -> CursorValue {
   row.field(column).unwrap_or(CursorValue::Null)
}

fn compare_rows<T: Record>(a: &T, b: &T, order: &[OrderColumn]) -> Ordering {
   for col in order {
      let ord = field_or_null(a, &col.name).sort_cmp(&field_or_null(b, &col.name));
      let ord = match col.direction {
         SortDirection::Asc => ord,
         SortDirection::Desc => ord.reverse(),
      };
      if ord != Ordering::Equal {
         return ord;
      }
   }
   Ordering::Equal
}

/// SQL semantics: a comparison involving NULL or a missing field is false.
/// A missing field counts as NULL for the IS [NOT] NULL tests.
fn evaluate<T: Record>(row: &T, predicate: &Predicate) -> bool {
   match predicate {
      Predicate::Compare { column, op, value } => {
         let Some(ord) = row.field(column).and_then(|field| field.compare(value)) else {
            return false;
         };
         match op {
            ComparisonOp::Eq => ord == Ordering::Equal,
            ComparisonOp::Gt => ord == Ordering::Greater,
            ComparisonOp::Lt => ord == Ordering::Less,
         }
      }
      Predicate::IsNull { column } => field_or_null(row, column).is_null(),
      Predicate::IsNotNull { column } => !field_or_null(row, column).is_null(),
      Predicate::And(parts) => parts.iter().all(|p| evaluate(row, p)),
      Predicate::Or(parts) => parts.iter().any(|p| evaluate(row, p)),
   }
}
