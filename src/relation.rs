//! Collaborator traits implemented per storage backend.
//!
//! A [`Relation`] is an ordered, filterable, limitable view over a data source.
//! Builder methods return a new relation and leave the receiver untouched, so a
//! [`Paginator`](crate::Paginator) can derive the page query and the existence
//! probes from the same base relation.

use std::future::Future;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::Result;
use crate::condition::Predicate;
use crate::order::{Direction, OrderColumn, OrderSpec};
use crate::page::Page;
use crate::paginator::Paginator;
use crate::value::CursorValue;

/// A record whose fields can be read by column name.
pub trait Record: Send + Sync {
   /// Value of `column`, or `None` if the record has no such field or the
   /// field holds no scalar.
   fn field(&self, column: &str) -> Option<CursorValue>;

   /// Whether the record has a field named `column`, scalar or not.
   fn has_field(&self, column: &str) -> bool {
      self.field(column).is_some()
   }
}

/// Rows decoded as JSON objects. Non-scalar fields are not sort keys.
impl Record for IndexMap<String, JsonValue> {
   fn field(&self, column: &str) -> Option<CursorValue> {
      self.get(column).and_then(CursorValue::from_json)
   }

   fn has_field(&self, column: &str) -> bool {
      self.contains_key(column)
   }
}

impl Record for IndexMap<String, CursorValue> {
   fn field(&self, column: &str) -> Option<CursorValue> {
      self.get(column).cloned()
   }
}

/// Ordered, filterable sequence over a data source.
///
/// The relation's declared order must match the [`OrderSpec`] it is
/// paginated by.
pub trait Relation: Clone + Send + Sync {
   type Record: Record;
   type Error: std::error::Error + Send + Sync + 'static;

   /// Columns available on the record shape.
   fn column_names(&self) -> &[String];

   /// The declared sort order.
   fn current_order(&self) -> Vec<OrderColumn>;

   /// The same relation with every order direction flipped.
   fn reverse_order(&self) -> Self;

   /// The relation additionally constrained by `predicate`.
   fn filter(&self, predicate: Predicate) -> Self;

   /// The relation capped at `limit` rows.
   fn limit(&self, limit: usize) -> Self;

   /// Materialize the matching rows in the declared order.
   fn to_list(
      &self,
   ) -> impl Future<Output = std::result::Result<Vec<Self::Record>, Self::Error>> + Send;

   /// Whether at least one row matches, without materializing it.
   fn exists(&self) -> impl Future<Output = std::result::Result<bool, Self::Error>> + Send;
}

/// Paginate a relation by its own declared order.
pub trait Paginate: Relation {
   fn paginate(
      &self,
      per_page: usize,
      cursor: Option<&str>,
      direction: Direction,
   ) -> impl Future<Output = Result<Page<Self::Record>>> + Send;
}

impl<R: Relation> Paginate for R {
   async fn paginate(
      &self,
      per_page: usize,
      cursor: Option<&str>,
      direction: Direction,
   ) -> Result<Page<R::Record>> {
      let order = OrderSpec::new(self.current_order())?;
      let paginator = Paginator::new(self.clone(), order, per_page)?;
      paginator.paginate(cursor, direction).await
   }
}
