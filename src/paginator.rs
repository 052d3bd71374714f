//! Cursor-based (keyset) paginator.
//!
//! Each page is fetched with one query over-fetching a single row, which tells
//! whether more rows follow in the direction of travel. The flag for the
//! opposite side is answered by a `LIMIT 1` existence probe from the page's
//! edge record. Backward pages are fetched in reversed order and flipped back,
//! so records always come out in the declared order.

use tracing::debug;

use crate::condition::keyset_condition;
use crate::config::PaginatorConfig;
use crate::cursor::Cursor;
use crate::order::{Direction, OrderSpec};
use crate::page::Page;
use crate::relation::Relation;
use crate::{Error, Result};

/// Paginates a [`Relation`] by a fixed order and page size.
///
/// Holds no mutable state: one instance can serve any number of concurrent
/// requests when the relation is shareable.
///
/// # Example
///
/// ```
/// use indexmap::IndexMap;
/// use keyset_paginator::{Direction, MemoryRelation, OrderColumn, OrderSpec, Paginator};
/// use serde_json::{Value, json};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), keyset_paginator::Error> {
/// let rows: Vec<IndexMap<String, Value>> = (1..=25)
///    .map(|id| [("id".to_string(), json!(id))].into_iter().collect())
///    .collect();
/// let relation = MemoryRelation::new(["id"], rows).asc("id");
/// let order = OrderSpec::new([OrderColumn::asc("id")])?;
///
/// let paginator = Paginator::new(relation, order, 5)?;
/// let first = paginator.paginate(None, Direction::Forward).await?;
///
/// assert_eq!(first.len(), 5);
/// assert_eq!(first.first_cursor(), Some("eyJpZCI6MX0"));
/// assert!(first.has_next_page());
/// assert!(!first.has_previous_page());
///
/// let second = paginator
///    .paginate(first.last_cursor(), Direction::Forward)
///    .await?;
/// assert_eq!(second.records()[0]["id"], json!(6));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Paginator<R> {
   relation: R,
   order: OrderSpec,
   per_page: usize,
}

impl<R: Relation> Paginator<R> {
   /// Create a paginator, checking every order column against the relation.
   ///
   /// The relation must already be sorted by `order`: backward pages flip the
   /// relation's own order, so any other order would return rows out of place.
   pub fn new(relation: R, order: OrderSpec, per_page: usize) -> Result<Self> {
      let available = relation.column_names();
      if let Some(missing) = order
         .column_names()
         .find(|name| !available.iter().any(|c| c == name))
      {
         return Err(Error::UnknownOrderColumn {
            column: missing.to_string(),
         });
      }

      if relation.current_order() != order.columns() {
         return Err(Error::OrderMismatch);
      }

      Ok(Self {
         relation,
         order,
         per_page,
      })
   }

   /// Create a paginator with the configured page size.
   pub fn from_config(relation: R, order: OrderSpec, config: &PaginatorConfig) -> Result<Self> {
      Self::new(relation, order, config.per_page)
   }

   pub fn order(&self) -> &OrderSpec {
      &self.order
   }

   pub fn per_page(&self) -> usize {
      self.per_page
   }

   pub fn relation(&self) -> &R {
      &self.relation
   }

   /// Fetch one page.
   ///
   /// With no cursor the page starts at the beginning of the order (Forward)
   /// or ends at its end (Backward). With a cursor the page holds the records
   /// strictly after it (Forward) or strictly before it (Backward).
   ///
   /// Cursor errors leave the paginator usable; relation errors are returned
   /// as [`Error::Relation`].
   pub async fn paginate(
      &self,
      cursor: Option<&str>,
      direction: Direction,
   ) -> Result<Page<R::Record>> {
      let limit = self
         .per_page
         .checked_add(1)
         .ok_or(Error::InvalidPageSize)?;

      let mut query = self.base(direction);
      if let Some(token) = cursor {
         let cursor = Cursor::decode(token)?;
         cursor.ensure_columns(&self.order)?;
         query = query.filter(keyset_condition(&self.order, &cursor, direction)?);
      }

      let mut records = query
         .limit(limit)
         .to_list()
         .await
         .map_err(Error::relation)?;

      let fetched = records.len();
      let has_more = fetched > self.per_page;
      records.truncate(self.per_page);

      // Backward rows arrive in reversed order
      if direction == Direction::Backward {
         records.reverse();
      }

      let first = records
         .first()
         .map(|r| Cursor::from_record(r, &self.order))
         .transpose()?;
      let last = records
         .last()
         .map(|r| Cursor::from_record(r, &self.order))
         .transpose()?;

      // The opposite side is probed from the record nearest to it
      let (has_next_page, has_previous_page) = match direction {
         Direction::Forward => (
            has_more,
            self.page_exists(first.as_ref(), direction.opposite()).await?,
         ),
         Direction::Backward => (
            self.page_exists(last.as_ref(), direction.opposite()).await?,
            has_more,
         ),
      };

      debug!(
         ?direction,
         per_page = self.per_page,
         fetched,
         has_next_page,
         has_previous_page,
         "Assembled page"
      );

      Ok(Page::new(
         records,
         has_next_page,
         has_previous_page,
         first.as_ref().map(Cursor::encode).transpose()?,
         last.as_ref().map(Cursor::encode).transpose()?,
      ))
   }

   /// Whether any row lies beyond `cursor` in `direction`. An empty page has
   /// no edge to probe from.
   async fn page_exists(&self, cursor: Option<&Cursor>, direction: Direction) -> Result<bool> {
      let Some(cursor) = cursor else {
         return Ok(false);
      };

      let exists = self
         .base(direction)
         .filter(keyset_condition(&self.order, cursor, direction)?)
         .limit(1)
         .exists()
         .await
         .map_err(Error::relation)?;

      debug!(?direction, exists, "Probed adjacent page");
      Ok(exists)
   }

   fn base(&self, direction: Direction) -> R {
      match direction {
         Direction::Forward => self.relation.clone(),
         Direction::Backward => self.relation.reverse_order(),
      }
   }
}

/// Convert a signed page size from request input.
///
/// # Examples
///
/// ```
/// use keyset_paginator::checked_per_page;
///
/// assert_eq!(checked_per_page(10).unwrap(), 10);
/// assert!(checked_per_page(-1).is_err());
/// ```
pub fn checked_per_page(per_page: i64) -> Result<usize> {
   usize::try_from(per_page).map_err(|_| Error::InvalidPageSize)
}
