//! Sort order and traversal direction types.
//!
//! An [`OrderSpec`] is the total sort order a relation is paginated by. Entry
//! order is significant: the first column has the highest priority when the
//! boundary predicate compares a row against a cursor.
//!
//! # Example
//!
//! ```
//! use keyset_paginator::{OrderColumn, OrderSpec};
//!
//! let order = OrderSpec::new([
//!    OrderColumn::asc("category"),
//!    OrderColumn::desc("score"),
//!    OrderColumn::asc("id"),
//! ])
//! .unwrap();
//!
//! assert_eq!(order.column_names().collect::<Vec<_>>(), ["category", "score", "id"]);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sort direction for an order column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
   /// Ascending order (smallest first)
   Asc,
   /// Descending order (largest first)
   Desc,
}

impl SortDirection {
   /// Return the opposite sort direction.
   pub fn reversed(self) -> Self {
      match self {
         SortDirection::Asc => SortDirection::Desc,
         SortDirection::Desc => SortDirection::Asc,
      }
   }
}

impl FromStr for SortDirection {
   type Err = Error;

   /// Parse `asc` / `desc` in any letter case.
   fn from_str(s: &str) -> Result<Self> {
      if s.eq_ignore_ascii_case("asc") {
         Ok(SortDirection::Asc)
      } else if s.eq_ignore_ascii_case("desc") {
         Ok(SortDirection::Desc)
      } else {
         Err(Error::InvalidSortDirection(s.to_string()))
      }
   }
}

/// Direction of traversal relative to the declared order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
   /// Walk toward the end of the declared order (next pages).
   #[default]
   Forward,
   /// Walk toward the start of the declared order (previous pages).
   Backward,
}

impl Direction {
   pub fn opposite(self) -> Self {
      match self {
         Direction::Forward => Direction::Backward,
         Direction::Backward => Direction::Forward,
      }
   }
}

/// A column in the order used for cursor-based pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderColumn {
   /// Column name as it appears on the record
   pub name: String,
   /// Sort direction for this column
   pub direction: SortDirection,
}

impl OrderColumn {
   pub fn new(name: impl Into<String>, direction: SortDirection) -> Self {
      Self {
         name: name.into(),
         direction,
      }
   }

   /// Create an order column with ascending sort direction.
   pub fn asc(name: impl Into<String>) -> Self {
      Self::new(name, SortDirection::Asc)
   }

   /// Create an order column with descending sort direction.
   pub fn desc(name: impl Into<String>) -> Self {
      Self::new(name, SortDirection::Desc)
   }

   /// The same column sorted the other way.
   pub fn reversed(&self) -> Self {
      Self::new(self.name.clone(), self.direction.reversed())
   }
}

/// Validated, non-empty sort order with unique column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<OrderColumn>", into = "Vec<OrderColumn>")]
pub struct OrderSpec {
   columns: Vec<OrderColumn>,
}

impl OrderSpec {
   /// Build an order, rejecting an empty list or a repeated column.
   pub fn new(columns: impl IntoIterator<Item = OrderColumn>) -> Result<Self> {
      let columns: Vec<OrderColumn> = columns.into_iter().collect();

      if columns.is_empty() {
         return Err(Error::EmptyOrder);
      }

      for (i, col) in columns.iter().enumerate() {
         if columns[..i].iter().any(|prev| prev.name == col.name) {
            return Err(Error::DuplicateOrderColumn {
               column: col.name.clone(),
            });
         }
      }

      Ok(Self { columns })
   }

   pub fn columns(&self) -> &[OrderColumn] {
      &self.columns
   }

   pub fn iter(&self) -> std::slice::Iter<'_, OrderColumn> {
      self.columns.iter()
   }

   /// Column names in priority order.
   pub fn column_names(&self) -> impl Iterator<Item = &str> {
      self.columns.iter().map(|c| c.name.as_str())
   }
}

impl TryFrom<Vec<OrderColumn>> for OrderSpec {
   type Error = Error;

   fn try_from(columns: Vec<OrderColumn>) -> Result<Self> {
      Self::new(columns)
   }
}

impl From<OrderSpec> for Vec<OrderColumn> {
   fn from(order: OrderSpec) -> Self {
      order.columns
   }
}

impl<'a> IntoIterator for &'a OrderSpec {
   type Item = &'a OrderColumn;
   type IntoIter = std::slice::Iter<'a, OrderColumn>;

   fn into_iter(self) -> Self::IntoIter {
      self.columns.iter()
   }
}
