//! Boundary predicates for keyset pagination.
//!
//! Instead of skipping rows with OFFSET, keyset pagination compares the sort
//! columns of each row against the cursor values. For an order
//! `(c0, c1, …, cn)` the rows strictly beyond the cursor are the rows whose
//! tuple is lexicographically greater (or smaller), which decomposes into
//! disjoint single-column comparisons:
//!
//! ```text
//! (c0 > v0)
//! OR (c0 = v0 AND c1 > v1)
//! OR (c0 = v0 AND c1 = v1 AND c2 > v2)
//! ```
//!
//! Each level uses `>` or `<` depending on the column's sort direction and
//! the traversal direction, so mixed ASC/DESC orders work as well.
//!
//! NULL sorts before every other value, as in SQLite. An equality on a NULL
//! cursor value becomes `IS NULL`, stepping up from NULL becomes
//! `IS NOT NULL`, and stepping down from a value also admits NULL rows.

use serde::Serialize;

use crate::cursor::Cursor;
use crate::order::{Direction, OrderSpec, SortDirection};
use crate::value::CursorValue;
use crate::{Error, Result};

/// Comparison operator of a predicate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOp {
   Eq,
   Gt,
   Lt,
}

impl ComparisonOp {
   /// SQL spelling of the operator.
   pub fn as_sql(self) -> &'static str {
      match self {
         ComparisonOp::Eq => "=",
         ComparisonOp::Gt => ">",
         ComparisonOp::Lt => "<",
      }
   }
}

/// Filter tree handed to a [`Relation`](crate::Relation).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate {
   Compare {
      column: String,
      op: ComparisonOp,
      value: CursorValue,
   },
   IsNull {
      column: String,
   },
   IsNotNull {
      column: String,
   },
   /// All parts hold. Empty matches every row.
   And(Vec<Predicate>),
   /// Any part holds. Empty matches no row.
   Or(Vec<Predicate>),
}

impl Predicate {
   pub fn compare(column: impl Into<String>, op: ComparisonOp, value: CursorValue) -> Self {
      Predicate::Compare {
         column: column.into(),
         op,
         value,
      }
   }

   pub fn is_null(column: impl Into<String>) -> Self {
      Predicate::IsNull {
         column: column.into(),
      }
   }

   pub fn is_not_null(column: impl Into<String>) -> Self {
      Predicate::IsNotNull {
         column: column.into(),
      }
   }

   /// Conjunction, collapsing a single term to itself.
   pub fn and(mut parts: Vec<Predicate>) -> Self {
      if parts.len() == 1 {
         parts.remove(0)
      } else {
         Predicate::And(parts)
      }
   }

   /// Disjunction, collapsing a single term to itself.
   pub fn or(mut parts: Vec<Predicate>) -> Self {
      if parts.len() == 1 {
         parts.remove(0)
      } else {
         Predicate::Or(parts)
      }
   }
}

/// Operator selecting rows beyond the cursor for one column.
fn boundary_op(sort: SortDirection, direction: Direction) -> ComparisonOp {
   match (direction, sort) {
      (Direction::Forward, SortDirection::Asc) => ComparisonOp::Gt,
      (Direction::Forward, SortDirection::Desc) => ComparisonOp::Lt,
      (Direction::Backward, SortDirection::Asc) => ComparisonOp::Lt,
      (Direction::Backward, SortDirection::Desc) => ComparisonOp::Gt,
   }
}

/// Rows whose `column` equals `value`, NULL included.
fn equal_to(column: &str, value: &CursorValue) -> Predicate {
   if value.is_null() {
      Predicate::is_null(column)
   } else {
      Predicate::compare(column, ComparisonOp::Eq, value.clone())
   }
}

/// Rows strictly past `value` on one column. `None` when no value can be
/// past it: nothing sorts below NULL.
fn step_past(column: &str, op: ComparisonOp, value: &CursorValue) -> Option<Predicate> {
   match (op, value.is_null()) {
      (ComparisonOp::Gt, true) => Some(Predicate::is_not_null(column)),
      (ComparisonOp::Lt, true) => None,
      (ComparisonOp::Lt, false) => Some(Predicate::Or(vec![
         Predicate::is_null(column),
         Predicate::compare(column, op, value.clone()),
      ])),
      _ => Some(Predicate::compare(column, op, value.clone())),
   }
}

/// Build the predicate selecting rows strictly beyond `cursor` when walking
/// `order` in `direction`.
///
/// `order` is the declared (caller-facing) order; backward traversal is
/// expressed through `direction`, not by passing a reversed order. When no
/// row can lie beyond the cursor the result is an empty [`Predicate::Or`].
pub fn keyset_condition(
   order: &OrderSpec,
   cursor: &Cursor,
   direction: Direction,
) -> Result<Predicate> {
   let columns = order.columns();
   let mut values = Vec::with_capacity(columns.len());
   for col in columns {
      let value = cursor
         .get(&col.name)
         .ok_or_else(|| Error::CursorColumnMissing {
            column: col.name.clone(),
         })?;
      values.push(value);
   }

   let mut clauses = Vec::with_capacity(columns.len());

   for level in 0..columns.len() {
      let column = &columns[level];
      let Some(step) = step_past(
         &column.name,
         boundary_op(column.direction, direction),
         values[level],
      ) else {
         continue;
      };

      // Equality on every higher-priority column
      let mut parts: Vec<Predicate> = columns[..level]
         .iter()
         .zip(&values)
         .map(|(col, value)| equal_to(&col.name, value))
         .collect();
      parts.push(step);

      clauses.push(Predicate::and(parts));
   }

   Ok(Predicate::or(clauses))
}
