//! SQL generation for relation queries.
//!
//! Every identifier is validated and double-quoted before it is interpolated.
//! Values never are: predicates render `$N` placeholders numbered after the
//! scope's own parameters, and the matching values are returned for binding.

use keyset_paginator::{CursorValue, OrderColumn, Predicate, SortDirection};
use serde_json::Value as JsonValue;

use crate::{Error, Result};

/// Caller-supplied WHERE fragment with its `$1..$k` bind values.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
   pub condition: String,
   pub values: Vec<JsonValue>,
}

/// Validate that a column name is safe for SQL interpolation.
///
/// Accepts names matching `[a-zA-Z_][a-zA-Z0-9_.]*`, which covers plain column
/// names, qualified names (e.g., `table.column`), and underscored identifiers.
pub(crate) fn validate_column_name(name: &str) -> Result<()> {
   let mut chars = name.chars();
   let valid_start = chars
      .next()
      .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');

   if !valid_start || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.') {
      return Err(Error::InvalidColumnName {
         name: name.to_string(),
      });
   }

   Ok(())
}

/// Quote an identifier with double quotes.
///
/// Any embedded double quotes are doubled per SQL standard (`"` → `""`).
pub(crate) fn quote_identifier(name: &str) -> String {
   format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a predicate tree, appending its comparison values to `values`.
///
/// `next_param` is the number of the next `$N` placeholder and is advanced
/// once per comparison, so repeated values get separate placeholders:
/// `("a" > $1) OR ("a" = $2 AND "b" > $3)`. NULL tests take no placeholder.
pub(crate) fn render_predicate(
   predicate: &Predicate,
   next_param: &mut usize,
   values: &mut Vec<CursorValue>,
) -> Result<String> {
   match predicate {
      Predicate::Compare { column, op, value } => {
         validate_column_name(column)?;
         let sql = format!("{} {} ${}", quote_identifier(column), op.as_sql(), next_param);
         *next_param += 1;
         values.push(value.clone());
         Ok(sql)
      }
      Predicate::IsNull { column } => {
         validate_column_name(column)?;
         Ok(format!("{} IS NULL", quote_identifier(column)))
      }
      Predicate::IsNotNull { column } => {
         validate_column_name(column)?;
         Ok(format!("{} IS NOT NULL", quote_identifier(column)))
      }
      Predicate::And(parts) => {
         if parts.is_empty() {
            return Ok("1".to_string());
         }
         let mut rendered = Vec::with_capacity(parts.len());
         for part in parts {
            let sql = render_predicate(part, next_param, values)?;
            // OR binds looser than AND
            if matches!(part, Predicate::Or(_)) {
               rendered.push(format!("({sql})"));
            } else {
               rendered.push(sql);
            }
         }
         Ok(rendered.join(" AND "))
      }
      Predicate::Or(parts) => {
         if parts.is_empty() {
            return Ok("0".to_string());
         }
         let mut rendered = Vec::with_capacity(parts.len());
         for part in parts {
            rendered.push(format!("({})", render_predicate(part, next_param, values)?));
         }
         Ok(rendered.join(" OR "))
      }
   }
}

/// Build the ORDER BY clause from the declared order.
pub(crate) fn build_order_by(order: &[OrderColumn]) -> Result<String> {
   let mut parts = Vec::with_capacity(order.len());
   for col in order {
      validate_column_name(&col.name)?;
      let dir = match col.direction {
         SortDirection::Asc => "ASC",
         SortDirection::Desc => "DESC",
      };
      parts.push(format!("{} {}", quote_identifier(&col.name), dir));
   }

   Ok(format!("ORDER BY {}", parts.join(", ")))
}

/// Build a complete SELECT over `table`.
///
/// Conditions are joined with AND, scope first. Returns the SQL and the
/// predicate values, which bind after the scope's values.
pub(crate) fn build_select(
   table: &str,
   projection: &str,
   scope: Option<&Scope>,
   filters: &[Predicate],
   order: &[OrderColumn],
   limit: Option<usize>,
) -> Result<(String, Vec<CursorValue>)> {
   let mut sql = format!("SELECT {} FROM {}", projection, quote_identifier(table));
   let mut conditions = Vec::with_capacity(filters.len() + 1);
   let mut values = Vec::new();
   let mut next_param = scope.map_or(0, |s| s.values.len()) + 1;

   if let Some(scope) = scope {
      conditions.push(format!("({})", scope.condition));
   }
   for predicate in filters {
      let condition = render_predicate(predicate, &mut next_param, &mut values)?;
      conditions.push(format!("({})", condition));
   }

   if !conditions.is_empty() {
      sql = format!("{} WHERE {}", sql, conditions.join(" AND "));
   }
   if !order.is_empty() {
      sql = format!("{} {}", sql, build_order_by(order)?);
   }
   if let Some(limit) = limit {
      sql = format!("{} LIMIT {}", sql, limit);
   }

   Ok((sql, values))
}
