//! Table schema lookup.

use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::sql::quote_identifier;
use crate::{Error, Result};

/// Column names of `table` in declaration order.
///
/// Uses `PRAGMA table_info`, which returns no rows for a missing table.
pub(crate) async fn query_table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>> {
   // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
   let pragma = format!("PRAGMA table_info({})", quote_identifier(table));

   let rows = sqlx::query(&pragma).fetch_all(pool).await?;

   if rows.is_empty() {
      return Err(Error::TableNotFound(table.to_string()));
   }

   let columns = rows
      .iter()
      .map(|row| row.try_get::<String, _>("name"))
      .collect::<std::result::Result<Vec<_>, _>>()?;

   debug!(table = %table, columns = ?columns, "Queried table info");
   Ok(columns)
}
