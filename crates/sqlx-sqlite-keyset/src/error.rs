/// Result type alias for SQLite relation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for SQLite-backed relations.
///
/// Returned directly by [`SqliteRelation::from_table`](crate::SqliteRelation::from_table)
/// and boxed inside `keyset_paginator::Error::Relation` when raised while a
/// page is fetched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Column name contains invalid characters.
   ///
   /// Column names must match `[a-zA-Z_][a-zA-Z0-9_.]*` (letters, digits,
   /// underscores, and dots for qualified names like `table.column`).
   #[error("invalid column name '{name}': must match [a-zA-Z_][a-zA-Z0-9_.]*")]
   InvalidColumnName { name: String },

   /// `PRAGMA table_info` returned no columns.
   #[error("table not found: {0}")]
   TableNotFound(String),

   /// SQLite type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Timestamp cursor value could not be rendered for binding.
   #[error("invalid timestamp: {0}")]
   InvalidTimestamp(String),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::InvalidColumnName { .. } => "INVALID_COLUMN_NAME".to_string(),
         Error::TableNotFound(_) => "TABLE_NOT_FOUND".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::InvalidTimestamp(_) => "INVALID_TIMESTAMP".to_string(),
      }
   }
}
