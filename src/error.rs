/// Result type alias for pagination operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for keyset pagination.
///
/// Order errors surface when a [`Paginator`](crate::Paginator) is built and
/// are fatal to that instance. Cursor errors surface per call and leave the
/// paginator reusable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Order must name at least one column.
   #[error("order must be specified for cursor-based pagination")]
   EmptyOrder,

   /// The same column appears twice in the order.
   #[error("column '{column}' appears more than once in the order")]
   DuplicateOrderColumn { column: String },

   /// Sort direction string is neither `asc` nor `desc`.
   #[error("invalid order direction: {0}")]
   InvalidSortDirection(String),

   /// Order references a column the relation does not have.
   #[error("column '{column}' does not exist in the relation")]
   UnknownOrderColumn { column: String },

   /// Order differs from the relation's own declared order.
   #[error("order does not match the relation's declared order")]
   OrderMismatch,

   /// Cursor token could not be decoded.
   #[error("invalid cursor format: {0}")]
   InvalidCursor(String),

   /// Cursor decoded but lacks a value for one of the order columns.
   #[error("invalid cursor format: missing value for order column '{column}'")]
   CursorColumnMissing { column: String },

   /// Cursor values could not be serialized.
   #[error("cursor could not be encoded: {0}")]
   CursorEncoding(String),

   /// A fetched record does not expose one of the order columns.
   #[error("order column '{column}' not found in record")]
   RecordColumnMissing { column: String },

   /// A record holds an array or object where a sort key is expected.
   #[error("order column '{column}' is not a scalar value in the record")]
   NonScalarSortValue { column: String },

   /// Page size is negative or too large to over-fetch by one.
   #[error("page size must be between 0 and usize::MAX - 1")]
   InvalidPageSize,

   /// Error raised by the underlying relation, passed through untouched.
   #[error(transparent)]
   Relation(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
   /// Wrap an error coming from a [`Relation`](crate::Relation) implementation.
   pub fn relation<E>(err: E) -> Self
   where
      E: std::error::Error + Send + Sync + 'static,
   {
      Error::Relation(Box::new(err))
   }

   /// Whether the error rejects the order specification.
   pub fn is_invalid_order(&self) -> bool {
      matches!(
         self,
         Error::EmptyOrder
            | Error::DuplicateOrderColumn { .. }
            | Error::InvalidSortDirection(_)
            | Error::UnknownOrderColumn { .. }
            | Error::OrderMismatch
      )
   }

   /// Whether the error rejects the supplied cursor token.
   pub fn is_invalid_cursor(&self) -> bool {
      matches!(
         self,
         Error::InvalidCursor(_) | Error::CursorColumnMissing { .. }
      )
   }

   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::EmptyOrder => "EMPTY_ORDER".to_string(),
         Error::DuplicateOrderColumn { .. } => "DUPLICATE_ORDER_COLUMN".to_string(),
         Error::InvalidSortDirection(_) => "INVALID_SORT_DIRECTION".to_string(),
         Error::UnknownOrderColumn { .. } => "UNKNOWN_ORDER_COLUMN".to_string(),
         Error::OrderMismatch => "ORDER_MISMATCH".to_string(),
         Error::InvalidCursor(_) => "INVALID_CURSOR".to_string(),
         Error::CursorColumnMissing { .. } => "CURSOR_COLUMN_MISSING".to_string(),
         Error::CursorEncoding(_) => "CURSOR_ENCODING".to_string(),
         Error::RecordColumnMissing { .. } => "RECORD_COLUMN_MISSING".to_string(),
         Error::NonScalarSortValue { .. } => "NON_SCALAR_SORT_VALUE".to_string(),
         Error::InvalidPageSize => "INVALID_PAGE_SIZE".to_string(),
         Error::Relation(_) => "RELATION_ERROR".to_string(),
      }
   }
}
