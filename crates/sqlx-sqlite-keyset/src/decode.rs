//! SQLite row decoding to JSON objects.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row, TypeInfo, Value, ValueRef};

use crate::{Error, Result};

/// Convert one SQLite value to JSON.
///
/// BLOBs become standard base64 strings. Date and time types are kept as
/// the text SQLite stores.
pub(crate) fn to_json(v: SqliteValueRef<'_>) -> Result<JsonValue> {
   if v.is_null() {
      return Ok(JsonValue::Null);
   }

   let value = v.to_owned();
   let type_name = v.type_info().name().to_string();

   let json = match type_name.as_str() {
      "TEXT" | "DATE" | "TIME" | "DATETIME" => match value.try_decode::<String>() {
         Ok(text) => JsonValue::String(text),
         Err(_) => value
            .try_decode::<i64>()
            .map(JsonValue::from)
            .unwrap_or(JsonValue::Null),
      },
      "REAL" => value
         .try_decode::<f64>()
         .map(JsonValue::from)
         .unwrap_or(JsonValue::Null),
      "INTEGER" | "NUMERIC" => value
         .try_decode::<i64>()
         .map(JsonValue::from)
         .unwrap_or(JsonValue::Null),
      "BOOLEAN" => value
         .try_decode::<bool>()
         .map(JsonValue::Bool)
         .unwrap_or(JsonValue::Null),
      "BLOB" => value
         .try_decode::<Vec<u8>>()
         .map(|bytes| JsonValue::String(STANDARD.encode(bytes)))
         .unwrap_or(JsonValue::Null),
      "NULL" => JsonValue::Null,
      _ => return Err(Error::UnsupportedDatatype(type_name)),
   };

   Ok(json)
}

/// Decode rows to ordered JSON objects keyed by column name.
pub(crate) fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<IndexMap<String, JsonValue>>> {
   let mut values = Vec::with_capacity(rows.len());
   for row in rows {
      let mut value = IndexMap::with_capacity(row.columns().len());
      for (i, column) in row.columns().iter().enumerate() {
         let v = row.try_get_raw(i)?;
         value.insert(column.name().to_string(), to_json(v)?);
      }
      values.push(value);
   }
   Ok(values)
}
