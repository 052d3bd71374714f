//! Scalar values carried by cursors and boundary predicates.

use std::cmp::Ordering;
use std::fmt;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A sort-key value read from a record or decoded from a cursor token.
///
/// Serializes to the matching JSON scalar. Timestamps serialize as RFC 3339
/// strings, so a decoded cursor holds them as [`CursorValue::Text`]; adapters
/// compare such text against a [`CursorValue::Timestamp`] as a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorValue {
   Null,
   Bool(bool),
   Integer(i64),
   Float(f64),
   Text(String),
   Timestamp(OffsetDateTime),
}

impl CursorValue {
   /// Convert a JSON scalar. Arrays and objects have no cursor representation.
   pub fn from_json(value: &JsonValue) -> Option<Self> {
      match value {
         JsonValue::Null => Some(CursorValue::Null),
         JsonValue::Bool(b) => Some(CursorValue::Bool(*b)),
         JsonValue::Number(n) => n
            .as_i64()
            .map(CursorValue::Integer)
            .or_else(|| n.as_f64().map(CursorValue::Float)),
         JsonValue::String(s) => Some(CursorValue::Text(s.clone())),
         JsonValue::Array(_) | JsonValue::Object(_) => None,
      }
   }

   pub fn is_null(&self) -> bool {
      matches!(self, CursorValue::Null)
   }

   /// Interpret the value as a timestamp, parsing RFC 3339 text.
   pub fn as_timestamp(&self) -> Option<OffsetDateTime> {
      match self {
         CursorValue::Timestamp(ts) => Some(*ts),
         CursorValue::Text(s) => OffsetDateTime::parse(s, &Rfc3339).ok(),
         _ => None,
      }
   }

   /// SQL comparison: `None` when either side is NULL.
   pub fn compare(&self, other: &CursorValue) -> Option<Ordering> {
      if self.is_null() || other.is_null() {
         return None;
      }
      Some(self.sort_cmp(other))
   }

   /// Total order following SQLite's cross-type rules:
   /// NULL < numbers (booleans as 0/1) < text.
   pub fn sort_cmp(&self, other: &CursorValue) -> Ordering {
      use CursorValue::*;

      let rank = self.type_rank().cmp(&other.type_rank());
      if rank != Ordering::Equal {
         return rank;
      }

      match (self, other) {
         (Null, Null) => Ordering::Equal,
         (Text(a), Text(b)) => a.cmp(b),
         (Timestamp(a), Timestamp(b)) => a.cmp(b),
         (Timestamp(ts), Text(text)) => cmp_timestamp_text(*ts, text, other),
         (Text(text), Timestamp(ts)) => cmp_timestamp_text(*ts, text, self).reverse(),
         _ => match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.as_float().total_cmp(&other.as_float()),
         },
      }
   }

   fn type_rank(&self) -> u8 {
      match self {
         CursorValue::Null => 0,
         CursorValue::Bool(_) | CursorValue::Integer(_) | CursorValue::Float(_) => 1,
         CursorValue::Text(_) | CursorValue::Timestamp(_) => 2,
      }
   }

   fn as_integer(&self) -> Option<i64> {
      match self {
         CursorValue::Bool(b) => Some(i64::from(*b)),
         CursorValue::Integer(i) => Some(*i),
         _ => None,
      }
   }

   fn as_float(&self) -> f64 {
      match self {
         CursorValue::Float(f) => *f,
         other => other.as_integer().unwrap_or_default() as f64,
      }
   }
}

fn cmp_timestamp_text(ts: OffsetDateTime, text: &str, text_value: &CursorValue) -> Ordering {
   if let Some(parsed) = text_value.as_timestamp() {
      return ts.cmp(&parsed);
   }
   match ts.format(&Rfc3339) {
      Ok(formatted) => formatted.as_str().cmp(text),
      Err(_) => Ordering::Less,
   }
}

impl Serialize for CursorValue {
   fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
      match self {
         CursorValue::Null => serializer.serialize_unit(),
         CursorValue::Bool(b) => serializer.serialize_bool(*b),
         CursorValue::Integer(i) => serializer.serialize_i64(*i),
         CursorValue::Float(f) => serializer.serialize_f64(*f),
         CursorValue::Text(s) => serializer.serialize_str(s),
         CursorValue::Timestamp(ts) => {
            let formatted = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&formatted)
         }
      }
   }
}

struct CursorValueVisitor;

impl<'de> Visitor<'de> for CursorValueVisitor {
   type Value = CursorValue;

   fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("a null, boolean, number or string")
   }

   fn visit_unit<E: de::Error>(self) -> Result<CursorValue, E> {
      Ok(CursorValue::Null)
   }

   fn visit_none<E: de::Error>(self) -> Result<CursorValue, E> {
      Ok(CursorValue::Null)
   }

   fn visit_bool<E: de::Error>(self, v: bool) -> Result<CursorValue, E> {
      Ok(CursorValue::Bool(v))
   }

   fn visit_i64<E: de::Error>(self, v: i64) -> Result<CursorValue, E> {
      Ok(CursorValue::Integer(v))
   }

   fn visit_u64<E: de::Error>(self, v: u64) -> Result<CursorValue, E> {
      i64::try_from(v)
         .map(CursorValue::Integer)
         .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &"an integer within i64 range"))
   }

   fn visit_f64<E: de::Error>(self, v: f64) -> Result<CursorValue, E> {
      Ok(CursorValue::Float(v))
   }

   fn visit_str<E: de::Error>(self, v: &str) -> Result<CursorValue, E> {
      Ok(CursorValue::Text(v.to_string()))
   }

   fn visit_string<E: de::Error>(self, v: String) -> Result<CursorValue, E> {
      Ok(CursorValue::Text(v))
   }
}

impl<'de> Deserialize<'de> for CursorValue {
   fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
      deserializer.deserialize_any(CursorValueVisitor)
   }
}

impl From<bool> for CursorValue {
   fn from(v: bool) -> Self {
      CursorValue::Bool(v)
   }
}

impl From<i32> for CursorValue {
   fn from(v: i32) -> Self {
      CursorValue::Integer(i64::from(v))
   }
}

impl From<i64> for CursorValue {
   fn from(v: i64) -> Self {
      CursorValue::Integer(v)
   }
}

impl From<u32> for CursorValue {
   fn from(v: u32) -> Self {
      CursorValue::Integer(i64::from(v))
   }
}

impl From<f64> for CursorValue {
   fn from(v: f64) -> Self {
      CursorValue::Float(v)
   }
}

impl From<&str> for CursorValue {
   fn from(v: &str) -> Self {
      CursorValue::Text(v.to_string())
   }
}

impl From<String> for CursorValue {
   fn from(v: String) -> Self {
      CursorValue::Text(v)
   }
}

impl From<OffsetDateTime> for CursorValue {
   fn from(v: OffsetDateTime) -> Self {
      CursorValue::Timestamp(v)
   }
}

impl<T: Into<CursorValue>> From<Option<T>> for CursorValue {
   fn from(v: Option<T>) -> Self {
      v.map_or(CursorValue::Null, Into::into)
   }
}
