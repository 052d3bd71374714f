//! Opaque cursor tokens.
//!
//! A cursor is the ordered set of sort-key values of a boundary record. On
//! the wire it is a JSON object (keys in order-column order) encoded as
//! URL-safe base64 without padding:
//!
//! ```text
//! {"id":1}  ->  eyJpZCI6MX0
//! ```
//!
//! Cursors carry no reference to the row they came from. The row may be
//! deleted later; the cursor still marks a position in the order.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use indexmap::IndexMap;

use crate::order::OrderSpec;
use crate::relation::Record;
use crate::value::CursorValue;
use crate::{Error, Result};

/// Ordered mapping of column name to sort-key value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
   values: IndexMap<String, CursorValue>,
}

impl Cursor {
   pub fn new(values: IndexMap<String, CursorValue>) -> Self {
      Self { values }
   }

   /// Read the order columns of `record`, in order.
   pub fn from_record<R: Record + ?Sized>(record: &R, order: &OrderSpec) -> Result<Self> {
      let mut values = IndexMap::with_capacity(order.columns().len());
      for col in order {
         let value = match record.field(&col.name) {
            Some(value) => value,
            None if record.has_field(&col.name) => {
               return Err(Error::NonScalarSortValue {
                  column: col.name.clone(),
               });
            }
            None => {
               return Err(Error::RecordColumnMissing {
                  column: col.name.clone(),
               });
            }
         };
         values.insert(col.name.clone(), value);
      }
      Ok(Self { values })
   }

   /// Serialize to the wire token.
   pub fn encode(&self) -> Result<String> {
      let json =
         serde_json::to_vec(&self.values).map_err(|e| Error::CursorEncoding(e.to_string()))?;
      Ok(URL_SAFE_NO_PAD.encode(json))
   }

   /// Parse a wire token. No check is made against any order here; see
   /// [`Cursor::ensure_columns`].
   pub fn decode(token: &str) -> Result<Self> {
      let json = URL_SAFE_NO_PAD
         .decode(token)
         .map_err(|e| Error::InvalidCursor(e.to_string()))?;
      let values: IndexMap<String, CursorValue> =
         serde_json::from_slice(&json).map_err(|e| Error::InvalidCursor(e.to_string()))?;
      Ok(Self { values })
   }

   /// Fail unless every order column has a value. Extra keys are ignored.
   pub fn ensure_columns(&self, order: &OrderSpec) -> Result<()> {
      match order.column_names().find(|name| !self.values.contains_key(*name)) {
         Some(missing) => Err(Error::CursorColumnMissing {
            column: missing.to_string(),
         }),
         None => Ok(()),
      }
   }

   pub fn get(&self, column: &str) -> Option<&CursorValue> {
      self.values.get(column)
   }

   pub fn values(&self) -> &IndexMap<String, CursorValue> {
      &self.values
   }

   pub fn len(&self) -> usize {
      self.values.len()
   }

   pub fn is_empty(&self) -> bool {
      self.values.is_empty()
   }
}

impl<K, V> FromIterator<(K, V)> for Cursor
where
   K: Into<String>,
   V: Into<CursorValue>,
{
   fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
      Self {
         values: iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
      }
   }
}
