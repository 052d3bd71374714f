use serde::Serialize;

/// A page of results from keyset pagination.
///
/// Records are always in the declared (caller-facing) order, whichever
/// direction was paginated. `first_cursor` / `last_cursor` describe the first
/// and last record and are `None` exactly when the page is empty.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
   records: Vec<T>,
   has_next_page: bool,
   has_previous_page: bool,
   first_cursor: Option<String>,
   last_cursor: Option<String>,
}

impl<T> Page<T> {
   pub(crate) fn new(
      records: Vec<T>,
      has_next_page: bool,
      has_previous_page: bool,
      first_cursor: Option<String>,
      last_cursor: Option<String>,
   ) -> Self {
      Self {
         records,
         has_next_page,
         has_previous_page,
         first_cursor,
         last_cursor,
      }
   }

   pub fn records(&self) -> &[T] {
      &self.records
   }

   /// Whether rows exist after the last record.
   ///
   /// Pass [`last_cursor`](Self::last_cursor) with `Direction::Forward` to
   /// fetch them.
   pub fn has_next_page(&self) -> bool {
      self.has_next_page
   }

   /// Whether rows exist before the first record.
   ///
   /// Pass [`first_cursor`](Self::first_cursor) with `Direction::Backward` to
   /// fetch them.
   pub fn has_previous_page(&self) -> bool {
      self.has_previous_page
   }

   pub fn first_cursor(&self) -> Option<&str> {
      self.first_cursor.as_deref()
   }

   pub fn last_cursor(&self) -> Option<&str> {
      self.last_cursor.as_deref()
   }

   pub fn len(&self) -> usize {
      self.records.len()
   }

   pub fn is_empty(&self) -> bool {
      self.records.is_empty()
   }

   pub fn iter(&self) -> std::slice::Iter<'_, T> {
      self.records.iter()
   }

   pub fn into_records(self) -> Vec<T> {
      self.records
   }
}

impl<T> IntoIterator for Page<T> {
   type Item = T;
   type IntoIter = std::vec::IntoIter<T>;

   fn into_iter(self) -> Self::IntoIter {
      self.records.into_iter()
   }
}

impl<'a, T> IntoIterator for &'a Page<T> {
   type Item = &'a T;
   type IntoIter = std::slice::Iter<'a, T>;

   fn into_iter(self) -> Self::IntoIter {
      self.records.iter()
   }
}
