//! Configuration for paginators

use serde::Deserialize;

/// Configuration for [`Paginator`](crate::Paginator) instances
///
/// # Examples
///
/// ```
/// use keyset_paginator::PaginatorConfig;
///
/// // Use defaults
/// let config = PaginatorConfig::default();
/// assert_eq!(config.per_page, 20);
///
/// // Customize the page size
/// let config = PaginatorConfig { per_page: 50 };
///
/// // Embedded in an application config file
/// let config: PaginatorConfig = serde_json::from_str(r#"{"perPage": 5}"#).unwrap();
/// assert_eq!(config.per_page, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginatorConfig {
   /// Number of records per page
   ///
   /// Zero is allowed and yields empty pages whose flags still report whether
   /// rows exist ahead.
   ///
   /// Default: 20
   pub per_page: usize,
}

impl Default for PaginatorConfig {
   fn default() -> Self {
      Self { per_page: 20 }
   }
}
