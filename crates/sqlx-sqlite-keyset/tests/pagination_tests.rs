use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use indexmap::IndexMap;
use keyset_paginator::{
   Direction, Error, OrderColumn, OrderSpec, Page, Paginate, Paginator, PaginatorConfig,
   Relation, SortDirection,
};
use serde_json::{Value as JsonValue, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx_sqlite_keyset::SqliteRelation;
use tempfile::TempDir;
use time::Duration;
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;

type Row = IndexMap<String, JsonValue>;

const TIE_AGES: [i64; 10] = [20, 20, 20, 30, 30, 30, 40, 40, 40, 50];

async fn create_test_db() -> (SqlitePool, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let options = SqliteConnectOptions::new()
      .filename(temp_dir.path().join("test.db"))
      .create_if_missing(true);
   let pool = SqlitePoolOptions::new()
      .max_connections(4)
      .connect_with(options)
      .await
      .expect("Failed to connect to test database");

   (pool, temp_dir)
}

/// Seed one user per entry of `ages`, with ids starting at 1.
///
/// ```text
/// id | name    | email              | age     | created_at
/// ---|---------|--------------------|---------|---------------------
///  1 | User 1  | user1@example.com  | ages[0] | 2024-01-01T00:00:00Z
///  2 | User 2  | user2@example.com  | ages[1] | 2024-01-01T00:00:00Z
///  3 | User 3  | user3@example.com  | ages[2] | 2024-01-02T00:00:00Z
/// …
/// ```
///
/// `created_at` advances one day every two users, so it has ties too.
async fn seed_users(pool: &SqlitePool, ages: &[i64]) {
   sqlx::query(
      "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT NOT NULL, age INTEGER NOT NULL, created_at TEXT NOT NULL)",
   )
   .execute(pool)
   .await
   .unwrap();

   let start = datetime!(2024-01-01 00:00:00 UTC);

   for (id, age) in (1_i64..).zip(ages) {
      let created_at = (start + Duration::days((id - 1) / 2))
         .format(&Rfc3339)
         .unwrap();

      sqlx::query(
         "INSERT INTO users (id, name, email, age, created_at) VALUES ($1, $2, $3, $4, $5)",
      )
      .bind(id)
      .bind(format!("User {id}"))
      .bind(format!("user{id}@example.com"))
      .bind(*age)
      .bind(created_at)
      .execute(pool)
      .await
      .unwrap();
   }
}

/// Seed `count` users with `age = 20 + id`.
async fn seed_count(pool: &SqlitePool, count: i64) {
   let ages: Vec<i64> = (1..=count).map(|id| 20 + id).collect();
   seed_users(pool, &ages).await;
}

async fn users(pool: &SqlitePool) -> SqliteRelation {
   SqliteRelation::from_table(pool.clone(), "users")
      .await
      .unwrap()
}

fn paginator(relation: SqliteRelation, per_page: usize) -> Paginator<SqliteRelation> {
   let order = OrderSpec::new(relation.current_order()).unwrap();
   Paginator::new(relation, order, per_page).unwrap()
}

/// Extract the `id` column from each row for concise assertions.
fn row_ids(page: &Page<Row>) -> Vec<i64> {
   page.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

fn cursor(json: &str) -> String {
   URL_SAFE_NO_PAD.encode(json)
}

// ─── Forward Pagination ───

#[tokio::test]
async fn first_page_of_twenty_five() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   // SELECT * FROM "users" ORDER BY "id" ASC LIMIT 6
   let p = paginator(users(&pool).await.asc("id"), 5);
   let page = p.paginate(None, Direction::Forward).await.unwrap();

   assert_eq!(row_ids(&page), vec![1, 2, 3, 4, 5]);
   assert!(page.has_next_page());
   assert!(!page.has_previous_page());
   assert_eq!(page.first_cursor(), Some("eyJpZCI6MX0"));
   assert_eq!(page.last_cursor(), Some("eyJpZCI6NX0"));
   assert_eq!(page.records()[0]["email"], json!("user1@example.com"));
}

#[tokio::test]
async fn forward_pagination_all_pages() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   let p = paginator(users(&pool).await.asc("id"), 10);

   let page1 = p.paginate(None, Direction::Forward).await.unwrap();
   assert_eq!(row_ids(&page1), (1..=10).collect::<Vec<_>>());
   assert!(page1.has_next_page());

   // SELECT * FROM "users" WHERE ("id" > $1) ORDER BY "id" ASC LIMIT 11
   let page2 = p
      .paginate(page1.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&page2), (11..=20).collect::<Vec<_>>());
   assert!(page2.has_next_page());
   assert!(page2.has_previous_page());

   let page3 = p
      .paginate(page2.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&page3), vec![21, 22, 23, 24, 25]);
   assert!(!page3.has_next_page());
   assert!(page3.has_previous_page());
}

#[tokio::test]
async fn different_page_sizes_across_requests() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   let relation = users(&pool).await.asc("id");
   let first = paginator(relation.clone(), 3)
      .paginate(None, Direction::Forward)
      .await
      .unwrap();
   let second = paginator(relation, 5)
      .paginate(first.last_cursor(), Direction::Forward)
      .await
      .unwrap();

   assert_eq!(row_ids(&second), vec![4, 5, 6, 7, 8]);
}

// ─── Backward Pagination ───

#[tokio::test]
async fn backward_asc_from_cursor() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   // SELECT * FROM "users" WHERE ("id" < $1) ORDER BY "id" DESC LIMIT 6
   // then reversed back to ASC
   let p = paginator(users(&pool).await.asc("id"), 5);
   let page = p
      .paginate(Some(&cursor(r#"{"id":10}"#)), Direction::Backward)
      .await
      .unwrap();

   assert_eq!(row_ids(&page), vec![5, 6, 7, 8, 9]);
   assert!(page.has_next_page());
   assert!(page.has_previous_page());
}

#[tokio::test]
async fn backward_desc_after_first_page() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   let relation = users(&pool).await.desc("id");
   let first = paginator(relation.clone(), 10)
      .paginate(None, Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&first), (16..=25).rev().collect::<Vec<_>>());

   let page = paginator(relation, 5)
      .paginate(first.last_cursor(), Direction::Backward)
      .await
      .unwrap();

   assert_eq!(row_ids(&page), vec![21, 20, 19, 18, 17]);
}

#[tokio::test]
async fn backward_returns_to_first_page() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 12).await;

   let p = paginator(users(&pool).await.asc("id"), 5);
   let page1 = p.paginate(None, Direction::Forward).await.unwrap();
   let page2 = p
      .paginate(page1.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   let back = p
      .paginate(page2.first_cursor(), Direction::Backward)
      .await
      .unwrap();

   assert_eq!(row_ids(&back), row_ids(&page1));
   assert!(!back.has_previous_page());
   assert!(back.has_next_page());
}

// ─── Ties on Non-Unique Columns ───

#[tokio::test]
async fn ties_forward_all_direction_combinations() {
   let (pool, _temp) = create_test_db().await;
   seed_users(&pool, &TIE_AGES).await;

   let cases = [
      (SortDirection::Asc, SortDirection::Asc, [1, 2], [3, 4]),
      (SortDirection::Asc, SortDirection::Desc, [3, 2], [1, 6]),
      (SortDirection::Desc, SortDirection::Asc, [10, 7], [8, 9]),
      (SortDirection::Desc, SortDirection::Desc, [10, 9], [8, 7]),
   ];

   for (age, id, first_ids, second_ids) in cases {
      let relation = users(&pool)
         .await
         .order_by(OrderColumn::new("age", age))
         .order_by(OrderColumn::new("id", id));
      let p = paginator(relation, 2);

      let first = p.paginate(None, Direction::Forward).await.unwrap();
      let second = p
         .paginate(first.last_cursor(), Direction::Forward)
         .await
         .unwrap();

      assert_eq!(row_ids(&first), first_ids, "age {age:?}, id {id:?}");
      assert_eq!(row_ids(&second), second_ids, "age {age:?}, id {id:?}");
   }
}

#[tokio::test]
async fn ties_backward_all_direction_combinations() {
   let (pool, _temp) = create_test_db().await;
   seed_users(&pool, &TIE_AGES).await;

   let cases = [
      (SortDirection::Asc, SortDirection::Asc, [3, 4]),
      (SortDirection::Asc, SortDirection::Desc, [1, 6]),
      (SortDirection::Desc, SortDirection::Asc, [8, 9]),
      (SortDirection::Desc, SortDirection::Desc, [8, 7]),
   ];

   for (age, id, expected) in cases {
      let relation = users(&pool)
         .await
         .order_by(OrderColumn::new("age", age))
         .order_by(OrderColumn::new("id", id));

      let wide = paginator(relation.clone(), 5)
         .paginate(None, Direction::Forward)
         .await
         .unwrap();
      let page = paginator(relation, 2)
         .paginate(wide.last_cursor(), Direction::Backward)
         .await
         .unwrap();

      assert_eq!(row_ids(&page), expected, "age {age:?}, id {id:?}");
      assert!(page.has_previous_page());
      assert!(page.has_next_page());
   }
}

#[tokio::test]
async fn tied_timestamps_with_tiebreaker() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 6).await;

   let p = paginator(users(&pool).await.desc("created_at").desc("id"), 4);

   let first = p.paginate(None, Direction::Forward).await.unwrap();
   assert_eq!(row_ids(&first), vec![6, 5, 4, 3]);

   let second = p
      .paginate(first.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&second), vec![2, 1]);
   assert!(!second.has_next_page());
   assert!(second.has_previous_page());
}

// ─── Deleted Rows ───

#[tokio::test]
async fn forward_after_cursor_row_deleted() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 15).await;

   let p = paginator(users(&pool).await.asc("id"), 5);
   let first = p.paginate(None, Direction::Forward).await.unwrap();

   sqlx::query("DELETE FROM users WHERE id = 5")
      .execute(&pool)
      .await
      .unwrap();

   let second = p
      .paginate(first.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&second), vec![6, 7, 8, 9, 10]);
   assert!(second.has_next_page());
   // ids 1..=4 still precede the deleted cursor row
   assert!(second.has_previous_page());
}

#[tokio::test]
async fn forward_after_cursor_row_and_predecessors_deleted() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 15).await;

   let p = paginator(users(&pool).await.asc("id"), 5);
   let first = p.paginate(None, Direction::Forward).await.unwrap();

   sqlx::query("DELETE FROM users WHERE id <= 5")
      .execute(&pool)
      .await
      .unwrap();

   let second = p
      .paginate(first.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&second), vec![6, 7, 8, 9, 10]);
   assert!(second.has_next_page());
   assert!(!second.has_previous_page());
}

#[tokio::test]
async fn backward_after_cursor_row_deleted() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 15).await;

   sqlx::query("DELETE FROM users WHERE id = 10")
      .execute(&pool)
      .await
      .unwrap();

   let p = paginator(users(&pool).await.asc("id"), 3);
   let page = p
      .paginate(Some(&cursor(r#"{"id":10}"#)), Direction::Backward)
      .await
      .unwrap();

   assert_eq!(row_ids(&page), vec![7, 8, 9]);
   assert!(page.has_next_page());
   assert!(page.has_previous_page());
}

#[tokio::test]
async fn backward_after_cursor_row_and_successors_deleted() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 15).await;

   sqlx::query("DELETE FROM users WHERE id >= 10")
      .execute(&pool)
      .await
      .unwrap();

   let p = paginator(users(&pool).await.asc("id"), 3);
   let page = p
      .paginate(Some(&cursor(r#"{"id":10}"#)), Direction::Backward)
      .await
      .unwrap();

   assert_eq!(row_ids(&page), vec![7, 8, 9]);
   assert!(!page.has_next_page());
   assert!(page.has_previous_page());
}

// ─── Nullable Sort Column ───

/// Seed `scores (id, score)` with one row per entry, NULL for `None`.
async fn seed_scores(pool: &SqlitePool, scores: &[Option<i64>]) {
   sqlx::query("CREATE TABLE scores (id INTEGER PRIMARY KEY, score INTEGER)")
      .execute(pool)
      .await
      .unwrap();

   for (id, score) in (1_i64..).zip(scores) {
      sqlx::query("INSERT INTO scores (id, score) VALUES ($1, $2)")
         .bind(id)
         .bind(*score)
         .execute(pool)
         .await
         .unwrap();
   }
}

async fn walk(p: &Paginator<SqliteRelation>, direction: Direction) -> Vec<Vec<i64>> {
   let mut pages = Vec::new();
   let mut token: Option<String> = None;
   loop {
      let page = p.paginate(token.as_deref(), direction).await.unwrap();
      pages.push(row_ids(&page));
      let (more, next) = match direction {
         Direction::Forward => (page.has_next_page(), page.last_cursor()),
         Direction::Backward => (page.has_previous_page(), page.first_cursor()),
      };
      if !more {
         break;
      }
      token = next.map(str::to_string);
   }
   pages
}

#[tokio::test]
async fn nullable_column_walks_through_null_group() {
   let (pool, _temp) = create_test_db().await;
   seed_scores(&pool, &[None, None, None, Some(4), Some(5)]).await;

   let relation = SqliteRelation::from_table(pool.clone(), "scores")
      .await
      .unwrap()
      .asc("score")
      .asc("id");
   let p = paginator(relation, 2);

   // ("score" IS NOT NULL) OR ("score" IS NULL AND "id" > $1)
   assert_eq!(
      walk(&p, Direction::Forward).await,
      vec![vec![1, 2], vec![3, 4], vec![5]]
   );
   assert_eq!(
      walk(&p, Direction::Backward).await,
      vec![vec![4, 5], vec![2, 3], vec![1]]
   );

   let middle = p
      .paginate(Some(&cursor(r#"{"score":null,"id":1}"#)), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&middle), vec![2, 3]);
   assert!(middle.has_next_page());
   assert!(middle.has_previous_page());
}

#[tokio::test]
async fn nullable_column_desc_puts_nulls_last() {
   let (pool, _temp) = create_test_db().await;
   seed_scores(&pool, &[Some(4), None, Some(5), None, None]).await;

   let relation = SqliteRelation::from_table(pool.clone(), "scores")
      .await
      .unwrap()
      .desc("score")
      .asc("id");
   let p = paginator(relation, 2);

   assert_eq!(
      walk(&p, Direction::Forward).await,
      vec![vec![3, 1], vec![2, 4], vec![5]]
   );
   assert_eq!(
      walk(&p, Direction::Backward).await,
      vec![vec![4, 5], vec![1, 2], vec![3]]
   );
}

// ─── Boundaries ───

#[tokio::test]
async fn empty_table() {
   let (pool, _temp) = create_test_db().await;
   seed_users(&pool, &[]).await;

   let page = users(&pool)
      .await
      .asc("id")
      .paginate(10, None, Direction::Forward)
      .await
      .unwrap();

   assert!(page.is_empty());
   assert!(!page.has_next_page());
   assert!(!page.has_previous_page());
   assert_eq!(page.first_cursor(), None);
   assert_eq!(page.last_cursor(), None);
}

#[tokio::test]
async fn exact_page_size() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 5).await;

   let page = paginator(users(&pool).await.asc("id"), 5)
      .paginate(None, Direction::Forward)
      .await
      .unwrap();

   assert_eq!(page.len(), 5);
   assert!(!page.has_next_page());
   assert!(!page.has_previous_page());
}

#[tokio::test]
async fn zero_page_size() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 10).await;

   // LIMIT 1 still reveals whether rows exist
   let page = paginator(users(&pool).await.asc("id"), 0)
      .paginate(None, Direction::Forward)
      .await
      .unwrap();

   assert!(page.is_empty());
   assert!(page.has_next_page());
   assert!(!page.has_previous_page());
}

#[tokio::test]
async fn page_size_larger_than_table() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 10).await;

   let page = paginator(users(&pool).await.asc("id"), 10_000)
      .paginate(None, Direction::Forward)
      .await
      .unwrap();

   assert_eq!(page.len(), 10);
   assert!(!page.has_next_page());
   assert!(!page.has_previous_page());
}

#[tokio::test]
async fn configured_page_size() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   let relation = users(&pool).await.asc("id");
   let order = OrderSpec::new(relation.current_order()).unwrap();
   let p = Paginator::from_config(relation, order, &PaginatorConfig::default()).unwrap();

   let page = p.paginate(None, Direction::Forward).await.unwrap();
   assert_eq!(page.len(), 20);
   assert!(page.has_next_page());
}

// ─── Scoped Relations ───

#[tokio::test]
async fn scope_with_cursor_numbers_placeholders_after_scope() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   // ages are 20 + id, so ids 11..=25 match
   let adults = users(&pool)
      .await
      .scope("age > $1", vec![json!(30)])
      .asc("id");
   let p = paginator(adults, 10);

   let first = p.paginate(None, Direction::Forward).await.unwrap();
   assert_eq!(row_ids(&first), (11..=20).collect::<Vec<_>>());
   assert!(!first.has_previous_page());

   // SELECT * FROM "users" WHERE (age > $1) AND ("id" > $2) ORDER BY "id" ASC LIMIT 11
   let second = p
      .paginate(first.last_cursor(), Direction::Forward)
      .await
      .unwrap();
   assert_eq!(row_ids(&second), vec![21, 22, 23, 24, 25]);
   assert!(!second.has_next_page());
   assert!(second.has_previous_page());
}

// ─── Relation Contract ───

#[tokio::test]
async fn exists_respects_limit() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 3).await;

   let relation = users(&pool).await;
   assert!(relation.exists().await.unwrap());
   assert!(relation.limit(5).exists().await.unwrap());
   assert!(!relation.limit(0).exists().await.unwrap());
}

#[tokio::test]
async fn column_names_follow_declaration() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 1).await;

   let relation = users(&pool).await;
   assert_eq!(
      relation.column_names(),
      ["id", "name", "email", "age", "created_at"]
   );
   assert_eq!(relation.table(), "users");
}

#[tokio::test]
async fn decodes_column_types() {
   let (pool, _temp) = create_test_db().await;

   sqlx::query(
      "CREATE TABLE samples (id INTEGER PRIMARY KEY, label TEXT, ratio REAL, payload BLOB, note TEXT)",
   )
   .execute(&pool)
   .await
   .unwrap();
   sqlx::query("INSERT INTO samples (id, label, ratio, payload, note) VALUES ($1, $2, $3, $4, $5)")
      .bind(1_i64)
      .bind("first")
      .bind(0.5_f64)
      .bind(b"Hello".to_vec())
      .bind(None::<String>)
      .execute(&pool)
      .await
      .unwrap();

   let page = SqliteRelation::from_table(pool.clone(), "samples")
      .await
      .unwrap()
      .asc("id")
      .paginate(10, None, Direction::Forward)
      .await
      .unwrap();

   let row = &page.records()[0];
   assert_eq!(row["id"], json!(1));
   assert_eq!(row["label"], json!("first"));
   assert_eq!(row["ratio"], json!(0.5));
   assert_eq!(row["payload"], json!("SGVsbG8="));
   assert_eq!(row["note"], JsonValue::Null);
}

// ─── Errors ───

#[tokio::test]
async fn table_not_found() {
   let (pool, _temp) = create_test_db().await;

   let err = SqliteRelation::from_table(pool, "ghosts")
      .await
      .unwrap_err();

   assert!(matches!(err, sqlx_sqlite_keyset::Error::TableNotFound(ref t) if t == "ghosts"));
   assert_eq!(err.error_code(), "TABLE_NOT_FOUND");
}

#[tokio::test]
async fn unknown_order_column() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 3).await;

   let order = OrderSpec::new([OrderColumn::asc("nickname")]).unwrap();
   let err = Paginator::new(users(&pool).await, order, 5).unwrap_err();

   assert!(err.is_invalid_order());
   assert!(err.to_string().contains("nickname"));
}

#[tokio::test]
async fn order_must_match_relation() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 10).await;

   let order = OrderSpec::new([OrderColumn::asc("id")]).unwrap();
   let err = Paginator::new(users(&pool).await.desc("id"), order, 3).unwrap_err();

   assert!(matches!(err, Error::OrderMismatch));
   assert_eq!(err.error_code(), "ORDER_MISMATCH");
}

#[tokio::test]
async fn invalid_cursor() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 3).await;

   let p = paginator(users(&pool).await.asc("id"), 5);
   let err = p
      .paginate(Some("invalid-cursor"), Direction::Forward)
      .await
      .unwrap_err();

   assert!(err.is_invalid_cursor());
   assert_eq!(err.error_code(), "INVALID_CURSOR");
}

#[tokio::test]
async fn database_error_propagates() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 3).await;

   let broken = users(&pool)
      .await
      .scope("no_such_column > $1", vec![json!(1)])
      .asc("id");
   let err = paginator(broken, 5)
      .paginate(None, Direction::Forward)
      .await
      .unwrap_err();

   assert_eq!(err.error_code(), "RELATION_ERROR");
   let Error::Relation(source) = err else {
      panic!("expected relation error");
   };
   let source = source
      .downcast::<sqlx_sqlite_keyset::Error>()
      .expect("sqlite relation error");
   assert!(matches!(*source, sqlx_sqlite_keyset::Error::Sqlx(_)));
   assert!(source.error_code().starts_with("SQLITE_"));
}

// ─── Concurrency ───

#[tokio::test(flavor = "multi_thread")]
async fn shared_paginator_across_tasks() {
   let (pool, _temp) = create_test_db().await;
   seed_count(&pool, 25).await;

   let p = Arc::new(paginator(users(&pool).await.asc("id"), 5));

   let handles: Vec<_> = (0..5_i64)
      .map(|i| {
         let p = Arc::clone(&p);
         tokio::spawn(async move {
            let token = cursor(&format!(r#"{{"id":{}}}"#, i * 5));
            let page = p.paginate(Some(&token), Direction::Forward).await.unwrap();
            row_ids(&page)
         })
      })
      .collect();

   for (i, handle) in (0_i64..).zip(handles) {
      let start = i * 5 + 1;
      assert_eq!(handle.await.unwrap(), (start..start + 5).collect::<Vec<_>>());
   }
}
