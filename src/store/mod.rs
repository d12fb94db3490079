//! The narrow query interface the services run against.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::query::{Insert, Select, Update};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// One stored row keyed by column name. Dates are `YYYY-MM-DD` strings.
pub type Row = Map<String, Value>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, stmt: &Select) -> Result<Vec<Row>, AppError>;

    /// Insert one row and return it as stored (with the assigned primary key).
    /// A unique-key violation is `AppError::Duplicate`; a missing referenced row is
    /// `AppError::Validation`.
    async fn insert(&self, stmt: &Insert) -> Result<Row, AppError>;

    /// Number of rows affected; zero when nothing matched.
    async fn update(&self, stmt: &Update) -> Result<u64, AppError>;

    /// Succeeds when the store can serve queries.
    async fn ping(&self) -> Result<(), AppError>;
}

fn missing(column: &str) -> AppError {
    AppError::Store(format!("row has no usable '{}' column", column))
}

pub fn get_i64(row: &Row, column: &str) -> Result<i64, AppError> {
    row.get(column)
        .and_then(Value::as_i64)
        .ok_or_else(|| missing(column))
}

pub fn get_string(row: &Row, column: &str) -> Result<String, AppError> {
    row.get(column)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| missing(column))
}

pub fn get_date(row: &Row, column: &str) -> Result<NaiveDate, AppError> {
    row.get(column)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .ok_or_else(|| missing(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_accessors() {
        let row: Row = json!({"id": 3, "title": "t", "published_at": "2018-02-01"})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(get_i64(&row, "id").unwrap(), 3);
        assert_eq!(get_string(&row, "title").unwrap(), "t");
        assert_eq!(
            get_date(&row, "published_at").unwrap(),
            NaiveDate::from_ymd_opt(2018, 2, 1).unwrap()
        );
        assert!(matches!(get_i64(&row, "title"), Err(AppError::Store(_))));
        assert!(get_date(&row, "nope").is_err());
    }
}
