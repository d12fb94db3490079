//! `Store` over a PostgreSQL pool, plus database bootstrap.

use super::{Row, Store};
use crate::error::{AppError, ConfigError};
use crate::query::{Insert, Select, Update};
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, PgPool, Postgres};
use std::str::FromStr;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn bind(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        query
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, stmt: &Select) -> Result<Vec<Row>, AppError> {
        let q = sql::select(stmt);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let rows = Self::bind(&q).fetch_all(&mut *tx).await?;
        tx.commit().await?;
        Ok(rows.iter().map(row_to_map).collect())
    }

    async fn insert(&self, stmt: &Insert) -> Result<Row, AppError> {
        let q = sql::insert(stmt);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let row = Self::bind(&q)
            .fetch_one(&mut *tx)
            .await
            .map_err(constraint_error)?;
        tx.commit().await?;
        Ok(row_to_map(&row))
    }

    async fn update(&self, stmt: &Update) -> Result<u64, AppError> {
        let q = sql::update(stmt);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = Self::bind(&q)
            .execute(&mut *tx)
            .await
            .map_err(constraint_error)?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Unique and foreign key violations become business errors; everything else stays fatal.
fn constraint_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return AppError::Duplicate(db.constraint().unwrap_or("unique key").to_string())
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::Validation(format!(
                    "referenced row does not exist ({})",
                    db.constraint().unwrap_or("foreign key")
                ))
            }
            _ => {}
        }
    }
    AppError::Db(e)
}

fn row_to_map(row: &PgRow) -> Row {
    use sqlx::Column;
    use sqlx::Row as _;
    let mut map = Row::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    Value::Null
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|_| ConfigError::InvalidValue {
            var: "DATABASE_URL",
            value: database_url.to_string(),
        })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split `url` into the admin URL (same server, `postgres` database) and the
/// database name. A URL without a database path yields an empty name.
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let authority_start = url.find("://").map(|i| i + 3).ok_or_else(|| ConfigError::InvalidValue {
        var: "DATABASE_URL",
        value: url.to_string(),
    })?;
    let path_start = match url[authority_start..].find('/') {
        Some(i) => authority_start + i + 1,
        None => return Ok((url.to_string(), String::new())),
    };
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}
