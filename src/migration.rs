//! Apply the table descriptors to the database: CREATE TABLE with primary key,
//! unique constraints and foreign keys. Idempotent (IF NOT EXISTS).

use crate::error::AppError;
use crate::query::Table;
use crate::schema::TABLES;
use crate::sql::quoted;
use sqlx::PgPool;

/// DDL for one table.
pub fn create_table_sql(table: &Table) -> String {
    let mut col_defs: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quoted(c.name), c.ddl))
        .collect();

    col_defs.push(format!("PRIMARY KEY ({})", quoted(table.primary_key)));

    for u in table.unique {
        let cols: Vec<String> = u.iter().map(|s| quoted(s)).collect();
        col_defs.push(format!("UNIQUE ({})", cols.join(", ")));
    }
    for fk in table.foreign_keys {
        col_defs.push(format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            quoted(fk.column),
            quoted(fk.table),
            quoted(fk.target)
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(table.name),
        col_defs.join(", ")
    )
}

/// Create every table that does not exist yet, referenced tables first.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for table in TABLES {
        let ddl = create_table_sql(table);
        tracing::debug!(table = table.name, sql = %ddl, "migrate");
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!(tables = TABLES.len(), "migrations applied");
    Ok(())
}
