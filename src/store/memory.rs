//! In-process `Store` that evaluates the same condition and order trees the SQL
//! builder renders. Enforces primary key assignment, unique keys and foreign keys
//! from the table descriptors. Text comparison is case-sensitive, like PostgreSQL.

use super::{Row, Store};
use crate::error::AppError;
use crate::query::{Condition, Insert, OrderTerm, Select, Table, Update};
use crate::schema::TABLES;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct TableData {
    rows: Vec<Row>,
    last_id: i64,
}

pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, TableData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables = TABLES
            .iter()
            .map(|t| (t.name, TableData::default()))
            .collect();
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<&'static str, TableData>>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Store("memory store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown_table(table: &Table) -> AppError {
    AppError::Store(format!("unknown table '{}'", table.name))
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, stmt: &Select) -> Result<Vec<Row>, AppError> {
        let tables = self.lock()?;
        let data = tables.get(stmt.table.name).ok_or_else(|| unknown_table(stmt.table))?;
        let mut rows: Vec<Row> = data
            .rows
            .iter()
            .filter(|row| matches(row, &stmt.condition))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(a, b, &stmt.order));
        let limit = stmt.limit.map(|n| n as usize).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(stmt.offset as usize)
            .take(limit)
            .collect())
    }

    async fn insert(&self, stmt: &Insert) -> Result<Row, AppError> {
        let table = stmt.table;
        let mut tables = self.lock()?;
        let mut row = Row::new();
        for name in table.column_names() {
            row.insert(name.to_string(), Value::Null);
        }
        for (name, value) in &stmt.values {
            if table.column(name).is_none() {
                return Err(AppError::Store(format!(
                    "unknown column '{}' on '{}'",
                    name, table.name
                )));
            }
            row.insert(name.to_string(), value.clone());
        }

        let data = tables.get(table.name).ok_or_else(|| unknown_table(table))?;
        let id = match row.get(table.primary_key).and_then(Value::as_i64) {
            Some(id) => {
                if data.rows.iter().any(|r| r.get(table.primary_key) == row.get(table.primary_key)) {
                    return Err(AppError::Duplicate(format!("{}_pkey", table.name)));
                }
                id
            }
            None => data.last_id + 1,
        };
        row.insert(table.primary_key.to_string(), Value::from(id));

        check_unique(table, &data.rows, &row, None)?;
        check_foreign_keys(table, &tables, &row)?;

        let data = tables.get_mut(table.name).ok_or_else(|| unknown_table(table))?;
        data.last_id = data.last_id.max(id);
        data.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, stmt: &Update) -> Result<u64, AppError> {
        let table = stmt.table;
        let mut tables = self.lock()?;
        let data = tables.get(table.name).ok_or_else(|| unknown_table(table))?;

        let mut changed: Vec<(usize, Row)> = Vec::new();
        for (index, row) in data.rows.iter().enumerate() {
            if !matches(row, &stmt.condition) {
                continue;
            }
            let mut next = row.clone();
            for (name, value) in &stmt.values {
                if *name != table.primary_key {
                    next.insert(name.to_string(), value.clone());
                }
            }
            check_unique(table, &data.rows, &next, Some(index))?;
            check_foreign_keys(table, &tables, &next)?;
            changed.push((index, next));
        }

        let count = changed.len() as u64;
        let data = tables.get_mut(table.name).ok_or_else(|| unknown_table(table))?;
        for (index, row) in changed {
            data.rows[index] = row;
        }
        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

fn check_unique(table: &Table, rows: &[Row], row: &Row, skip: Option<usize>) -> Result<(), AppError> {
    for key in table.unique {
        let clash = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .any(|(_, other)| key.iter().all(|col| other.get(*col) == row.get(*col)));
        if clash {
            return Err(AppError::Duplicate(format!(
                "{}_{}_key",
                table.name,
                key.join("_")
            )));
        }
    }
    Ok(())
}

fn check_foreign_keys(
    table: &Table,
    tables: &HashMap<&'static str, TableData>,
    row: &Row,
) -> Result<(), AppError> {
    for fk in table.foreign_keys {
        let value = row.get(fk.column);
        let found = tables
            .get(fk.table)
            .map(|t| t.rows.iter().any(|r| r.get(fk.target) == value))
            .unwrap_or(false);
        if !found {
            return Err(AppError::Validation(format!(
                "referenced row does not exist ({}_{}_fkey)",
                table.name, fk.column
            )));
        }
    }
    Ok(())
}

fn matches(row: &Row, condition: &Condition) -> bool {
    let cell = |column: &str| row.get(column).unwrap_or(&Value::Null);
    match condition {
        Condition::True => true,
        Condition::Like { column, pattern } => cell(column)
            .as_str()
            .map(|s| like(s, pattern))
            .unwrap_or(false),
        Condition::Eq { column, value } => compare(cell(column), value) == Some(Ordering::Equal),
        Condition::Ge { column, value } => matches!(
            compare(cell(column), value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Condition::Le { column, value } => matches!(
            compare(cell(column), value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Condition::And(parts) => parts.iter().all(|p| matches(row, p)),
    }
}

/// SQL comparison: NULL or mismatched types compare as unknown.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_rows(a: &Row, b: &Row, order: &[OrderTerm]) -> Ordering {
    for term in order {
        let x = a.get(term.column).unwrap_or(&Value::Null);
        let y = b.get(term.column).unwrap_or(&Value::Null);
        let ord = compare(x, y).unwrap_or(Ordering::Equal);
        let ord = if term.ascending { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

#[derive(Debug, PartialEq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyMany,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            '%' => Token::AnyMany,
            '_' => Token::AnyOne,
            c => Token::Literal(c),
        });
    }
    tokens
}

/// `text LIKE pattern ESCAPE '\'`.
fn like(text: &str, pattern: &str) -> bool {
    let tokens = tokenize(pattern);
    let text: Vec<char> = text.chars().collect();
    // reachable[j]: pattern prefix consumed so far can end at text position j
    let mut reachable = vec![false; text.len() + 1];
    reachable[0] = true;
    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        for j in 0..=text.len() {
            if !reachable[j] {
                continue;
            }
            match token {
                Token::AnyMany => {
                    for slot in next.iter_mut().skip(j) {
                        *slot = true;
                    }
                }
                Token::AnyOne => {
                    if j < text.len() {
                        next[j + 1] = true;
                    }
                }
                Token::Literal(c) => {
                    if j < text.len() && text[j] == *c {
                        next[j + 1] = true;
                    }
                }
            }
        }
        reachable = next;
    }
    reachable[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AUTHOR, BOOK};
    use serde_json::json;

    fn insert_author(id: Option<i64>, name: &str) -> Insert {
        let mut values = vec![("name", json!(name))];
        if let Some(id) = id {
            values.push(("id", json!(id)));
        }
        Insert {
            table: &AUTHOR,
            values,
        }
    }

    #[test]
    fn like_honours_wildcards_and_escapes() {
        assert!(like("target1", "%target%"));
        assert!(like("abc", "a_c"));
        assert!(!like("abc", "a\\_c"));
        assert!(like("a_c", "a\\_c"));
        assert!(like("100%", "%0\\%"));
        assert!(!like("1000", "%0\\%"));
        assert!(like("back\\slash", "%\\\\%"));
        assert!(like("", "%"));
        assert!(!like("Target", "%target%"));
    }

    #[tokio::test]
    async fn assigns_ids_after_explicit_ones() {
        let store = MemoryStore::new();
        store.insert(&insert_author(Some(5), "a")).await.unwrap();
        let row = store.insert(&insert_author(None, "b")).await.unwrap();
        assert_eq!(row.get("id"), Some(&json!(6)));
    }

    #[tokio::test]
    async fn unique_and_foreign_keys_are_enforced() {
        let store = MemoryStore::new();
        store.insert(&insert_author(None, "a")).await.unwrap();
        let err = store.insert(&insert_author(None, "a")).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));

        let orphan = Insert {
            table: &BOOK,
            values: vec![
                ("title", json!("t")),
                ("author_id", json!(99)),
                ("published_at", json!("2020-01-01")),
            ],
        };
        let err = store.insert(&orphan).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn select_filters_orders_and_pages() {
        let store = MemoryStore::new();
        for name in ["b", "c", "a"] {
            store.insert(&insert_author(None, name)).await.unwrap();
        }
        let stmt = Select::all(&AUTHOR)
            .order_by(vec![OrderTerm::desc("name")])
            .limit(2);
        let rows = store.select(&stmt).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("c"), json!("b")]);

        let stmt = Select::all(&AUTHOR).filter(Condition::ge("id", 2));
        assert_eq!(store.select(&stmt).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_counts_matches_and_keeps_primary_key() {
        let store = MemoryStore::new();
        store.insert(&insert_author(None, "a")).await.unwrap();
        let stmt = Update {
            table: &AUTHOR,
            values: vec![("id", json!(40)), ("name", json!("z"))],
            condition: Condition::eq("id", 1),
        };
        assert_eq!(store.update(&stmt).await.unwrap(), 1);
        let rows = store.select(&Select::all(&AUTHOR)).await.unwrap();
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[0]["name"], json!("z"));

        let missing = Update {
            condition: Condition::eq("id", 2),
            ..stmt
        };
        assert_eq!(store.update(&missing).await.unwrap(), 0);
    }
}
