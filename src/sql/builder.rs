//! Renders `Select`, `Insert` and `Update` into parameterized PostgreSQL.
//! Identifiers come only from table descriptors; values are always parameters.

use crate::query::{Condition, Insert, OrderTerm, Select, Table, Update};
use serde_json::Value;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Bind `v` and return its placeholder, cast to the column's type when known.
    fn placeholder(&mut self, table: &Table, column: &str, v: Value) -> String {
        let n = self.push_param(v);
        table
            .column(column)
            .map(|c| format!("${}::{}", n, c.cast))
            .unwrap_or_else(|| format!("${}", n))
    }
}

fn select_column_list(table: &Table) -> String {
    table
        .column_names()
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_condition(q: &mut QueryBuf, table: &Table, condition: &Condition) -> String {
    match condition {
        Condition::True => "TRUE".to_string(),
        Condition::Like { column, pattern } => {
            let n = q.push_param(Value::String(pattern.clone()));
            format!("{} LIKE ${} ESCAPE '\\'", quoted(column), n)
        }
        Condition::Eq { column, value } => {
            let ph = q.placeholder(table, column, value.clone());
            format!("{} = {}", quoted(column), ph)
        }
        Condition::Ge { column, value } => {
            let ph = q.placeholder(table, column, value.clone());
            format!("{} >= {}", quoted(column), ph)
        }
        Condition::Le { column, value } => {
            let ph = q.placeholder(table, column, value.clone());
            format!("{} <= {}", quoted(column), ph)
        }
        Condition::And(parts) => parts
            .iter()
            .map(|p| format!("({})", render_condition(q, table, p)))
            .collect::<Vec<_>>()
            .join(" AND "),
    }
}

fn where_clause(q: &mut QueryBuf, table: &Table, condition: &Condition) -> String {
    if condition.is_true() {
        String::new()
    } else {
        format!(" WHERE {}", render_condition(q, table, condition))
    }
}

fn order_clause(order: &[OrderTerm]) -> String {
    if order.is_empty() {
        return String::new();
    }
    let terms: Vec<String> = order
        .iter()
        .map(|t| {
            format!(
                "{} {}",
                quoted(t.column),
                if t.ascending { "ASC" } else { "DESC" }
            )
        })
        .collect();
    format!(" ORDER BY {}", terms.join(", "))
}

/// SELECT columns FROM table [WHERE ..] ORDER BY .. [LIMIT n] OFFSET m.
pub fn select(stmt: &Select) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = stmt.table;
    let where_clause = where_clause(&mut q, table, &stmt.condition);
    let limit_clause = stmt
        .limit
        .map(|n| format!(" LIMIT {}", n))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{} OFFSET {}",
        select_column_list(table),
        quoted(table.name),
        where_clause,
        order_clause(&stmt.order),
        limit_clause,
        stmt.offset
    );
    q
}

/// INSERT the supplied values and return the full stored row.
pub fn insert(stmt: &Insert) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = stmt.table;
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, value) in &stmt.values {
        cols.push(quoted(name));
        placeholders.push(q.placeholder(table, name, value.clone()));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.name),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table)
    );
    q
}

/// UPDATE .. SET col = value, .. WHERE condition. The primary key is never assigned.
pub fn update(stmt: &Update) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = stmt.table;
    let mut sets = Vec::new();
    for (name, value) in &stmt.values {
        if *name == table.primary_key {
            continue;
        }
        let ph = q.placeholder(table, name, value.clone());
        sets.push(format!("{} = {}", quoted(name), ph));
    }
    let where_clause = where_clause(&mut q, table, &stmt.condition);
    q.sql = format!(
        "UPDATE {} SET {}{}",
        quoted(table.name),
        sets.join(", "),
        where_clause
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Condition, Page};
    use crate::schema::{AUTHOR, BOOK};
    use serde_json::json;

    #[test]
    fn select_without_filters_has_no_where() {
        let q = select(&Select::all(&AUTHOR));
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\" FROM \"author\" ORDER BY \"id\" ASC OFFSET 0"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_with_like_order_and_page() {
        let stmt = Select::all(&AUTHOR)
            .filter(Condition::contains("name", "a_b"))
            .order_by(vec![OrderTerm::desc("name"), OrderTerm::asc("id")])
            .page(Page::new(1, 2).unwrap());
        let q = select(&stmt);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\" FROM \"author\" WHERE \"name\" LIKE $1 ESCAPE '\\' \
             ORDER BY \"name\" DESC, \"id\" ASC LIMIT 2 OFFSET 1"
        );
        assert_eq!(q.params, vec![json!("%a\\_b%")]);
    }

    #[test]
    fn conjunction_binds_params_in_order_with_casts() {
        let condition = Condition::eq("author_id", 2)
            .and(Condition::ge("published_at", "2018-01-02"))
            .and(Condition::le("published_at", "2018-02-28"));
        let q = select(&Select::all(&BOOK).filter(condition));
        assert!(q.sql.contains(
            "WHERE (\"author_id\" = $1::int8) AND (\"published_at\" >= $2::date) \
             AND (\"published_at\" <= $3::date)"
        ));
        assert_eq!(q.params, vec![json!(2), json!("2018-01-02"), json!("2018-02-28")]);
    }

    #[test]
    fn insert_returns_all_columns() {
        let q = insert(&Insert {
            table: &AUTHOR,
            values: vec![("name", json!("author1"))],
        });
        assert_eq!(
            q.sql,
            "INSERT INTO \"author\" (\"name\") VALUES ($1::text) RETURNING \"id\", \"name\""
        );
    }

    #[test]
    fn update_skips_primary_key_and_binds_where_last() {
        let q = update(&Update {
            table: &BOOK,
            values: vec![
                ("id", json!(1)),
                ("title", json!("patched")),
                ("author_id", json!(1)),
                ("published_at", json!("2020-01-01")),
            ],
            condition: Condition::eq("id", 1),
        });
        assert_eq!(
            q.sql,
            "UPDATE \"book\" SET \"title\" = $1::text, \"author_id\" = $2::int8, \
             \"published_at\" = $3::date WHERE \"id\" = $4::int8"
        );
        assert_eq!(q.params.len(), 4);
    }
}
