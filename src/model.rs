//! Authors and books as returned by the API, and their sort/filter columns.

use crate::error::AppError;
use crate::query::Column;
use crate::store::{get_date, get_i64, get_string, Row};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorColumn {
    Id,
    Name,
}

impl AuthorColumn {
    /// Tokens accepted in the `sort` query parameter.
    pub const SORT_KEYS: &'static [(&'static str, AuthorColumn)] =
        &[("id", AuthorColumn::Id), ("name", AuthorColumn::Name)];
}

impl Column for AuthorColumn {
    fn field(&self) -> &'static str {
        match self {
            AuthorColumn::Id => "id",
            AuthorColumn::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookColumn {
    Id,
    Title,
    AuthorId,
    PublishedAt,
}

impl BookColumn {
    pub const SORT_KEYS: &'static [(&'static str, BookColumn)] = &[
        ("id", BookColumn::Id),
        ("title", BookColumn::Title),
        ("author-id", BookColumn::AuthorId),
        ("published-at", BookColumn::PublishedAt),
    ];
}

impl Column for BookColumn {
    fn field(&self) -> &'static str {
        match self {
            BookColumn::Id => "id",
            BookColumn::Title => "title",
            BookColumn::AuthorId => "author_id",
            BookColumn::PublishedAt => "published_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl TryFrom<Row> for Author {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Author {
            id: get_i64(&row, "id")?,
            name: get_string(&row, "name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub published_at: NaiveDate,
}

impl TryFrom<Row> for Book {
    type Error = AppError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Book {
            id: get_i64(&row, "id")?,
            title: get_string(&row, "title")?,
            author_id: get_i64(&row, "author_id")?,
            published_at: get_date(&row, "published_at")?,
        })
    }
}

/// Fields a PATCH may carry; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AuthorPatch {
    pub name: Option<String>,
}

impl Author {
    pub fn patched(self, patch: AuthorPatch) -> Author {
        Author {
            id: self.id,
            name: patch.name.unwrap_or(self.name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub published_at: Option<NaiveDate>,
}

impl Book {
    pub fn patched(self, patch: BookPatch) -> Book {
        Book {
            id: self.id,
            title: patch.title.unwrap_or(self.title),
            author_id: patch.author_id.unwrap_or(self.author_id),
            published_at: patch.published_at.unwrap_or(self.published_at),
        }
    }
}

/// Storage encoding of a date column value.
pub fn date_value(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn book_maps_from_row_and_serializes_camel_case() {
        let book = Book::try_from(row(json!({
            "id": 1, "title": "t", "author_id": 2, "published_at": "2018-03-01"
        })))
        .unwrap();
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({"id": 1, "title": "t", "authorId": 2, "publishedAt": "2018-03-01"})
        );
    }

    #[test]
    fn incomplete_row_is_a_store_error() {
        assert!(Author::try_from(row(json!({"id": 1}))).is_err());
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let book = Book {
            id: 1,
            title: "sample".into(),
            author_id: 1,
            published_at: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        };
        let patched = book.clone().patched(BookPatch {
            title: Some("patched".into()),
            ..Default::default()
        });
        assert_eq!(patched.title, "patched");
        assert_eq!(patched.author_id, book.author_id);
        assert_eq!(patched.published_at, book.published_at);
    }

    #[test]
    fn sort_keys_bind_to_storage_fields() {
        let fields: Vec<_> = BookColumn::SORT_KEYS.iter().map(|(_, c)| c.field()).collect();
        assert_eq!(fields, vec!["id", "title", "author_id", "published_at"]);
    }
}
