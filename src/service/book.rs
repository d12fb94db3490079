//! Book search, lookup, registration and update.

use crate::error::AppError;
use crate::model::{date_value, Book, BookColumn};
use crate::query::{
    true_if_empty, true_if_none, Column, Condition, Insert, Page, Select, SortSpec, Update,
};
use crate::schema::BOOK;
use crate::store::Store;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

/// Search input. Every filter is optional; the date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct BookSearch {
    pub title: String,
    pub author_id: Option<i64>,
    pub published_from: Option<NaiveDate>,
    pub published_to: Option<NaiveDate>,
    pub sort: String,
    pub page: Page,
}

impl BookSearch {
    fn condition(&self) -> Condition {
        true_if_empty(&self.title, |title| {
            Condition::contains(BookColumn::Title.field(), title)
        })
        .and(true_if_none(self.author_id, |id| {
            Condition::eq(BookColumn::AuthorId.field(), id)
        }))
        .and(true_if_none(self.published_from, |from| {
            Condition::ge(BookColumn::PublishedAt.field(), date_value(from))
        }))
        .and(true_if_none(self.published_to, |to| {
            Condition::le(BookColumn::PublishedAt.field(), date_value(to))
        }))
    }
}

/// Fields of a book that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author_id: i64,
    pub published_at: NaiveDate,
}

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn Store>,
}

impl BookService {
    pub const DEFAULT_SORT: &'static [(BookColumn, bool)] = &[
        (BookColumn::Id, true),
        (BookColumn::Title, true),
        (BookColumn::AuthorId, true),
    ];

    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn search(&self, params: &BookSearch) -> Result<Vec<Book>, AppError> {
        let sort = SortSpec::parse(&params.sort, BookColumn::SORT_KEYS).or_default(Self::DEFAULT_SORT);
        let stmt = Select::all(&BOOK)
            .filter(params.condition())
            .order_by(sort.to_order_terms(BOOK.primary_key))
            .page(params.page);
        self.store
            .select(&stmt)
            .await?
            .into_iter()
            .map(Book::try_from)
            .collect()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Book>, AppError> {
        let stmt = Select::all(&BOOK)
            .filter(Condition::eq(BookColumn::Id.field(), id))
            .limit(1);
        self.store
            .select(&stmt)
            .await?
            .into_iter()
            .next()
            .map(Book::try_from)
            .transpose()
    }

    /// Insert a book unless the same author already has one whose title contains
    /// `book.title`.
    pub async fn register(&self, book: &NewBook) -> Result<Book, AppError> {
        let existing = self
            .search(&BookSearch {
                title: book.title.clone(),
                author_id: Some(book.author_id),
                ..Default::default()
            })
            .await?;
        if !existing.is_empty() {
            tracing::warn!(
                title = %book.title,
                author_id = book.author_id,
                "book already registered"
            );
            return Err(AppError::Duplicate(format!(
                "author {} already has a book titled '{}'",
                book.author_id, book.title
            )));
        }
        let row = self
            .store
            .insert(&Insert {
                table: &BOOK,
                values: vec![
                    (BookColumn::Title.field(), Value::from(book.title.as_str())),
                    (BookColumn::AuthorId.field(), Value::from(book.author_id)),
                    (BookColumn::PublishedAt.field(), date_value(book.published_at)),
                ],
            })
            .await?;
        let created = Book::try_from(row)?;
        tracing::info!(id = created.id, author_id = created.author_id, "book registered");
        Ok(created)
    }

    pub async fn update(&self, book: &Book) -> Result<u64, AppError> {
        self.store
            .update(&Update {
                table: &BOOK,
                values: vec![
                    (BookColumn::Title.field(), Value::from(book.title.as_str())),
                    (BookColumn::AuthorId.field(), Value::from(book.author_id)),
                    (BookColumn::PublishedAt.field(), date_value(book.published_at)),
                ],
                condition: Condition::eq(BookColumn::Id.field(), book.id),
            })
            .await
    }
}
