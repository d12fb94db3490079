//! Author search, lookup, registration and update.

use crate::error::AppError;
use crate::model::{Author, AuthorColumn};
use crate::query::{true_if_empty, Column, Condition, Insert, Page, Select, SortSpec, Update};
use crate::schema::AUTHOR;
use crate::store::Store;
use serde_json::Value;
use std::sync::Arc;

/// Search input. `name` is a substring filter; empty matches every author.
#[derive(Debug, Clone, Default)]
pub struct AuthorSearch {
    pub name: String,
    pub sort: String,
    pub page: Page,
}

#[derive(Clone)]
pub struct AuthorService {
    store: Arc<dyn Store>,
}

impl AuthorService {
    pub const DEFAULT_SORT: &'static [(AuthorColumn, bool)] =
        &[(AuthorColumn::Id, true), (AuthorColumn::Name, true)];

    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn search(&self, params: &AuthorSearch) -> Result<Vec<Author>, AppError> {
        let sort = SortSpec::parse(&params.sort, AuthorColumn::SORT_KEYS).or_default(Self::DEFAULT_SORT);
        let condition = true_if_empty(&params.name, |name| {
            Condition::contains(AuthorColumn::Name.field(), name)
        });
        let stmt = Select::all(&AUTHOR)
            .filter(condition)
            .order_by(sort.to_order_terms(AUTHOR.primary_key))
            .page(params.page);
        self.store
            .select(&stmt)
            .await?
            .into_iter()
            .map(Author::try_from)
            .collect()
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Author>, AppError> {
        let stmt = Select::all(&AUTHOR)
            .filter(Condition::eq(AuthorColumn::Id.field(), id))
            .limit(1);
        self.store
            .select(&stmt)
            .await?
            .into_iter()
            .next()
            .map(Author::try_from)
            .transpose()
    }

    /// Insert a new author unless the name search already finds one.
    ///
    /// The pre-check is the substring search used by `search`, so an existing
    /// "author11" also blocks "author1". The store's unique key on `name` catches
    /// exact duplicates that race past the check.
    pub async fn register(&self, name: &str) -> Result<Author, AppError> {
        let existing = self
            .search(&AuthorSearch {
                name: name.to_string(),
                ..Default::default()
            })
            .await?;
        if !existing.is_empty() {
            tracing::warn!(name, matches = existing.len(), "author already registered");
            return Err(AppError::Duplicate(format!(
                "an author named '{}' already exists",
                name
            )));
        }
        let row = self
            .store
            .insert(&Insert {
                table: &AUTHOR,
                values: vec![(AuthorColumn::Name.field(), Value::from(name))],
            })
            .await?;
        let author = Author::try_from(row)?;
        tracing::info!(id = author.id, "author registered");
        Ok(author)
    }

    /// Overwrite every field of the author with `author.id`. Returns rows affected;
    /// zero when the id does not exist.
    pub async fn update(&self, author: &Author) -> Result<u64, AppError> {
        self.store
            .update(&Update {
                table: &AUTHOR,
                values: vec![(AuthorColumn::Name.field(), Value::from(author.name.as_str()))],
                condition: Condition::eq(AuthorColumn::Id.field(), author.id),
            })
            .await
    }
}
