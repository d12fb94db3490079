//! /authors handlers.

use super::params::{self, QueryParams};
use crate::error::AppError;
use crate::model::{AuthorPatch, Book};
use crate::service::{AuthorSearch, BookSearch, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct CreateAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PatchAuthor {
    name: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let search = AuthorSearch {
        name: params::text(&query, "name"),
        sort: params::text(&query, "sort"),
        page: params::page(&query)?,
    };
    let authors = state.authors.search(&search).await?;
    Ok(Json(authors))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body: CreateAuthor = params::body(body)?;
    RequestValidator::required_text("name", &body.name)?;
    let author = state.authors.register(&body.name).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = params::path_id(&id)?;
    let author = state
        .authors
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("author {}", id)))?;
    Ok(Json(author))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = params::path_id(&id)?;
    let body: PatchAuthor = params::body(body)?;
    RequestValidator::optional_text("name", body.name.as_deref())?;
    let current = state
        .authors
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("author {}", id)))?;
    let patched = current.patched(AuthorPatch { name: body.name });
    if state.authors.update(&patched).await? == 0 {
        return Err(AppError::NotFound(format!("author {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Books written by one author; `sort`, `offset` and `limit` behave as on /books.
pub async fn books(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let id = params::path_id(&id)?;
    if state.authors.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound(format!("author {}", id)));
    }
    let search = BookSearch {
        author_id: Some(id),
        sort: params::text(&query, "sort"),
        page: params::page(&query)?,
        ..Default::default()
    };
    let books: Vec<Book> = state.books.search(&search).await?;
    Ok(Json(books))
}
