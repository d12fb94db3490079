//! /books handlers.

use super::params::{self, IntOrString, QueryParams};
use crate::error::AppError;
use crate::model::BookPatch;
use crate::service::{BookSearch, NewBook, RequestValidator};
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
#[serde(rename_all = "camelCase")]
struct CreateBook {
    title: String,
    author_id: IntOrString,
    published_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchBook {
    title: Option<String>,
    author_id: Option<IntOrString>,
    published_at: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let search = BookSearch {
        title: params::text(&query, "title"),
        author_id: params::optional_i64(&query, "author-id")?,
        published_from: params::optional_date(&query, "published-from")?,
        published_to: params::optional_date(&query, "published-to")?,
        sort: params::text(&query, "sort"),
        page: params::page(&query)?,
    };
    let books = state.books.search(&search).await?;
    Ok(Json(books))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body: CreateBook = params::body(body)?;
    RequestValidator::required_text("title", &body.title)?;
    let new_book = NewBook {
        title: body.title,
        author_id: body.author_id.to_i64("authorId")?,
        published_at: params::body_date("publishedAt", &body.published_at)?,
    };
    let book = state.books.register(&new_book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = params::path_id(&id)?;
    let book = state
        .books
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    Ok(Json(book))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = params::path_id(&id)?;
    let body: PatchBook = params::body(body)?;
    RequestValidator::optional_text("title", body.title.as_deref())?;
    let patch = BookPatch {
        title: body.title,
        author_id: body
            .author_id
            .map(|a| a.to_i64("authorId"))
            .transpose()?,
        published_at: body
            .published_at
            .map(|d| params::body_date("publishedAt", &d))
            .transpose()?,
    };
    let current = state
        .books
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", id)))?;
    if state.books.update(&current.patched(patch)).await? == 0 {
        return Err(AppError::NotFound(format!("book {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
