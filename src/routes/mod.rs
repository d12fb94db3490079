//! Router assembly.

mod common;

pub use common::common_routes;

use crate::handlers::{author, book};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/authors", get(author::list).post(author::create))
        .route("/authors/:id", get(author::read).patch(author::update))
        .route("/authors/:id/books", get(author::books))
        .route("/books", get(book::list).post(book::create))
        .route("/books/:id", get(book::read).patch(book::update))
}

/// The full application: resource and common routes with request tracing and a
/// request body cap of `body_limit` bytes.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(resource_routes())
        .merge(common_routes())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
