#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use books_api::{app, AppState, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

pub fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryStore::new())), 64 * 1024)
}

/// Send one request and return the status with the body parsed as JSON
/// (`Value::Null` for an empty body, a JSON string for plain text).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            let text = v.to_string();
            builder = builder
                .header("content-type", "application/json")
                .header("content-length", text.len());
            Body::from(text)
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn seed_authors(app: &Router, names: &[&str]) {
    for name in names {
        let (status, _) = post(app, "/authors", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED, "seeding author {}", name);
    }
}

pub async fn seed_books(app: &Router, books: &[(&str, i64, &str)]) {
    for (title, author_id, published_at) in books {
        let (status, _) = post(
            app,
            "/books",
            json!({ "title": title, "authorId": author_id, "publishedAt": published_at }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "seeding book {}", title);
    }
}

pub fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("JSON array")
        .iter()
        .map(|v| v["id"].as_i64().expect("id"))
        .collect()
}
