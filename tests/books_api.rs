mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

async fn catalogue() -> axum::Router {
    let app = test_app();
    seed_authors(&app, &["author1", "writer2"]).await;
    seed_books(
        &app,
        &[
            ("aaaa", 1, "2018-01-01"),
            ("cccc", 1, "2018-02-01"),
            ("bbbb", 1, "2018-03-01"),
            ("dddd", 2, "2019-01-01"),
        ],
    )
    .await;
    app
}

#[tokio::test]
async fn sort_by_title() {
    let app = catalogue().await;
    let (status, body) = get(&app, "/books?sort=title").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 3, 2, 4]);
    let (_, body) = get(&app, "/books?sort=-author-id,title").await;
    assert_eq!(ids(&body), vec![4, 1, 3, 2]);
}

#[tokio::test]
async fn filters_combine() {
    let app = catalogue().await;
    let (_, body) = get(&app, "/books?author-id=1").await;
    assert_eq!(ids(&body), vec![1, 2, 3]);
    let (_, body) = get(&app, "/books?author-id=").await;
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
    let (_, body) = get(&app, "/books?published-from=2018-02-01&published-to=2018-12-31").await;
    assert_eq!(ids(&body), vec![2, 3]);
    let (_, body) = get(&app, "/books?title=dd&author-id=1").await;
    assert_eq!(ids(&body), Vec::<i64>::new());
}

#[tokio::test]
async fn each_date_bound_applies_alone_and_is_inclusive() {
    let app = catalogue().await;
    let (_, body) = get(&app, "/books?published-from=2018-03-01").await;
    assert_eq!(ids(&body), vec![3, 4]);
    let (_, body) = get(&app, "/books?published-to=2018-02-01").await;
    assert_eq!(ids(&body), vec![1, 2]);
    let (_, body) = get(&app, "/books?published-from=2019-01-02").await;
    assert_eq!(ids(&body), Vec::<i64>::new());
    let (_, body) = get(&app, "/books?published-from=&published-to=2018-01-01").await;
    assert_eq!(ids(&body), vec![1]);
}

#[tokio::test]
async fn malformed_filters_are_bad_requests() {
    let app = catalogue().await;
    for uri in [
        "/books?author-id=one",
        "/books?published-from=01/02/2018",
        "/books?limit=11",
    ] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn register_returns_store_assigned_id() {
    let app = catalogue().await;
    let (status, body) = post(
        &app,
        "/books",
        json!({"title": "new", "authorId": "2", "publishedAt": "2020-05-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"id": 5, "title": "new", "authorId": 2, "publishedAt": "2020-05-01"})
    );
    let (_, fetched) = get(&app, "/books/5").await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn duplicate_title_for_same_author_conflicts() {
    let app = catalogue().await;
    let (status, _) = post(
        &app,
        "/books",
        json!({"title": "aaaa", "authorId": 1, "publishedAt": "2020-01-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = post(
        &app,
        "/books",
        json!({"title": "aaaa", "authorId": 2, "publishedAt": "2020-01-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn invalid_book_bodies_are_unprocessable() {
    let app = catalogue().await;
    for body in [
        json!({"authorId": 1, "publishedAt": "2020-01-01"}),
        json!({"title": "t", "authorId": "x", "publishedAt": "2020-01-01"}),
        json!({"title": "t", "authorId": 1, "publishedAt": "yesterday"}),
        json!({"title": "t", "authorId": 77, "publishedAt": "2020-01-01"}),
    ] {
        let (status, _) = post(&app, "/books", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn missing_book_is_not_found() {
    let app = catalogue().await;
    let (status, _) = get(&app, "/books/12").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = patch(&app, "/books/12", json!({"title": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_title_keeps_other_fields() {
    let app = catalogue().await;
    let (status, _) = patch(&app, "/books/1", json!({"title": "patched"})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, "/books/1").await;
    assert_eq!(
        body,
        json!({"id": 1, "title": "patched", "authorId": 1, "publishedAt": "2018-01-01"})
    );

    let (status, _) = patch(&app, "/books/1", json!({"authorId": 2, "publishedAt": "2021-07-04"})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = get(&app, "/books/1").await;
    assert_eq!(body["authorId"], 2);
    assert_eq!(body["publishedAt"], "2021-07-04");
    assert_eq!(body["title"], "patched");

    let (status, _) = patch(&app, "/books/1", json!({"authorId": 99})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
