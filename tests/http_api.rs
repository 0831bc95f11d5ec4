//! End-to-end checks over the wire, teacher-free-port style: a real server,
//! a real client, redirects left unfollowed so the soft-fail behavior is
//! observable.

use blogapi::{get_random_free_port, make_router, serve_app};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use std::time::Duration;

async fn spawn_server() -> (String, SqlitePool) {
    std::env::set_var("JWT_SECRET", "integration-test-secret");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let (port, addr) = get_random_free_port();
    let router = make_router();
    let server_pool = pool.clone();
    tokio::spawn(async move {
        serve_app(router, addr, server_pool).await.unwrap();
    });

    let base = format!("http://127.0.0.1:{port}");
    let client = Client::new();
    for _ in 0..50 {
        if client.get(format!("{base}/check_health")).send().await.is_ok() {
            return (base, pool);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not come up");
}

fn client() -> Client {
    Client::builder().redirect(Policy::none()).build().unwrap()
}

async fn register(client: &Client, base: &str, username: &str) -> String {
    let response = client
        .post(format!("{base}/users"))
        .json(&json!({
            "user": {
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "hunter2hunter2",
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    body["user"]["token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn non_author_edit_redirects_to_detail_and_changes_nothing() {
    let (base, pool) = spawn_server().await;
    let client = client();
    let alice = register(&client, &base, "alice").await;
    let mallory = register(&client, &base, "mallory").await;

    let created = client
        .post(format!("{base}/posts"))
        .header("Authorization", format!("Token {alice}"))
        .json(&json!({ "title": "original", "text": "body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        created.headers()["location"].to_str().unwrap(),
        "/profiles/alice"
    );

    let post_id = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();

    let denied = client
        .put(format!("{base}/posts/{post_id}"))
        .header("Authorization", format!("Token {mallory}"))
        .json(&json!({ "title": "defaced" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        denied.headers()["location"].to_str().unwrap(),
        format!("/posts/{post_id}")
    );

    let title = sqlx::query_scalar::<Sqlite, String>("SELECT title FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "original");
}

#[tokio::test]
async fn hidden_post_detail_is_a_plain_404_for_strangers() {
    let (base, pool) = spawn_server().await;
    let client = client();
    let alice = register(&client, &base, "alice").await;
    let bob = register(&client, &base, "bob").await;

    let created = client
        .post(format!("{base}/posts"))
        .header("Authorization", format!("Token {alice}"))
        .json(&json!({ "title": "draft", "text": "body", "is_published": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::SEE_OTHER);

    let post_id = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM posts")
        .fetch_one(&pool)
        .await
        .unwrap();

    // Indistinguishable from a post that never existed.
    for token in [None, Some(&bob)] {
        let mut request = client.get(format!("{base}/posts/{post_id}"));
        if let Some(token) = token {
            request = request.header("Authorization", format!("Token {token}"));
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let own_view = client
        .get(format!("{base}/posts/{post_id}"))
        .header("Authorization", format!("Token {alice}"))
        .send()
        .await
        .unwrap();
    assert_eq!(own_view.status(), StatusCode::OK);
    let body: Value = own_view.json().await.unwrap();
    assert_eq!(body["post"]["title"], "draft");
}

#[tokio::test]
async fn comment_edit_via_the_wrong_post_path_is_not_found() {
    let (base, pool) = spawn_server().await;
    let client = client();
    let alice = register(&client, &base, "alice").await;

    for title in ["first", "second"] {
        let created = client
            .post(format!("{base}/posts"))
            .header("Authorization", format!("Token {alice}"))
            .json(&json!({ "title": title, "text": "body" }))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::SEE_OTHER);
    }
    let ids = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM posts ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    let (first, second) = (ids[0], ids[1]);

    let commented = client
        .post(format!("{base}/posts/{first}/comments"))
        .header("Authorization", format!("Token {alice}"))
        .json(&json!({ "text": "mine" }))
        .send()
        .await
        .unwrap();
    assert_eq!(commented.status(), StatusCode::SEE_OTHER);
    let comment_id = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();

    let mismatched = client
        .put(format!("{base}/posts/{second}/comments/{comment_id}"))
        .header("Authorization", format!("Token {alice}"))
        .json(&json!({ "text": "moved?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(mismatched.status(), StatusCode::NOT_FOUND);

    let matched = client
        .put(format!("{base}/posts/{first}/comments/{comment_id}"))
        .header("Authorization", format!("Token {alice}"))
        .json(&json!({ "text": "edited" }))
        .send()
        .await
        .unwrap();
    assert_eq!(matched.status(), StatusCode::SEE_OTHER);
}
