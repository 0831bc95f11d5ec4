pub mod authentication;
pub mod data_formats;
pub mod db_helpers;
pub mod errors;
mod handlers;
pub mod models;
pub mod policy;

use anyhow::Context;
pub use anyhow::Result;
use axum::{routing::*, Extension, Router};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

pub use db_helpers::PAGE_SIZE;

pub async fn run_app(app: Router, address: SocketAddr) -> Result<()> {
    let db = init_db().await?;
    serve_app(app, address, db).await
}

pub async fn serve_app(app: Router, address: SocketAddr, db: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(db)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db() -> Result<SqlitePool> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
        tracing::info!("creating database {}", db_url);
        Sqlite::create_database(&db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(&db_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/users", post(register_user))
        .route("/users/login", post(login_user))
        .route("/user", get(get_current_user).put(update_profile))
        .route("/posts", get(global_feed).post(create_post))
        .route(
            "/posts/:post_id",
            get(get_post_detail).put(update_post).delete(delete_post),
        )
        .route("/posts/:post_id/comments", post(create_comment))
        .route(
            "/posts/:post_id/comments/:comment_id",
            put(update_comment).delete(delete_comment),
        )
        .route("/categories/:slug", get(category_feed))
        .route("/profiles/:username", get(profile_page))
        .fallback(not_found)
}
