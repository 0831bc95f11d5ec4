use chrono::{DateTime, NaiveDateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub post_id: i64,
    pub author_id: i64,
}

/// A post row joined with its author, category and location, annotated with
/// its live comment count. Listings and the detail view both read this shape,
/// so no per-row follow-up lookups are needed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedPost {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub author_id: i64,
    pub author_username: String,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentWithAuthor {
    pub id: i64,
    pub text: String,
    pub created_at: NaiveDateTime,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
}
