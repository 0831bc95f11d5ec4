use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};

use crate::data_formats::{CreatePostRequest, UpdatePostRequest};
use crate::errors::RequestError;
use crate::models::{FeedPost, Post};
use crate::policy::{self, Viewer};

/// Fixed page size consumed by the external paginator.
pub const PAGE_SIZE: u32 = 10;

const POST_COLUMNS: &str = "id, title, text, image, pub_date, is_published, created_at, \
                            author_id, category_id, location_id";

/// One query serves every listing context. `$1`/`$2` narrow the rows to a
/// profile or a category; `$3` is the owner bypass and is only ever non-null
/// for a profile feed viewed by its owner, in which case the public
/// visibility predicate is lifted for that author's rows.
const FEED_QUERY: &str = r#"
        SELECT posts.id                AS id,
               posts.title             AS title,
               posts.text              AS text,
               posts.image             AS image,
               posts.pub_date          AS pub_date,
               posts.is_published      AS is_published,
               posts.created_at        AS created_at,
               posts.author_id         AS author_id,
               users.username          AS author_username,
               posts.category_id       AS category_id,
               categories.title        AS category_title,
               categories.slug         AS category_slug,
               categories.is_published AS category_is_published,
               posts.location_id       AS location_id,
               locations.name          AS location_name,
               (SELECT COUNT(*)
                FROM   comments
                WHERE  comments.post_id = posts.id) AS comment_count
        FROM   posts
            JOIN users
                ON posts.author_id = users.id
            LEFT JOIN categories
                ON posts.category_id = categories.id
            LEFT JOIN locations
                ON posts.location_id = locations.id
        WHERE  ( users.username = $1
                 OR $1 IS NULL )
           AND ( categories.slug = $2
                 OR $2 IS NULL )
           AND ( posts.author_id = $3
                 OR ( posts.is_published = 1
                      AND posts.pub_date <= $4
                      AND ( posts.category_id IS NULL
                            OR categories.is_published = 1 ) ) )
        ORDER  BY posts.pub_date DESC, posts.id ASC
        LIMIT  $5 OFFSET $6
    "#;

const SINGLE_POST_QUERY: &str = r#"
        SELECT posts.id                AS id,
               posts.title             AS title,
               posts.text              AS text,
               posts.image             AS image,
               posts.pub_date          AS pub_date,
               posts.is_published      AS is_published,
               posts.created_at        AS created_at,
               posts.author_id         AS author_id,
               users.username          AS author_username,
               posts.category_id       AS category_id,
               categories.title        AS category_title,
               categories.slug         AS category_slug,
               categories.is_published AS category_is_published,
               posts.location_id       AS location_id,
               locations.name          AS location_name,
               (SELECT COUNT(*)
                FROM   comments
                WHERE  comments.post_id = posts.id) AS comment_count
        FROM   posts
            JOIN users
                ON posts.author_id = users.id
            LEFT JOIN categories
                ON posts.category_id = categories.id
            LEFT JOIN locations
                ON posts.location_id = locations.id
        WHERE  posts.id = $1
    "#;

/// Which listing is being assembled. Global and category feeds are always
/// public-only; a profile feed may be widened for its owner.
#[derive(Debug, Clone, Copy)]
pub enum FeedContext<'a> {
    Global,
    Category(&'a str),
    Profile { username: &'a str, owner_id: i64 },
}

pub async fn list_posts(
    pool: &SqlitePool,
    context: FeedContext<'_>,
    viewer: Viewer,
    page: u32,
) -> Result<Vec<FeedPost>, RequestError> {
    let (username, slug, owner_bypass) = match context {
        FeedContext::Global => (None, None, None),
        FeedContext::Category(slug) => (None, Some(slug), None),
        FeedContext::Profile { username, owner_id } => (
            Some(username),
            None,
            policy::feed_owner_bypass(owner_id, viewer),
        ),
    };
    let page = page.max(1);
    let limit = PAGE_SIZE as i64;
    let offset = (page as i64 - 1) * limit;

    let mut tx = pool.begin().await?;
    let posts = sqlx::query_as::<Sqlite, FeedPost>(FEED_QUERY)
        .bind(username)
        .bind(slug)
        .bind(owner_bypass)
        .bind(Utc::now())
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(posts)
}

/// Joined row by id, with no visibility applied; the caller runs the policy
/// check so a hidden post collapses into not-found.
pub async fn get_post_with_meta(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Option<FeedPost>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, FeedPost>(SINGLE_POST_QUERY)
        .bind(post_id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// Bare row for ownership checks ahead of a mutation.
pub async fn get_post_by_id(pool: &SqlitePool, post_id: i64) -> Result<Option<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(post_id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// `author_id` comes from the authenticated token, never from the request
/// body.
pub async fn create_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    request: CreatePostRequest,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let pub_date = request.pub_date.unwrap_or_else(Utc::now);
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO posts (title, text, image, pub_date, is_published, author_id, category_id, location_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(request.title)
    .bind(request.text)
    .bind(request.image)
    .bind(pub_date)
    .bind(request.is_published)
    .bind(author_id)
    .bind(request.category_id)
    .bind(request.location_id)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Partial update; absent fields keep their stored value. Ownership has
/// already been established by the caller.
pub async fn update_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
    request: UpdatePostRequest,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE posts
        SET    title        = COALESCE($1, title),
               text         = COALESCE($2, text),
               image        = COALESCE($3, image),
               pub_date     = COALESCE($4, pub_date),
               is_published = COALESCE($5, is_published),
               category_id  = COALESCE($6, category_id),
               location_id  = COALESCE($7, location_id)
        WHERE  id = $8
        "#,
    )
    .bind(request.title)
    .bind(request.text)
    .bind(request.image)
    .bind(request.pub_date)
    .bind(request.is_published)
    .bind(request.category_id)
    .bind(request.location_id)
    .bind(post_id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Removes the post and its comments in one transaction.
pub async fn delete_post_in_db(pool: &SqlitePool, post_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
