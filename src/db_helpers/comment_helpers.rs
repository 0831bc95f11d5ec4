use sqlx::{Sqlite, SqlitePool};

use crate::{data_formats::CommentRequest, errors::RequestError, models::Comment};

use crate::models::CommentWithAuthor;

const COMMENT_COLUMNS: &str = "id, text, created_at, post_id, author_id";

/// `post_id` and `author_id` are bound from the request path and the token;
/// nothing in the body can point the comment elsewhere.
pub async fn create_comment_in_db(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    CommentRequest { text }: CommentRequest,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;

    let post_exists = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&mut tx)
        .await?;
    if post_exists.is_none() {
        return Err(RequestError::NotFound);
    }

    let query = format!(
        "INSERT INTO comments (text, post_id, author_id) VALUES ($1, $2, $3) \
         RETURNING {COMMENT_COLUMNS}"
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(text)
        .bind(post_id)
        .bind(author_id)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;

    Ok(result)
}

pub async fn get_comment_by_id(
    pool: &SqlitePool,
    comment_id: i64,
) -> Result<Option<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(comment_id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn update_comment_in_db(
    pool: &SqlitePool,
    comment_id: i64,
    CommentRequest { text }: CommentRequest,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE comments SET text = $1 WHERE id = $2")
        .bind(text)
        .bind(comment_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete_comment_in_db(pool: &SqlitePool, comment_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// All comments under a post, oldest first, with author usernames resolved.
pub async fn get_comments_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<CommentWithAuthor>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, CommentWithAuthor>(
        r#"
        SELECT comments.id         AS id,
               comments.text       AS text,
               comments.created_at AS created_at,
               comments.post_id    AS post_id,
               comments.author_id  AS author_id,
               users.username      AS author_username
        FROM   comments
            JOIN users
                ON comments.author_id = users.id
        WHERE  comments.post_id = $1
        ORDER  BY comments.created_at ASC, comments.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}
