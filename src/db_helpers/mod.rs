use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod category_helpers;
mod comment_helpers;
mod post_helpers;
mod user_helpers;

pub use category_helpers::*;
pub use comment_helpers::*;
pub use post_helpers::*;
pub use user_helpers::*;

// ----------------- Shared lookups -----------------

const USER_COLUMNS: &str =
    "id, username, email, password, first_name, last_name, created_at";

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(username)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}
