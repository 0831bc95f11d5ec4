use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{RegisterRequest, UpdateProfileRequest},
    errors::RequestError,
    models::User,
};

use super::get_user_by_id;

pub async fn insert_user(pool: &SqlitePool, user: &RegisterRequest) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (email, username, password)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password, first_name, last_name, created_at
        "#,
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}

/// Partial update of the caller's own identity record. The id always comes
/// from the token; there is no way to aim this at another user.
pub async fn update_profile_in_db(
    pool: &SqlitePool,
    id: i64,
    UpdateProfileRequest {
        username,
        email,
        first_name,
        last_name,
    }: UpdateProfileRequest,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        UPDATE users
        SET    username   = COALESCE($1, username),
               email      = COALESCE($2, email),
               first_name = COALESCE($3, first_name),
               last_name  = COALESCE($4, last_name)
        WHERE  id = $5
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(id)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound),
    }
}
