use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Category};

/// Resolves a category for its feed page. Unpublished categories are not
/// resolved at all, so they read as not-found rather than forbidden.
pub async fn get_published_category_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<Category>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Category>(
        "SELECT id, title, description, slug, is_published, created_at \
         FROM categories WHERE slug = $1 AND is_published = 1",
    )
    .bind(slug)
    .fetch_optional(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}
