use sqlx::PgPool;

use crate::db::models::Theme;

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Theme>, sqlx::Error> {
    sqlx::query_as::<_, Theme>("SELECT id, name FROM themes ORDER BY name").fetch_all(pool).await
}

pub(crate) async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM themes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}
