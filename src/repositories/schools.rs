use sqlx::PgPool;

use crate::db::models::School;

pub(crate) async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<School>, sqlx::Error> {
    sqlx::query_as::<_, School>("SELECT id, name, created_at FROM schools WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<School, sqlx::Error> {
    sqlx::query_as::<_, School>(
        "INSERT INTO schools (id, name, created_at) VALUES ($1, $2, $3)
         RETURNING id, name, created_at",
    )
    .bind(id)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}
