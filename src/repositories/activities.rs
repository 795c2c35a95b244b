use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Activity, ActivityImage};

const COLUMNS: &str = "\
    id, creator_id, school_id, theme_id, title, complexity, initial_date, final_date, \
    objective, diagnostic, meta, resources, participants, evaluation_indicator, \
    evaluation_method, is_finished, report, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!("SELECT {COLUMNS} FROM activities WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive substring match on title, unfinished activities only.
pub(crate) async fn search_unfinished_by_title(
    pool: &PgPool,
    title: &str,
) -> Result<Vec<Activity>, sqlx::Error> {
    let pattern = format!("%{}%", title.replace('%', "\\%").replace('_', "\\_"));
    sqlx::query_as::<_, Activity>(&format!(
        "SELECT {COLUMNS} FROM activities
         WHERE is_finished = FALSE AND title ILIKE $1
         ORDER BY created_at DESC",
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Newest unfinished activities system-wide.
pub(crate) async fn list_recent_unfinished(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!(
        "SELECT {COLUMNS} FROM activities
         WHERE is_finished = FALSE
         ORDER BY created_at DESC
         LIMIT $1",
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) struct ListActivitiesParams<'a> {
    pub is_finished: Option<bool>,
    pub school_id: Option<&'a str>,
    pub year: Option<i32>,
}

pub(crate) async fn list(
    pool: &PgPool,
    params: ListActivitiesParams<'_>,
) -> Result<Vec<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!(
        "SELECT {COLUMNS} FROM activities
         WHERE ($1::boolean IS NULL OR is_finished = $1)
           AND ($2::varchar IS NULL OR school_id = $2)
           AND ($3::integer IS NULL OR EXTRACT(YEAR FROM final_date)::integer = $3)
         ORDER BY created_at DESC",
    ))
    .bind(params.is_finished)
    .bind(params.school_id)
    .bind(params.year)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateActivity<'a> {
    pub id: &'a str,
    pub creator_id: &'a str,
    pub school_id: &'a str,
    pub theme_id: &'a str,
    pub title: &'a str,
    pub complexity: i32,
    pub initial_date: PrimitiveDateTime,
    pub final_date: PrimitiveDateTime,
    pub objective: &'a str,
    pub diagnostic: &'a str,
    pub meta: &'a str,
    pub resources: &'a str,
    pub participants: &'a str,
    pub evaluation_indicator: &'a str,
    pub evaluation_method: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateActivity<'_>,
) -> Result<Activity, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!(
        "INSERT INTO activities (
            id, creator_id, school_id, theme_id, title, complexity, initial_date, final_date,
            objective, diagnostic, meta, resources, participants, evaluation_indicator,
            evaluation_method, is_finished, report, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,FALSE,NULL,$16,$16)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.creator_id)
    .bind(params.school_id)
    .bind(params.theme_id)
    .bind(params.title)
    .bind(params.complexity)
    .bind(params.initial_date)
    .bind(params.final_date)
    .bind(params.objective)
    .bind(params.diagnostic)
    .bind(params.meta)
    .bind(params.resources)
    .bind(params.participants)
    .bind(params.evaluation_indicator)
    .bind(params.evaluation_method)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

/// Terminal Draft -> Finished transition; attaches the report text.
pub(crate) async fn finish(
    pool: &PgPool,
    id: &str,
    report: &str,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE activities SET is_finished = TRUE, report = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(report)
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM activities WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_image(
    pool: &PgPool,
    id: &str,
    activity_id: &str,
    kind: &str,
    url: &str,
    order_index: i32,
    created_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO activity_images (id, activity_id, kind, url, order_index, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)",
    )
    .bind(id)
    .bind(activity_id)
    .bind(kind)
    .bind(url)
    .bind(order_index)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn list_images(
    pool: &PgPool,
    activity_id: &str,
    kind: &str,
) -> Result<Vec<ActivityImage>, sqlx::Error> {
    sqlx::query_as::<_, ActivityImage>(
        "SELECT id, activity_id, kind, url, order_index, created_at
         FROM activity_images
         WHERE activity_id = $1 AND kind = $2
         ORDER BY order_index",
    )
    .bind(activity_id)
    .bind(kind)
    .fetch_all(pool)
    .await
}
