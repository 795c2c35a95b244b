use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{AtaImage, Meeting};

const COLUMNS: &str =
    "id, school_id, creator_id, date, description, room, ata, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Meeting>, sqlx::Error> {
    sqlx::query_as::<_, Meeting>(&format!("SELECT {COLUMNS} FROM meetings WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Pre-insert duplicate check for the (date, room) slot. Not a storage
/// constraint; concurrent creators can still race.
pub(crate) async fn exists_at_slot(
    pool: &PgPool,
    date: PrimitiveDateTime,
    room: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM meetings WHERE date = $1 AND room = $2")
            .bind(date)
            .bind(room)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Meetings for a school strictly before (past) or from (future) the pivot.
pub(crate) async fn list_by_school(
    pool: &PgPool,
    school_id: &str,
    pivot: PrimitiveDateTime,
    past: bool,
) -> Result<Vec<Meeting>, sqlx::Error> {
    let query = if past {
        format!("SELECT {COLUMNS} FROM meetings WHERE school_id = $1 AND date < $2 ORDER BY date DESC")
    } else {
        format!("SELECT {COLUMNS} FROM meetings WHERE school_id = $1 AND date >= $2 ORDER BY date")
    };

    sqlx::query_as::<_, Meeting>(&query).bind(school_id).bind(pivot).fetch_all(pool).await
}

pub(crate) struct CreateMeeting<'a> {
    pub id: &'a str,
    pub school_id: &'a str,
    pub creator_id: &'a str,
    pub date: PrimitiveDateTime,
    pub description: &'a str,
    pub room: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMeeting<'_>,
) -> Result<Meeting, sqlx::Error> {
    sqlx::query_as::<_, Meeting>(&format!(
        "INSERT INTO meetings (
            id, school_id, creator_id, date, description, room, ata, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,NULL,$7,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.school_id)
    .bind(params.creator_id)
    .bind(params.date)
    .bind(params.description)
    .bind(params.room)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn set_ata(
    pool: &PgPool,
    id: &str,
    ata: &str,
    updated_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE meetings SET ata = $1, updated_at = $2 WHERE id = $3")
        .bind(ata)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM meetings WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_ata_image(
    pool: &PgPool,
    id: &str,
    meeting_id: &str,
    url: &str,
    order_index: i32,
    created_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ata_images (id, meeting_id, url, order_index, created_at)
         VALUES ($1,$2,$3,$4,$5)",
    )
    .bind(id)
    .bind(meeting_id)
    .bind(url)
    .bind(order_index)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn list_ata_images(
    pool: &PgPool,
    meeting_id: &str,
) -> Result<Vec<AtaImage>, sqlx::Error> {
    sqlx::query_as::<_, AtaImage>(
        "SELECT id, meeting_id, url, order_index, created_at
         FROM ata_images WHERE meeting_id = $1 ORDER BY order_index",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
}
