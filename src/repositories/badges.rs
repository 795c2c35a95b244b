use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Badge, UserBadge};

/// Outcome of a badge award attempt. Only `Awarded` wrote a row; the other
/// two are non-fatal and reported back to the ledger for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AwardOutcome {
    Awarded,
    AlreadyHeld,
    UnknownBadge,
}

pub(crate) async fn award(
    pool: &PgPool,
    user_id: &str,
    badge_id: i32,
    awarded_at: PrimitiveDateTime,
) -> Result<AwardOutcome, sqlx::Error> {
    let known: Option<i32> = sqlx::query_scalar("SELECT 1 FROM badges WHERE id = $1")
        .bind(badge_id)
        .fetch_optional(pool)
        .await?;
    if known.is_none() {
        return Ok(AwardOutcome::UnknownBadge);
    }

    let result = sqlx::query(
        "INSERT INTO user_badges (user_id, badge_id, is_highlight, awarded_at)
         VALUES ($1, $2, FALSE, $3)
         ON CONFLICT (user_id, badge_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(badge_id)
    .bind(awarded_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        Ok(AwardOutcome::AlreadyHeld)
    } else {
        Ok(AwardOutcome::Awarded)
    }
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<(Badge, UserBadge)>, sqlx::Error> {
    let rows: Vec<BadgeRow> = sqlx::query_as(
        "SELECT b.id, b.title, b.description, b.image,
                ub.user_id, ub.badge_id, ub.is_highlight, ub.awarded_at
         FROM user_badges ub
         JOIN badges b ON b.id = ub.badge_id
         WHERE ub.user_id = $1
         ORDER BY ub.awarded_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            (
                Badge {
                    id: row.id,
                    title: row.title,
                    description: row.description,
                    image: row.image,
                },
                UserBadge {
                    user_id: row.user_id,
                    badge_id: row.badge_id,
                    is_highlight: row.is_highlight,
                    awarded_at: row.awarded_at,
                },
            )
        })
        .collect())
}

/// Marks one held badge as the highlight, clearing any previous one.
/// Returns false when the user does not hold the badge.
pub(crate) async fn set_highlight(
    pool: &PgPool,
    user_id: &str,
    badge_id: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query("UPDATE user_badges SET is_highlight = FALSE WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    let result = sqlx::query(
        "UPDATE user_badges SET is_highlight = TRUE WHERE user_id = $1 AND badge_id = $2",
    )
    .bind(user_id)
    .bind(badge_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct BadgeRow {
    id: i32,
    title: String,
    description: String,
    image: String,
    user_id: String,
    badge_id: i32,
    is_highlight: bool,
    awarded_at: PrimitiveDateTime,
}
