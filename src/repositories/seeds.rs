use sqlx::PgPool;
use time::PrimitiveDateTime;

/// Month-to-date and all-time sums, computed at read time.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SeedTotals {
    pub(crate) month_seeds: i64,
    pub(crate) total_seeds: i64,
}

/// Appends a ledger row. Entries are never mutated or deleted.
pub(crate) async fn append(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    amount: i32,
    date: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO seeds (id, user_id, amount, date) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(user_id)
        .bind(amount)
        .bind(date)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn totals(
    pool: &PgPool,
    user_id: &str,
    now: PrimitiveDateTime,
) -> Result<SeedTotals, sqlx::Error> {
    let row: (Option<i64>, Option<i64>) = sqlx::query_as(
        "SELECT
            COALESCE(SUM(amount) FILTER (
                WHERE date_trunc('month', date) = date_trunc('month', $2::timestamp)
            ), 0),
            COALESCE(SUM(amount), 0)
         FROM seeds WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(SeedTotals { month_seeds: row.0.unwrap_or(0), total_seeds: row.1.unwrap_or(0) })
}
