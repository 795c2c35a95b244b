use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Make sure the configured first admin account (and its school) exists.
pub(crate) async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin creation");
        return Ok(());
    }

    let now = primitive_now_utc();

    let school =
        match repositories::schools::find_by_name(state.db(), &admin.first_admin_school).await? {
            Some(school) => school,
            None => {
                repositories::schools::create(
                    state.db(),
                    &Uuid::new_v4().to_string(),
                    &admin.first_admin_school,
                    now,
                )
                .await?
            }
        };

    if let Some(user) =
        repositories::users::find_by_email(state.db(), &admin.first_admin_email).await?
    {
        let password_ok =
            security::verify_password(&admin.first_admin_password, &user.hashed_password)
                .unwrap_or(false);

        if password_ok && user.role == UserRole::Admin && user.is_active {
            tracing::info!("First admin already up to date");
            return Ok(());
        }

        let hashed_password = if password_ok {
            user.hashed_password.clone()
        } else {
            security::hash_password(&admin.first_admin_password)?
        };

        sqlx::query(
            "UPDATE users
             SET hashed_password = $1, role = $2, is_active = TRUE, updated_at = $3
             WHERE id = $4",
        )
        .bind(hashed_password)
        .bind(UserRole::Admin)
        .bind(now)
        .bind(&user.id)
        .execute(state.db())
        .await?;

        tracing::info!(email = %admin.first_admin_email, "Updated first admin");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_admin_password)?;

    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &admin.first_admin_email,
            hashed_password,
            name: "Ecoly Admin",
            role: UserRole::Admin,
            school_id: &school.id,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(email = %admin.first_admin_email, "Created first admin");
    Ok(())
}
