use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

/// Creates (or repairs) the default teacher account named by
/// FIRST_SUPERUSER_EMAIL. Runs once at startup.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let email = &admin.first_superuser_email;
    let user = repositories::users::find_by_email(state.db(), email).await?;
    let now = primitive_now_utc();

    if let Some(user) = user {
        let mut needs_update = false;

        let verified =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);
        let hashed_password = if verified {
            user.hashed_password.clone()
        } else {
            needs_update = true;
            security::hash_password(&admin.first_superuser_password)?
        };

        if !user.is_teacher || !user.is_active {
            needs_update = true;
        }

        if needs_update {
            sqlx::query(
                "UPDATE users
                 SET hashed_password = $1,
                     is_teacher = TRUE,
                     is_active = TRUE,
                     updated_at = $2
                 WHERE id = $3",
            )
            .bind(hashed_password)
            .bind(now)
            .bind(&user.id)
            .execute(state.db())
            .await?;

            tracing::info!("Updated default superuser {email}");
        } else {
            tracing::info!("Default superuser already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    let mut tx = state.db().begin().await?;

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email,
            hashed_password,
            first_name: "Super",
            last_name: "Admin",
            is_teacher: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    repositories::profiles::create(
        &mut *tx,
        repositories::profiles::CreateProfile {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            avatar: None,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!("Created default superuser {email}");
    Ok(())
}
