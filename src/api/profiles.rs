use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Profile;
use crate::repositories;
use crate::schemas::user::ProfileResponse;
use crate::services::avatars::{self, AvatarError};

#[derive(Debug, Deserialize)]
struct AvatarUpload {
    /// Base64-encoded image bytes.
    data: String,
    extension: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_own_profile))
        .route("/me/avatar", put(upload_avatar))
        .route("/:user_id", get(get_profile))
}

async fn get_own_profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = fetch_profile_by_user(&state, &user.id).await?;
    Ok(Json(ProfileResponse::from_db(profile)))
}

async fn get_profile(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = fetch_profile_by_user(&state, &user_id).await?;
    Ok(Json(ProfileResponse::from_db(profile)))
}

async fn upload_avatar(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AvatarUpload>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = fetch_profile_by_user(&state, &user.id).await?;

    let stored_path =
        avatars::store_avatar(state.settings().storage(), &payload.data, &payload.extension)
            .await
            .map_err(|err| match err {
                AvatarError::Io(inner) => ApiError::internal(inner, "Failed to store avatar"),
                other => ApiError::BadRequest(other.to_string()),
            })?;

    let profile = repositories::profiles::update_avatar(
        state.db(),
        &profile.id,
        &stored_path,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update profile"))?;

    Ok(Json(ProfileResponse::from_db(profile)))
}

async fn fetch_profile_by_user(state: &AppState, user_id: &str) -> Result<Profile, ApiError> {
    repositories::profiles::find_by_user_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch profile"))?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))
}
