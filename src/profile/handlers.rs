// src/profile/handlers.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::info;

use super::models::Profile;
use super::validators::ProfileValidator;
use crate::auth::AdminSession;
use crate::common::{ApiError, ApiOutcome, AppState, Validator};

/// GET /profile
pub async fn profile_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ApiOutcome<Profile>>, ApiError> {
    let profile = state.profile.get().await?;
    Ok(Json(ApiOutcome::ok(profile)))
}

/// PUT /admin/profile - full-document replace
pub async fn update_profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    admin: AdminSession,
    Json(mut profile): Json<Profile>,
) -> Result<Json<ApiOutcome<Profile>>, ApiError> {
    profile.dedup_skills();

    let validation = ProfileValidator.validate(&profile);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    info!(user_id = %admin.session.user_id, "Profile replace request received");

    let updated = state.profile.replace(&profile, &admin.token).await?;
    Ok(Json(ApiOutcome::ok(updated)))
}
