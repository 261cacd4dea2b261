use axum::extract::State;
use tracing::{info, instrument};

use crate::auth::{hash_password, password_long_enough, verify_password, AuthUser, MIN_PASSWORD_LEN};
use crate::dto::{ChangePasswordDto, SuccessResponse, UpdateProfileDto};
use crate::errors::ApiError;
use crate::models::User;
use crate::repo::{self, ProfileChanges};
use crate::state::AppState;

use super::{optional_text, Json};

pub async fn get_profile_handler(user: AuthUser) -> Json<User> {
    Json(user.0)
}

/// Handler for editing the caller's name and listing defaults
///
/// Fields left out of the body keep their stored value.
#[instrument(skip(state, user, payload), fields(user_id = %user.id()))]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileDto>,
) -> Result<Json<User>, ApiError> {
    let changes = ProfileChanges {
        name: optional_text(payload.name),
        default_phone: optional_text(payload.default_phone),
        default_location: optional_text(payload.default_location),
        default_contact_method: optional_text(payload.default_contact_method),
    };

    let updated = repo::update_profile(&state.pool, &user.id(), changes)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!("Profile updated");
    Ok(Json(updated))
}

/// Handler for changing the caller's password
///
/// The current password must match; the new one needs the minimum length.
#[instrument(skip_all, fields(user_id = %user.id()))]
pub async fn change_password_handler(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordDto>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !verify_password(&payload.current_password, user.user().get_password_hash()).await? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }
    if !password_long_enough(&payload.new_password) {
        return Err(ApiError::bad_request(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let hash = hash_password(&payload.new_password, state.options.bcrypt_cost).await?;
    repo::update_password(&state.pool, &user.id(), &hash).await?;

    info!("Password changed");
    Ok(Json(SuccessResponse::ok()))
}
