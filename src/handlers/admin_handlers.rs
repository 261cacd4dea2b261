use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{AdminStats, AdminUserView, ItemSummary, SuccessResponse, UpdateRoleDto};
use crate::errors::ApiError;
use crate::models::{Role, SiteSettings, User};
use crate::repo;

use super::views::item_summaries;
use super::Json;

/// How many recent items and users the dashboard shows
const DASHBOARD_RECENT: i64 = 5;

/// Handler for the admin dashboard
///
/// This function handles GET requests to `/api/admin/stats` (ADMIN only).
///
/// ### Returns
///
/// Row totals plus the five newest items and users
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn admin_stats_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<AdminStats>, ApiError> {
    user.require_admin()?;

    let counts = repo::site_counts(&pool)?;
    let recent_items = repo::list_recent_items(&pool, DASHBOARD_RECENT)?;
    let recent_users = repo::list_recent_users(&pool, DASHBOARD_RECENT)?;

    Ok(Json(AdminStats {
        counts,
        recent_items: item_summaries(&pool, recent_items)?,
        recent_users,
    }))
}

/// Every item in every status, for moderation (ADMIN or STAFF)
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn admin_items_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    user.require_staff()?;
    let items = repo::list_all_items(&pool)?;
    Ok(Json(item_summaries(&pool, items)?))
}

#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn admin_users_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<Vec<AdminUserView>>, ApiError> {
    user.require_admin()?;

    let rows = repo::list_user_activity(&pool)?
        .into_iter()
        .map(|row| AdminUserView {
            user: row.user,
            item_count: row.item_count,
            message_count: row.message_count,
        })
        .collect();
    Ok(Json(rows))
}

/// Handler for changing a user's role
///
/// This function handles PATCH requests to `/api/admin/users/{id}`.
///
/// ### Returns
///
/// The updated user. 400 for the caller's own account or an unknown role,
/// 404 for an unknown user.
#[instrument(skip(pool, user, payload), fields(admin_id = %user.id(), role = %payload.role))]
pub async fn admin_update_role_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateRoleDto>,
) -> Result<Json<User>, ApiError> {
    user.require_admin()?;

    if user_id == user.id() {
        return Err(ApiError::bad_request("You cannot change your own role"));
    }
    let role: Role = payload.role.parse().map_err(ApiError::BadRequest)?;

    let updated = repo::update_user_role(&pool, &user_id, role)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(target_user = %user_id, "Changed role to {}", role);
    Ok(Json(updated))
}

/// Handler for deleting a user together with everything they own
#[instrument(skip(pool, user), fields(admin_id = %user.id()))]
pub async fn admin_delete_user_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    user.require_admin()?;

    if user_id == user.id() {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    if !repo::delete_user(&pool, &user_id).await? {
        return Err(ApiError::NotFound("User"));
    }

    warn!(target_user = %user_id, "User deleted by admin");
    Ok(Json(SuccessResponse::ok()))
}

#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn get_settings_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<SiteSettings>, ApiError> {
    user.require_admin()?;
    Ok(Json(repo::get_settings(&pool)?))
}

/// Handler for changing site settings
///
/// This function handles POST requests to `/api/admin/settings`. The body is
/// merged over the stored settings, so it only needs the keys that change.
#[instrument(skip(pool, user, patch), fields(user_id = %user.id()))]
pub async fn update_settings_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<SiteSettings>, ApiError> {
    user.require_admin()?;

    let current = repo::get_settings(&pool)?;
    let merged = current.merged(&patch).map_err(ApiError::BadRequest)?;
    let saved = repo::save_settings(&pool, &merged).await?;

    info!("Site settings updated");
    Ok(Json(saved))
}
