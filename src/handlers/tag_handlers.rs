use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::db::{is_unique_violation, DbPool};
use crate::dto::{SuccessResponse, TagNameDto};
use crate::errors::ApiError;
use crate::models::Tag;
use crate::repo;

use super::{required_text, Json};

/// Handler for listing all tags, sorted by name
#[instrument(skip(pool))]
pub async fn list_tags_handler(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = repo::list_tags(&pool).map_err(ApiError::Database)?;
    Ok(Json(tags))
}

/// Handler for creating a tag
///
/// This function handles POST requests to `/api/tags` and is limited to
/// staff. A name that is already in use (after normalisation) is a 409.
#[instrument(skip(pool, user, payload), fields(user_id = %user.id()))]
pub async fn create_tag_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Json(payload): Json<TagNameDto>,
) -> Result<Json<Tag>, ApiError> {
    user.require_staff()?;
    let name = required_text(&payload.name, "Tag name is required")?;

    if repo::get_tag_by_name(&pool, &name).map_err(ApiError::Database)?.is_some() {
        return Err(ApiError::Conflict("Tag already exists".to_string()));
    }

    let tag = repo::create_tag(&pool, &name).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Tag already exists".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    info!("Created tag {}", tag.get_name());
    Ok(Json(tag))
}

/// Handler for attaching a tag to an item by name
///
/// This function handles POST requests to `/api/items/{id}/tags`. The tag is
/// created when it does not exist yet; attaching it twice is harmless.
///
/// ### Returns
///
/// The attached tag
#[instrument(skip(pool, user, payload), fields(user_id = %user.id()))]
pub async fn add_item_tag_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(item_id): Path<String>,
    Json(payload): Json<TagNameDto>,
) -> Result<Json<Tag>, ApiError> {
    let item = repo::get_item(&pool, &item_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Item"))?;
    user.require_owner_or_staff(&item.get_vendor_id())?;

    let name = required_text(&payload.name, "Tag name is required")?;
    let tag = repo::add_tag_to_item_by_name(&pool, &item_id, &name)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(tag))
}

/// Handler for detaching a tag from an item
///
/// Succeeds whether or not the item carried the tag.
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn remove_item_tag_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path((item_id, tag_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let item = repo::get_item(&pool, &item_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Item"))?;
    user.require_owner_or_staff(&item.get_vendor_id())?;

    repo::remove_tag_from_item(&pool, &item_id, &tag_id)
        .await
        .map_err(ApiError::Database)?;

    Ok(Json(SuccessResponse::ok()))
}
