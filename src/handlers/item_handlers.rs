use axum::extract::{Path, State};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{CreateItemDto, ItemDetail, ItemQueryDto, ItemSummary, SuccessResponse, UpdateItemDto};
use crate::errors::ApiError;
use crate::models::{Item, ItemFields, ItemStatus};
use crate::repo::{self, ItemChanges};

use super::views::{item_detail, item_summaries};
use super::{check_price, optional_text, required_text, Json, LIST_LIMIT};

/// Loads an item or fails with 404
fn find_item(pool: &DbPool, item_id: &str) -> Result<Item, ApiError> {
    repo::get_item(pool, item_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Item"))
}

/// Handler for the public catalogue
///
/// This function handles GET requests to `/api/items`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - Optional `q` search text and `tag` name
///
/// ### Returns
///
/// Up to 50 AVAILABLE items, newest first, each with its first image and vendor
#[instrument(skip(pool))]
pub async fn list_items_handler(
    State(pool): State<Arc<DbPool>>,
    Query(query): Query<ItemQueryDto>,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    debug!("Listing catalogue");

    let items = repo::list_available_items(&pool, query.q.as_deref(), query.tag.as_deref(), LIST_LIMIT)
        .map_err(ApiError::Database)?;

    info!("Retrieved {} items", items.len());
    Ok(Json(item_summaries(&pool, items)?))
}

/// Handler for creating a new listing
///
/// This function handles POST requests to `/api/items`. The listing starts
/// AVAILABLE, or PENDING when the site requires approval.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `user` - The signed-in vendor, who becomes the owner
/// * `payload` - Title, optional details, image references and tag names
///
/// ### Returns
///
/// The new item with its images and tags
#[instrument(skip(pool, user, payload), fields(vendor_id = %user.id(), title = %payload.title))]
pub async fn create_item_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Json(payload): Json<CreateItemDto>,
) -> Result<Json<ItemDetail>, ApiError> {
    info!("Creating new item");

    let title = required_text(&payload.title, "Title is required")?;
    let price = check_price(payload.price)?;

    let settings = repo::get_settings(&pool).map_err(ApiError::Database)?;
    if payload.images.len() > settings.max_images_per_item as usize {
        return Err(ApiError::bad_request(format!(
            "At most {} images are allowed per item",
            settings.max_images_per_item
        )));
    }
    let status = if settings.require_approval {
        ItemStatus::Pending
    } else {
        ItemStatus::Available
    };

    let details = ItemFields {
        description: optional_text(payload.description),
        price,
        location: optional_text(payload.location),
        contact_info: optional_text(payload.contact_info),
    };
    let image_refs: Vec<(String, String)> = payload
        .images
        .into_iter()
        .map(|image| (image.url, image.key))
        .collect();

    let item = repo::create_item(&pool, &user.id(), title, details, status, &image_refs, &payload.tags)
        .await
        .map_err(ApiError::Database)?;

    info!("Successfully created item with id: {}", item.get_id());
    Ok(Json(item_detail(&pool, item)?))
}

/// Handler for retrieving a specific item with its images, tags and vendor
///
/// This function handles GET requests to `/api/items/{id}`.
#[instrument(skip(pool))]
pub async fn get_item_handler(
    State(pool): State<Arc<DbPool>>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemDetail>, ApiError> {
    let item = find_item(&pool, &item_id)?;
    Ok(Json(item_detail(&pool, item)?))
}

/// Handler for the public item page
///
/// This function handles GET requests to `/api/items/slug/{slug}`. Every
/// call counts as one view.
#[instrument(skip(pool))]
pub async fn get_item_by_slug_handler(
    State(pool): State<Arc<DbPool>>,
    Path(slug): Path<String>,
) -> Result<Json<ItemDetail>, ApiError> {
    let item = repo::get_item_by_slug(&pool, &slug)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Item"))?;

    repo::increment_view_count(&pool, &item.get_id())
        .await
        .map_err(ApiError::Database)?;

    // Reload so the response carries the new count
    let item = find_item(&pool, &item.get_id())?;
    Ok(Json(item_detail(&pool, item)?))
}

/// Handler for editing a listing
///
/// This function handles PATCH requests to `/api/items/{id}`. Only the keys
/// present in the body change; `null` clears a nullable field.
///
/// ### Returns
///
/// The updated item. 404 when it does not exist, then 403 unless the caller
/// owns it or is staff.
#[instrument(skip(pool, user, payload), fields(user_id = %user.id()))]
pub async fn update_item_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(item_id): Path<String>,
    Json(payload): Json<UpdateItemDto>,
) -> Result<Json<Item>, ApiError> {
    let item = find_item(&pool, &item_id)?;
    user.require_owner_or_staff(&item.get_vendor_id())?;

    let title = payload
        .title
        .as_deref()
        .map(|t| required_text(t, "Title cannot be empty"))
        .transpose()?;
    let price = match payload.price {
        Some(price) => Some(check_price(price)?),
        None => None,
    };
    let status = payload
        .status
        .as_deref()
        .map(str::parse::<ItemStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    if let Some(next) = status {
        if !user.role().is_staff() {
            let require_approval = repo::get_settings(&pool)?.require_approval;
            check_vendor_status_change(item.get_status(), next, require_approval)?;
        }
    }

    let changes = ItemChanges {
        title,
        description: payload.description.map(optional_text),
        price,
        location: payload.location.map(optional_text),
        contact_info: payload.contact_info.map(optional_text),
        status,
    };

    let updated = repo::update_item(&pool, &item_id, changes)
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Item"))?;

    info!("Updated item {}", item_id);
    Ok(Json(updated))
}

/// Status moves a vendor may make on their own listing
///
/// Only staff take a listing out of PENDING, and while approval is required
/// only staff make one AVAILABLE.
fn check_vendor_status_change(current: ItemStatus, next: ItemStatus, require_approval: bool) -> Result<(), ApiError> {
    if next == current {
        return Ok(());
    }
    if current == ItemStatus::Pending || (require_approval && next == ItemStatus::Available) {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

/// Handler for deleting a listing; images and tag links go with it
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn delete_item_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let item = find_item(&pool, &item_id)?;
    user.require_owner_or_staff(&item.get_vendor_id())?;

    repo::delete_item(&pool, &item_id)
        .await
        .map_err(ApiError::Database)?;

    info!("Successfully deleted item with id: {}", item_id);
    Ok(Json(SuccessResponse::ok()))
}

/// The caller's own listings in every status, newest first
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn my_items_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    let items = repo::list_items_by_vendor(&pool, &user.id()).map_err(ApiError::Database)?;
    Ok(Json(item_summaries(&pool, items)?))
}
