use std::collections::HashMap;

use crate::db::{execute_with_retry, fold_case, DbPool};
use crate::models::{Image, Item, ItemFields, ItemStatus, Tag};
use crate::schema::{images, item_tags, items, tags};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use anyhow::Result;
use tracing::{instrument, debug, info};

use super::tag_repo::{find_or_create_tag, link_tag};
use super::ID_CHUNK;

/// Changes to a listing; `None` leaves a column untouched
///
/// The nullable columns take `Some(None)` to clear the value.
#[derive(AsChangeset, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = items)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Option<f64>>,
    pub location: Option<Option<String>>,
    pub contact_info: Option<Option<String>>,
    pub status: Option<ItemStatus>,
}

fn slug_taken(conn: &mut SqliteConnection, slug: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(items::table.filter(items::slug.eq(slug)))).get_result(conn)
}

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Creates a new listing with its images and tags
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `vendor_id` - The user listing the item
/// * `title` - The title of the item
/// * `details` - Optional description, price, location and contact info
/// * `status` - Initial status (PENDING when listings need approval)
/// * `image_refs` - `(url, key)` pairs of already-uploaded images, in display order
/// * `tag_names` - Tags to attach; missing tags are created
///
/// ### Returns
///
/// A Result containing the newly created Item if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The vendor does not exist
/// - Any of the inserts fail, in which case nothing is stored
#[instrument(skip(pool, details, image_refs, tag_names), fields(vendor_id = %vendor_id, title = %title))]
pub async fn create_item(
    pool: &DbPool,
    vendor_id: &str,
    title: String,
    details: ItemFields,
    status: ItemStatus,
    image_refs: &[(String, String)],
    tag_names: &[String],
) -> Result<Item> {
    debug!("Creating new item");

    let mut conn = pool.get()?;
    let mut new_item = Item::new(vendor_id.to_string(), title, details, status);

    let created = execute_with_retry(&mut conn, |conn| {
        conn.transaction(|conn| {
            // Same title within the same millisecond: nudge the timestamp part
            let mut at = new_item.get_created_at();
            while slug_taken(conn, &new_item.get_slug())? {
                at += Duration::milliseconds(1);
                new_item.reslug(at);
            }

            diesel::insert_into(items::table).values(&new_item).execute(conn)?;

            for (position, (url, key)) in image_refs.iter().enumerate() {
                let image = Image::new(new_item.get_id(), url.clone(), key.clone(), position as i32);
                diesel::insert_into(images::table).values(&image).execute(conn)?;
            }

            for name in tag_names.iter().filter(|name| !name.trim().is_empty()) {
                let tag = find_or_create_tag(conn, name)?;
                link_tag(conn, &new_item.get_id(), &tag.get_id())?;
            }

            Ok(new_item.clone())
        })
    })
    .await?;

    info!("Successfully created item with id: {}", created.get_id());
    Ok(created)
}

/// Retrieves an item from the database by its ID
///
/// ### Returns
///
/// A Result containing an Option with the Item if found, or None if not found
#[instrument(skip(pool))]
pub fn get_item(pool: &DbPool, item_id: &str) -> Result<Option<Item>> {
    let conn = &mut pool.get()?;
    let result = items::table
        .find(item_id)
        .select(Item::as_select())
        .first(conn)
        .optional()?;

    if result.is_none() {
        debug!("Item not found");
    }
    Ok(result)
}

/// Retrieves an item by its public slug
#[instrument(skip(pool))]
pub fn get_item_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Item>> {
    let conn = &mut pool.get()?;
    let result = items::table
        .filter(items::slug.eq(slug))
        .select(Item::as_select())
        .first(conn)
        .optional()?;
    Ok(result)
}

/// Adds one to an item's view counter
#[instrument(skip(pool))]
pub async fn increment_view_count(pool: &DbPool, item_id: &str) -> Result<()> {
    let mut conn = pool.get()?;
    execute_with_retry(&mut conn, |conn| {
        diesel::update(items::table.find(item_id))
            .set(items::view_count.eq(items::view_count + 1))
            .execute(conn)
    })
    .await?;
    Ok(())
}

/// Lists AVAILABLE items for the public catalogue, newest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `search` - Substring matched against title and description, ignoring
///   case for any script
/// * `tag` - Only items carrying a tag with this name
/// * `limit` - Maximum number of items returned
#[instrument(skip(pool))]
pub fn list_available_items(pool: &DbPool, search: Option<&str>, tag: Option<&str>, limit: i64) -> Result<Vec<Item>> {
    let conn = &mut pool.get()?;

    let mut query = items::table
        .filter(items::status.eq(ItemStatus::Available))
        .select(Item::as_select())
        .into_boxed();

    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        query = query.filter(
            fold_case(items::title.nullable())
                .like(pattern.clone())
                .escape('\\')
                .or(fold_case(items::description).like(pattern).escape('\\')),
        );
    }

    if let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) {
        let tagged = item_tags::table
            .inner_join(tags::table)
            .filter(tags::name.eq(Tag::normalize_name(tag)))
            .select(item_tags::item_id);
        query = query.filter(items::id.eq_any(tagged));
    }

    let result = query
        .order(items::created_at.desc())
        .limit(limit)
        .load(conn)?;

    debug!("Found {} available items", result.len());
    Ok(result)
}

/// Lists a vendor's own items, newest first, whatever their status
pub fn list_items_by_vendor(pool: &DbPool, vendor_id: &str) -> Result<Vec<Item>> {
    let conn = &mut pool.get()?;
    let result = items::table
        .filter(items::vendor_id.eq(vendor_id))
        .order(items::created_at.desc())
        .select(Item::as_select())
        .load(conn)?;
    Ok(result)
}

/// Lists every item regardless of status, newest first
pub fn list_all_items(pool: &DbPool) -> Result<Vec<Item>> {
    let conn = &mut pool.get()?;
    let result = items::table
        .order(items::created_at.desc())
        .select(Item::as_select())
        .load(conn)?;
    Ok(result)
}

/// Lists the `limit` most recently created items
pub fn list_recent_items(pool: &DbPool, limit: i64) -> Result<Vec<Item>> {
    let conn = &mut pool.get()?;
    let result = items::table
        .order(items::created_at.desc())
        .limit(limit)
        .select(Item::as_select())
        .load(conn)?;
    Ok(result)
}

/// Applies changes to an item and returns the updated item
///
/// ### Returns
///
/// `None` when the item does not exist
#[instrument(skip(pool))]
pub async fn update_item(pool: &DbPool, item_id: &str, changes: ItemChanges) -> Result<Option<Item>> {
    let mut conn = pool.get()?;
    let now = Utc::now().naive_utc();

    let updated = execute_with_retry(&mut conn, |conn| {
        diesel::update(items::table.find(item_id))
            .set((&changes, items::updated_at.eq(now)))
            .execute(conn)
    })
    .await?;

    drop(conn);
    if updated == 0 {
        return Ok(None);
    }

    info!("Updated item {}", item_id);
    get_item(pool, item_id)
}

/// Deletes an item; its images and tag links cascade
///
/// ### Returns
///
/// Whether an item was deleted
#[instrument(skip(pool))]
pub async fn delete_item(pool: &DbPool, item_id: &str) -> Result<bool> {
    let mut conn = pool.get()?;
    let deleted = execute_with_retry(&mut conn, |conn| {
        diesel::delete(items::table.find(item_id)).execute(conn)
    })
    .await?;

    if deleted > 0 {
        info!("Deleted item {}", item_id);
    }
    Ok(deleted > 0)
}

/// Lists an item's images in display order
pub fn get_images_for_item(pool: &DbPool, item_id: &str) -> Result<Vec<Image>> {
    let conn = &mut pool.get()?;
    let result = images::table
        .filter(images::item_id.eq(item_id))
        .order(images::sort_order.asc())
        .select(Image::as_select())
        .load(conn)?;
    Ok(result)
}

/// Returns the first image (lowest sort order) of each of the given items
///
/// Items without images are missing from the map.
pub fn get_first_images(pool: &DbPool, item_ids: &[String]) -> Result<HashMap<String, Image>> {
    if item_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let conn = &mut pool.get()?;
    let mut first = HashMap::new();
    for chunk in item_ids.chunks(ID_CHUNK) {
        let found = images::table
            .filter(images::item_id.eq_any(chunk))
            .order((images::item_id.asc(), images::sort_order.asc()))
            .select(Image::as_select())
            .load(conn)?;
        for image in found {
            first.entry(image.get_item_id()).or_insert(image);
        }
    }
    Ok(first)
}

#[cfg(test)]
mod tests;
