use crate::db::{execute_with_retry, DbPool};
use crate::models::{ItemTag, Tag};
use crate::schema::{item_tags, tags};
use diesel::prelude::*;
use anyhow::Result;
use tracing::{debug, info, instrument};

/// Creates a new tag in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `name` - The name for the new tag; stored trimmed and lower-cased
///
/// ### Returns
///
/// A Result containing the newly created Tag if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - A tag with the same name exists (a UNIQUE violation)
#[instrument(skip(pool))]
pub async fn create_tag(pool: &DbPool, name: &str) -> Result<Tag> {
    let mut conn = pool.get()?;
    let new_tag = Tag::new(name);

    execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(tags::table).values(&new_tag).execute(conn)
    })
    .await?;

    info!("Created tag {} ({})", new_tag.get_name(), new_tag.get_id());
    Ok(new_tag)
}

/// Retrieves a tag by name, after normalising the name
pub fn get_tag_by_name(pool: &DbPool, name: &str) -> Result<Option<Tag>> {
    let conn = &mut pool.get()?;
    let result = tags::table
        .filter(tags::name.eq(Tag::normalize_name(name)))
        .select(Tag::as_select())
        .first(conn)
        .optional()?;
    Ok(result)
}

/// Lists all tags in alphabetical order
pub fn list_tags(pool: &DbPool) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;
    let result = tags::table
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(conn)?;
    Ok(result)
}

/// Lists the tags attached to an item, in alphabetical order
pub fn get_tags_for_item(pool: &DbPool, item_id: &str) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;
    let result = item_tags::table
        .inner_join(tags::table)
        .filter(item_tags::item_id.eq(item_id))
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(conn)?;
    Ok(result)
}

/// Returns the tag called `name`, creating it first if needed
///
/// Runs on a caller-provided connection so it can take part in a larger
/// transaction.
pub(crate) fn find_or_create_tag(conn: &mut SqliteConnection, name: &str) -> QueryResult<Tag> {
    let normalized = Tag::normalize_name(name);
    if let Some(tag) = tags::table
        .filter(tags::name.eq(&normalized))
        .select(Tag::as_select())
        .first(conn)
        .optional()?
    {
        return Ok(tag);
    }

    let new_tag = Tag::new(&normalized);
    diesel::insert_into(tags::table).values(&new_tag).execute(conn)?;
    debug!("Created tag {} on the fly", new_tag.get_name());
    Ok(new_tag)
}

/// Links `tag_id` to `item_id`; linking twice is a no-op
pub(crate) fn link_tag(conn: &mut SqliteConnection, item_id: &str, tag_id: &str) -> QueryResult<()> {
    diesel::insert_or_ignore_into(item_tags::table)
        .values(ItemTag::new(item_id.to_string(), tag_id.to_string()))
        .execute(conn)?;
    Ok(())
}

/// Attaches the tag called `name` to an item, creating the tag if needed
///
/// ### Returns
///
/// The attached tag. Attaching a tag the item already has succeeds and
/// leaves a single link.
///
/// ### Errors
///
/// Returns an error if the item does not exist (a FOREIGN KEY violation) or
/// the database operation fails
#[instrument(skip(pool))]
pub async fn add_tag_to_item_by_name(pool: &DbPool, item_id: &str, name: &str) -> Result<Tag> {
    let mut conn = pool.get()?;

    let tag = execute_with_retry(&mut conn, |conn| {
        conn.transaction(|conn| {
            let tag = find_or_create_tag(conn, name)?;
            link_tag(conn, item_id, &tag.get_id())?;
            Ok(tag)
        })
    })
    .await?;

    info!("Tagged item {} with {}", item_id, tag.get_name());
    Ok(tag)
}

/// Removes a tag from an item
///
/// ### Returns
///
/// Whether the item carried the tag
#[instrument(skip(pool))]
pub async fn remove_tag_from_item(pool: &DbPool, item_id: &str, tag_id: &str) -> Result<bool> {
    let mut conn = pool.get()?;

    let removed = execute_with_retry(&mut conn, |conn| {
        diesel::delete(
            item_tags::table
                .filter(item_tags::item_id.eq(item_id))
                .filter(item_tags::tag_id.eq(tag_id)),
        )
        .execute(conn)
    })
    .await?;

    Ok(removed > 0)
}
