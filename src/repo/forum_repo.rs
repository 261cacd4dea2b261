use crate::db::{execute_with_retry, DbPool};
use crate::models::ForumPost;
use crate::schema::forum_posts;
use chrono::Utc;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{info, instrument};

/// Creates a forum post by `author_id`
#[instrument(skip(pool, content))]
pub async fn create_post(pool: &DbPool, author_id: &str, title: String, content: String) -> Result<ForumPost> {
    let mut conn = pool.get()?;
    let post = ForumPost::new(author_id.to_string(), title, content);

    execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(forum_posts::table).values(&post).execute(conn)
    })
    .await?;

    info!("Created forum post {}", post.get_id());
    Ok(post)
}

pub fn get_post(pool: &DbPool, post_id: &str) -> Result<Option<ForumPost>> {
    let conn = &mut pool.get()?;
    let result = forum_posts::table
        .find(post_id)
        .select(ForumPost::as_select())
        .first(conn)
        .optional()?;
    Ok(result)
}

/// Lists posts with pinned ones first, each group newest first
pub fn list_posts(pool: &DbPool, limit: i64) -> Result<Vec<ForumPost>> {
    let conn = &mut pool.get()?;
    let result = forum_posts::table
        .order((forum_posts::pinned.desc(), forum_posts::created_at.desc()))
        .limit(limit)
        .select(ForumPost::as_select())
        .load(conn)?;
    Ok(result)
}

/// Pins or unpins a post
///
/// ### Returns
///
/// The updated post, or `None` when it does not exist
#[instrument(skip(pool))]
pub async fn set_post_pinned(pool: &DbPool, post_id: &str, pinned: bool) -> Result<Option<ForumPost>> {
    let mut conn = pool.get()?;
    let now = Utc::now().naive_utc();

    execute_with_retry(&mut conn, |conn| {
        diesel::update(forum_posts::table.find(post_id))
            .set((forum_posts::pinned.eq(pinned), forum_posts::updated_at.eq(now)))
            .execute(conn)
    })
    .await?;

    drop(conn);
    get_post(pool, post_id)
}

/// Deletes a post, returning whether it existed
#[instrument(skip(pool))]
pub async fn delete_post(pool: &DbPool, post_id: &str) -> Result<bool> {
    let mut conn = pool.get()?;
    let deleted = execute_with_retry(&mut conn, |conn| {
        diesel::delete(forum_posts::table.find(post_id)).execute(conn)
    })
    .await?;
    Ok(deleted > 0)
}
