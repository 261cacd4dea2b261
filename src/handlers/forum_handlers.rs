use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{CreatePostDto, ForumPostView, PinPostDto, SuccessResponse};
use crate::errors::ApiError;
use crate::models::ForumPost;
use crate::repo;

use super::views::post_views;
use super::{required_text, Json, LIST_LIMIT};

fn single_view(pool: &DbPool, post: ForumPost) -> Result<ForumPostView, ApiError> {
    post_views(pool, vec![post])?
        .pop()
        .ok_or_else(|| ApiError::Database(anyhow::anyhow!("forum post view missing")))
}

/// Handler for the forum front page: pinned posts first, then newest
#[instrument(skip(pool))]
pub async fn list_posts_handler(State(pool): State<Arc<DbPool>>) -> Result<Json<Vec<ForumPostView>>, ApiError> {
    let posts = repo::list_posts(&pool, LIST_LIMIT).map_err(ApiError::Database)?;
    Ok(Json(post_views(&pool, posts)?))
}

#[instrument(skip(pool, user, payload), fields(author_id = %user.id()))]
pub async fn create_post_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Json(payload): Json<CreatePostDto>,
) -> Result<Json<ForumPostView>, ApiError> {
    let title = required_text(&payload.title, "Title and content are required")?;
    let content = required_text(&payload.content, "Title and content are required")?;

    let post = repo::create_post(&pool, &user.id(), title, content)
        .await
        .map_err(ApiError::Database)?;

    info!("Created forum post {}", post.get_id());
    Ok(Json(single_view(&pool, post)?))
}

/// Handler for pinning or unpinning a post (staff only)
#[instrument(skip(pool, user, payload), fields(user_id = %user.id(), pinned = payload.pinned))]
pub async fn pin_post_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(post_id): Path<String>,
    Json(payload): Json<PinPostDto>,
) -> Result<Json<ForumPostView>, ApiError> {
    user.require_staff()?;

    let post = repo::set_post_pinned(&pool, &post_id, payload.pinned)
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Post"))?;
    Ok(Json(single_view(&pool, post)?))
}

/// Handler for deleting a post; allowed for its author and for staff
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn delete_post_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let post = repo::get_post(&pool, &post_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Post"))?;
    user.require_owner_or_staff(&post.get_author_id())?;

    repo::delete_post(&pool, &post_id).await.map_err(ApiError::Database)?;
    info!("Deleted forum post {}", post_id);
    Ok(Json(SuccessResponse::ok()))
}
