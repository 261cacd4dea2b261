use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{MessageView, SendMessageDto};
use crate::errors::ApiError;
use crate::models::Message;
use crate::repo;

use super::views::message_views;
use super::Json;

/// Handler for the caller's inbox, newest first
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn inbox_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let messages = repo::list_inbox(&pool, &user.id()).map_err(ApiError::Database)?;
    Ok(Json(message_views(&pool, messages)?))
}

/// Handler for the messages the caller has sent, newest first
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn sent_messages_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let messages = repo::list_sent(&pool, &user.id()).map_err(ApiError::Database)?;
    Ok(Json(message_views(&pool, messages)?))
}

/// Handler for sending a direct message
///
/// This function handles POST requests to `/api/messages`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `user` - The sender
/// * `payload` - Recipient (email or account id), subject and body; all required
///
/// ### Returns
///
/// The stored message with sender and recipient. 404 when no account matches
/// the recipient.
#[instrument(skip(pool, user, payload), fields(sender_id = %user.id()))]
pub async fn send_message_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Json(payload): Json<SendMessageDto>,
) -> Result<Json<MessageView>, ApiError> {
    let subject = payload.subject.trim();
    let body = payload.body.trim();
    let recipient_id = payload.recipient_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let recipient_email = payload.recipient_email.trim();
    if (recipient_id.is_none() && recipient_email.is_empty()) || subject.is_empty() || body.is_empty() {
        return Err(ApiError::bad_request("Recipient, subject and body are required"));
    }

    let recipient = match recipient_id {
        Some(id) => repo::get_user(&pool, id),
        None => repo::get_user_by_email(&pool, recipient_email),
    }
    .map_err(ApiError::Database)?
    .ok_or(ApiError::NotFound("Recipient"))?;

    let message = repo::send_message(&pool, &user.id(), &recipient.get_id(), subject.to_string(), body.to_string())
        .await
        .map_err(ApiError::Database)?;

    info!(recipient_id = %recipient.get_id(), "Message sent");
    let view = message_views(&pool, vec![message])?
        .pop()
        .ok_or_else(|| ApiError::Database(anyhow::anyhow!("message view missing after send")))?;
    Ok(Json(view))
}

/// Handler for marking a message as read
///
/// Only the recipient may do this: 404 when the message does not exist,
/// 403 for anyone else.
#[instrument(skip(pool, user), fields(user_id = %user.id()))]
pub async fn mark_read_handler(
    State(pool): State<Arc<DbPool>>,
    user: AuthUser,
    Path(message_id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let message = repo::get_message(&pool, &message_id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Message"))?;

    if message.get_recipient_id() != user.id() {
        return Err(ApiError::Forbidden);
    }

    let updated = repo::mark_message_read(&pool, &message_id)
        .await
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Message"))?;
    Ok(Json(updated))
}
