use crate::db::{execute_with_retry, DbPool};
use crate::models::Message;
use crate::schema::messages;
use diesel::prelude::*;
use anyhow::Result;
use tracing::{info, instrument};

/// Stores a direct message from `sender_id` to `recipient_id`
///
/// ### Errors
///
/// Returns an error if either user does not exist or the insert fails
#[instrument(skip(pool, body))]
pub async fn send_message(
    pool: &DbPool,
    sender_id: &str,
    recipient_id: &str,
    subject: String,
    body: String,
) -> Result<Message> {
    let mut conn = pool.get()?;
    let message = Message::new(sender_id.to_string(), recipient_id.to_string(), subject, body);

    execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(messages::table).values(&message).execute(conn)
    })
    .await?;

    info!("Stored message {}", message.get_id());
    Ok(message)
}

pub fn get_message(pool: &DbPool, message_id: &str) -> Result<Option<Message>> {
    let conn = &mut pool.get()?;
    let result = messages::table
        .find(message_id)
        .select(Message::as_select())
        .first(conn)
        .optional()?;
    Ok(result)
}

/// Messages received by `user_id`, newest first
pub fn list_inbox(pool: &DbPool, user_id: &str) -> Result<Vec<Message>> {
    let conn = &mut pool.get()?;
    let result = messages::table
        .filter(messages::recipient_id.eq(user_id))
        .order(messages::created_at.desc())
        .select(Message::as_select())
        .load(conn)?;
    Ok(result)
}

/// Messages sent by `user_id`, newest first
pub fn list_sent(pool: &DbPool, user_id: &str) -> Result<Vec<Message>> {
    let conn = &mut pool.get()?;
    let result = messages::table
        .filter(messages::sender_id.eq(user_id))
        .order(messages::created_at.desc())
        .select(Message::as_select())
        .load(conn)?;
    Ok(result)
}

/// Flags a message as read and returns it
#[instrument(skip(pool))]
pub async fn mark_message_read(pool: &DbPool, message_id: &str) -> Result<Option<Message>> {
    let mut conn = pool.get()?;
    execute_with_retry(&mut conn, |conn| {
        diesel::update(messages::table.find(message_id))
            .set(messages::read.eq(true))
            .execute(conn)
    })
    .await?;

    drop(conn);
    get_message(pool, message_id)
}
