use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{execute_with_retry, DbPool};
use crate::models::{normalize_email, Role, User};
use crate::schema::users;

use super::ID_CHUNK;

/// Profile fields a user may change about themselves
///
/// `None` leaves a column untouched.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = users)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub default_phone: Option<String>,
    pub default_location: Option<String>,
    pub default_contact_method: Option<String>,
}

/// Creates a new account
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `email` - Login email; stored trimmed and lower-cased
/// * `name` - Optional display name
/// * `password_hash` - bcrypt hash of the password
/// * `role` - Access level of the new account
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The email is already registered (a UNIQUE violation, see
///   [`crate::db::is_unique_violation`])
#[instrument(skip(pool, password_hash))]
pub async fn create_user(
    pool: &DbPool,
    email: &str,
    name: Option<String>,
    password_hash: String,
    role: Role,
) -> Result<User> {
    let mut conn = pool.get()?;
    let new_user = User::new(email, name, password_hash, role);

    execute_with_retry(&mut conn, |conn| {
        diesel::insert_into(users::table).values(&new_user).execute(conn)
    })
    .await?;

    info!("Created user with id: {}", new_user.get_id());
    Ok(new_user)
}

/// Retrieves a user by id
#[instrument(skip(pool))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let result = users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?;
    Ok(result)
}

/// Retrieves a user by email, ignoring case and surrounding whitespace
#[instrument(skip(pool))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let result = users::table
        .filter(users::email.eq(normalize_email(email)))
        .select(User::as_select())
        .first(conn)
        .optional()?;
    Ok(result)
}

/// Loads the users with the given ids, keyed by id
///
/// Ids that do not exist are simply missing from the map.
pub fn get_users_by_ids(pool: &DbPool, user_ids: &[String]) -> Result<HashMap<String, User>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let conn = &mut pool.get()?;
    let mut found = HashMap::with_capacity(user_ids.len().min(ID_CHUNK));
    for chunk in user_ids.chunks(ID_CHUNK) {
        let users: Vec<User> = users::table
            .filter(users::id.eq_any(chunk))
            .select(User::as_select())
            .load(conn)?;
        found.extend(users.into_iter().map(|user| (user.get_id(), user)));
    }
    Ok(found)
}

/// Lists the `limit` most recently registered users
pub fn list_recent_users(pool: &DbPool, limit: i64) -> Result<Vec<User>> {
    let conn = &mut pool.get()?;
    let result = users::table
        .order(users::created_at.desc())
        .limit(limit)
        .select(User::as_select())
        .load(conn)?;
    Ok(result)
}

/// Applies profile changes and returns the updated user
///
/// ### Returns
///
/// `None` when the user does not exist
#[instrument(skip(pool))]
pub async fn update_profile(pool: &DbPool, user_id: &str, changes: ProfileChanges) -> Result<Option<User>> {
    let mut conn = pool.get()?;
    let now = Utc::now().naive_utc();

    let updated = execute_with_retry(&mut conn, |conn| {
        diesel::update(users::table.find(user_id))
            .set((&changes, users::updated_at.eq(now)))
            .execute(conn)
    })
    .await?;

    drop(conn);
    if updated == 0 {
        return Ok(None);
    }
    get_user(pool, user_id)
}

/// Replaces a user's password hash
#[instrument(skip(pool, password_hash))]
pub async fn update_password(pool: &DbPool, user_id: &str, password_hash: &str) -> Result<()> {
    let mut conn = pool.get()?;
    let now = Utc::now().naive_utc();

    execute_with_retry(&mut conn, |conn| {
        diesel::update(users::table.find(user_id))
            .set((users::password_hash.eq(password_hash), users::updated_at.eq(now)))
            .execute(conn)
    })
    .await?;

    Ok(())
}

/// Changes a user's role
///
/// ### Returns
///
/// The updated user, or `None` when the user does not exist
#[instrument(skip(pool))]
pub async fn update_user_role(pool: &DbPool, user_id: &str, role: Role) -> Result<Option<User>> {
    let mut conn = pool.get()?;
    let now = Utc::now().naive_utc();

    let updated = execute_with_retry(&mut conn, |conn| {
        diesel::update(users::table.find(user_id))
            .set((users::role.eq(role), users::updated_at.eq(now)))
            .execute(conn)
    })
    .await?;

    drop(conn);
    if updated == 0 {
        debug!("No user to update");
        return Ok(None);
    }
    get_user(pool, user_id)
}

/// Deletes a user; their items, messages, posts and events cascade
///
/// ### Returns
///
/// Whether a user was deleted
#[instrument(skip(pool))]
pub async fn delete_user(pool: &DbPool, user_id: &str) -> Result<bool> {
    let mut conn = pool.get()?;
    let deleted = execute_with_retry(&mut conn, |conn| {
        diesel::delete(users::table.find(user_id)).execute(conn)
    })
    .await?;

    if deleted > 0 {
        info!("Deleted user {}", user_id);
    }
    Ok(deleted > 0)
}

/// Stores a password reset token and its expiry on the user
#[instrument(skip(pool, token))]
pub async fn set_reset_token(pool: &DbPool, user_id: &str, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
    let mut conn = pool.get()?;
    let expiry: NaiveDateTime = expires_at.naive_utc();

    execute_with_retry(&mut conn, |conn| {
        diesel::update(users::table.find(user_id))
            .set((users::reset_token.eq(token), users::reset_token_expiry.eq(expiry)))
            .execute(conn)
    })
    .await?;

    Ok(())
}

/// Sets a new password for whoever holds an unexpired `token`, clearing it
///
/// ### Returns
///
/// Whether an account matched. The match and the update are one statement,
/// so a token can only ever be used once.
#[instrument(skip_all)]
pub async fn complete_password_reset(
    pool: &DbPool,
    token: &str,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let mut conn = pool.get()?;
    let now = now.naive_utc();

    let updated = execute_with_retry(&mut conn, |conn| {
        diesel::update(
            users::table
                .filter(users::reset_token.eq(token))
                .filter(users::reset_token_expiry.gt(now)),
        )
        .set((
            users::password_hash.eq(password_hash),
            users::reset_token.eq(None::<String>),
            users::reset_token_expiry.eq(None::<NaiveDateTime>),
            users::updated_at.eq(now),
        ))
        .execute(conn)
    })
    .await?;

    Ok(updated == 1)
}

/// Makes sure an ADMIN account exists for `email` with the given password
///
/// An existing account is promoted and gets the new password; otherwise a
/// new one is created.
#[instrument(skip(pool, password_hash))]
pub async fn upsert_admin(pool: &DbPool, email: &str, name: Option<String>, password_hash: String) -> Result<User> {
    match get_user_by_email(pool, email)? {
        Some(existing) => {
            let user_id = existing.get_id();
            update_password(pool, &user_id, &password_hash).await?;
            if let Some(name) = name {
                update_profile(pool, &user_id, ProfileChanges { name: Some(name), ..Default::default() }).await?;
            }
            let promoted = update_user_role(pool, &user_id, Role::Admin).await?;
            promoted.ok_or_else(|| anyhow::anyhow!("User {} vanished during update", user_id))
        }
        None => create_user(pool, email, name, password_hash, Role::Admin).await,
    }
}

#[cfg(test)]
mod tests;
