use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::repo;

/// Returns 32 random bytes, hex-encoded
pub fn generate_reset_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// The page a user opens to pick a new password
pub fn reset_link(public_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={}", public_url.trim_end_matches('/'), token)
}

/// Stores a fresh reset token on the account registered under `email`
///
/// ### Returns
///
/// The token, or `None` when no account uses that email. Any token issued
/// earlier for the same account stops working.
#[instrument(skip(pool))]
pub async fn issue_reset_token(pool: &DbPool, email: &str, ttl: Duration) -> Result<Option<String>> {
    let Some(user) = repo::get_user_by_email(pool, email)? else {
        debug!("No account for reset request");
        return Ok(None);
    };

    let token = generate_reset_token();
    repo::set_reset_token(pool, &user.get_id(), &token, Utc::now() + ttl).await?;
    Ok(Some(token))
}

/// Replaces the password of the account holding `token`
///
/// The token is cleared in the same statement that sets the new hash, so it
/// can be used once. Returns false when no account holds the token or it
/// has expired.
#[instrument(skip_all)]
pub async fn consume_reset_token(pool: &DbPool, token: &str, new_password_hash: &str) -> Result<bool> {
    if token.is_empty() {
        return Ok(false);
    }
    repo::complete_password_reset(pool, token, new_password_hash, Utc::now()).await
}
