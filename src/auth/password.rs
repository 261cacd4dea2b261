use anyhow::Result;
use tracing::warn;

/// Shortest password accepted at registration, reset and change
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn password_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Hashes `plain` with bcrypt at the given cost, on the blocking pool
pub async fn hash_password(plain: &str, cost: u32) -> Result<String> {
    let plain = plain.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hash)
}

/// Checks `plain` against a stored bcrypt hash
///
/// A malformed stored hash never matches.
pub async fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    let plain = plain.to_owned();
    let hash = hash.to_owned();
    let matches = tokio::task::spawn_blocking(move || match bcrypt::verify(plain, &hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!("Stored password hash could not be checked: {}", e);
            false
        }
    })
    .await?;
    Ok(matches)
}
