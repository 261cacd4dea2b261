use crate::*;
use crate::auth::hash_password;
use crate::config::{base_config, Config, ConfigUpdate};
use crate::models::{Role, User};
use crate::state::AppState;
use proptest::prelude::*;

/// Password every account created by `create_user_with_token` uses
pub const TEST_PASSWORD: &str = "password123";

/// A dev-mode configuration with a cheap bcrypt cost
pub fn test_config() -> Config {
    base_config(None).apply_update(ConfigUpdate {
        jwt_secret: Some("test-secret".to_string()),
        bcrypt_cost: Some(4),
        dev_mode: Some(true),
        ..Default::default()
    })
}

/// Application state over a fresh in-memory database
pub fn test_state() -> AppState {
    AppState::new(repo::tests::setup_test_db(), &test_config())
}

/// Creates an account with `TEST_PASSWORD` and returns it with a valid session token
pub async fn create_user_with_token(state: &AppState, email: &str, role: Role) -> (User, String) {
    let hash = hash_password(TEST_PASSWORD, 4).await.unwrap();
    let user = repo::create_user(&state.pool, email, Some(email.to_string()), hash, role)
        .await
        .unwrap();
    let token = state.keys.issue(&user).unwrap();
    (user, token)
}

/// Strings with a mix of letters, digits, punctuation, whitespace and non-ASCII
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _\\-!?.,'&/()éüß漢字\\t]{0,40}"
}

/// Non-blank item titles
pub fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 '&!,.-]{0,30}"
}
