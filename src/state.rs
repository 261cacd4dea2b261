use std::sync::Arc;

use axum::extract::FromRef;
use chrono::Duration;

use crate::auth::AuthKeys;
use crate::config::Config;
use crate::db::DbPool;

/// Runtime options the auth routes need besides the signing keys
#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub bcrypt_cost: u32,
    pub reset_token_ttl: Duration,
    pub public_url: String,
    pub secure_cookies: bool,
    /// Echo reset tokens and links in API responses
    pub dev_mode: bool,
}

impl AuthOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bcrypt_cost: config.bcrypt_cost,
            reset_token_ttl: config.reset_token_ttl(),
            public_url: config.public_url.clone(),
            secure_cookies: config.secure_cookies,
            dev_mode: config.dev_mode,
        }
    }
}

/// State shared by every handler
///
/// Everything in here is immutable after startup; the database is the only
/// place request handling writes to.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub keys: Arc<AuthKeys>,
    pub options: Arc<AuthOptions>,
    /// Origins allowed by CORS; empty allows any origin
    pub cors_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(pool: Arc<DbPool>, config: &Config) -> Self {
        Self {
            pool,
            keys: Arc::new(AuthKeys::new(&config.jwt_secret, config.token_ttl())),
            options: Arc::new(AuthOptions::from_config(config)),
            cors_origins: Arc::new(config.cors_origins.clone()),
        }
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<AuthKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl FromRef<AppState> for Arc<AuthOptions> {
    fn from_ref(state: &AppState) -> Self {
        state.options.clone()
    }
}
