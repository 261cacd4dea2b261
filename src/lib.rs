/// YakCat: a consignment mall marketplace backend
///
/// Vendors list items with photos, shoppers browse and search the catalogue,
/// users exchange direct messages, staff moderate listings, and a forum and
/// events board support the mall community.
///
/// ### Modules
///
/// - `auth`: Session tokens, password hashing, reset tokens, the `AuthUser` extractor
/// - `config`: Layered configuration (defaults, TOML file, CLI and environment)
/// - `db`: Database connection management
/// - `dto`: Request bodies and response views
/// - `handlers`: HTTP handlers
/// - `models`: Data structures mapped to the database tables
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `seed`: Demo accounts and tags
/// - `state`: State shared by every handler
///
/// ### Web API
///
/// Everything lives under `/api`: `auth`, `items`, `my-items`, `tags`,
/// `messages`, `forum`, `events`, `profile` and `admin`. Errors are returned
/// as `{"error": "<message>"}`.

/// Authentication and authorization
pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects module
pub mod dto;

/// Error handling module
pub mod errors;

/// Web API handlers
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Demo data for local development
pub mod seed;

/// Shared application state
pub mod state;

#[cfg(test)]
mod test_utils;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::*;
use crate::state::AppState;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Builds the CORS layer for the configured origins
///
/// With no origins configured any origin is allowed. With a list, only those
/// origins are allowed and credentials (the session cookie) may be sent.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Creates the application router
///
/// ### Arguments
///
/// * `state` - Pool, signing keys and runtime options shared by the handlers
///
/// ### Returns
///
/// A router serving the whole `/api` surface, with request tracing and CORS
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Sessions and accounts
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/api/auth/forgot-password", post(forgot_password_handler))
        .route("/api/auth/reset-password", post(reset_password_handler))
        // Catalogue
        .route("/api/items", get(list_items_handler).post(create_item_handler))
        .route(
            "/api/items/{id}",
            get(get_item_handler).patch(update_item_handler).delete(delete_item_handler),
        )
        .route("/api/items/slug/{slug}", get(get_item_by_slug_handler))
        .route("/api/items/{id}/tags", post(add_item_tag_handler))
        .route("/api/items/{id}/tags/{tag_id}", delete(remove_item_tag_handler))
        .route("/api/my-items", get(my_items_handler))
        .route("/api/tags", get(list_tags_handler).post(create_tag_handler))
        // Direct messages
        .route("/api/messages", get(inbox_handler).post(send_message_handler))
        .route("/api/messages/sent", get(sent_messages_handler))
        .route("/api/messages/{id}/read", patch(mark_read_handler))
        // Community
        .route("/api/forum", get(list_posts_handler).post(create_post_handler))
        .route("/api/forum/{id}", delete(delete_post_handler))
        .route("/api/forum/{id}/pin", patch(pin_post_handler))
        .route("/api/events", get(list_events_handler).post(create_event_handler))
        // Own account
        .route("/api/profile", get(get_profile_handler).patch(update_profile_handler))
        .route("/api/profile/password", post(change_password_handler))
        // Administration
        .route("/api/admin/stats", get(admin_stats_handler))
        .route("/api/admin/items", get(admin_items_handler))
        .route("/api/admin/users", get(admin_users_handler))
        .route(
            "/api/admin/users/{id}",
            patch(admin_update_role_handler).delete(admin_delete_user_handler),
        )
        .route("/api/admin/settings", get(get_settings_handler).post(update_settings_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if any pending migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {}", e))?;

    if !applied.is_empty() {
        info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}
