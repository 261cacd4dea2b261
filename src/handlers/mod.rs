/// Web API Handlers
///
/// Each handler extracts what it needs from the request (state, the signed-in
/// user, path and body), checks permissions, calls the repository layer and
/// shapes the JSON response. Ownership checks always run after the existence
/// check, so a missing resource is a 404 for everyone.

mod json;
mod views;

mod auth_handlers;
mod item_handlers;
mod tag_handlers;
mod message_handlers;
mod forum_handlers;
mod event_handlers;
mod profile_handlers;
mod admin_handlers;

// Re-export all handlers
pub use auth_handlers::*;
pub use item_handlers::*;
pub use tag_handlers::*;
pub use message_handlers::*;
pub use forum_handlers::*;
pub use event_handlers::*;
pub use profile_handlers::*;
pub use admin_handlers::*;

use crate::errors::ApiError;

pub use json::Json;

/// Upper bound on rows returned by the public list endpoints
pub const LIST_LIMIT: i64 = 50;

/// Trims `value` and fails with a 400 carrying `message` when nothing is left
pub(crate) fn required_text(value: &str, message: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::bad_request(message))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trims an optional text field; blank becomes `None`
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn check_price(price: Option<f64>) -> Result<Option<f64>, ApiError> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(ApiError::bad_request("Price must be a non-negative number")),
        other => Ok(other),
    }
}
