use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use tracing::debug;

use crate::errors::ApiError;
use crate::models::{Role, User};
use crate::repo;
use crate::state::AppState;

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// The signed-in user behind a request
///
/// Extraction fails with 401 when there is no token, the token does not
/// verify, or the account it names no longer exists. The user is loaded
/// fresh from the database, so role changes take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    pub fn id(&self) -> String {
        self.0.get_id()
    }

    pub fn role(&self) -> Role {
        self.0.get_role()
    }

    /// Fails with 403 unless the user is an ADMIN
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role() == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Fails with 403 unless the user is ADMIN or STAFF
    pub fn require_staff(&self) -> Result<(), ApiError> {
        if self.role().is_staff() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Vendors manage their own listings; staff manage all of them
    pub fn can_manage_item(&self, vendor_id: &str) -> bool {
        self.role().is_staff() || self.0.get_id() == vendor_id
    }

    /// Fails with 403 unless the user owns the resource or is staff
    pub fn require_owner_or_staff(&self, owner_id: &str) -> Result<(), ApiError> {
        if self.can_manage_item(owner_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Pulls the raw token from the bearer header, falling back to the cookie
fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(&parts.headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = token_from_parts(parts).ok_or(ApiError::Unauthorized)?;

        let claims = state.keys.verify(&token).map_err(|e| {
            debug!("Rejected session token: {}", e);
            ApiError::Unauthorized
        })?;

        match repo::get_user(&state.pool, &claims.user_id)? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                debug!(user_id = %claims.user_id, "Token names a deleted account");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// HttpOnly cookie that stores a session token for `max_age`
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .secure(secure)
        .build()
}

/// Expired cookie that removes the session token
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}
