use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, instrument, warn};

use crate::auth::{
    clear_session_cookie, consume_reset_token, hash_password, issue_reset_token, password_long_enough,
    reset_link, session_cookie, verify_password, AuthUser, MIN_PASSWORD_LEN,
};
use crate::db::is_unique_violation;
use crate::dto::{
    AuthResponse, ForgotPasswordDto, LoginDto, MessageResponse, RegisterDto, ResetPasswordDto, SessionUser,
    SuccessResponse,
};
use crate::errors::ApiError;
use crate::models::{Role, User};
use crate::repo;
use crate::state::AppState;

use super::{optional_text, Json};

const FORGOT_PASSWORD_REPLY: &str = "If an account exists for that email, a password reset link has been sent";

/// Builds the login/registration response: token in the body and in a cookie
fn session_response(state: &AppState, user: &User) -> Result<impl IntoResponse + use<>, ApiError> {
    let token = state
        .keys
        .issue(user)
        .map_err(|e| ApiError::Database(anyhow::anyhow!("failed to sign session token: {}", e)))?;
    let cookie = session_cookie(&token, state.keys.ttl(), state.options.secure_cookies);

    Ok((
        CookieJar::new().add(cookie),
        Json(AuthResponse { user: SessionUser::from(user), token }),
    ))
}

/// Handler for signing in
///
/// This function handles POST requests to `/api/auth/login`. An unknown email
/// and a wrong password produce the same 401.
///
/// ### Returns
///
/// The session user and token, with the token also set as an HttpOnly cookie
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginDto>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let Some(user) = repo::get_user_by_email(&state.pool, &payload.email)? else {
        debug!("Login for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, user.get_password_hash()).await? {
        debug!("Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.get_id(), "User signed in");
    session_response(&state, &user)
}

/// Handler for creating a vendor account
///
/// This function handles POST requests to `/api/auth/register`.
///
/// ### Returns
///
/// Same shape as login. 403 while registration is switched off in the site
/// settings, 409 when the email is taken.
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDto>,
) -> Result<impl IntoResponse, ApiError> {
    if !repo::get_settings(&state.pool)?.allow_registration {
        return Err(ApiError::Forbidden);
    }

    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if !password_long_enough(&payload.password) {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if repo::get_user_by_email(&state.pool, email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hash = hash_password(&payload.password, state.options.bcrypt_cost).await?;
    let user = repo::create_user(&state.pool, email, optional_text(payload.name), hash, Role::Vendor)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Email already registered".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

    info!(user_id = %user.get_id(), "Registered new vendor");
    session_response(&state, &user)
}

/// Clears the session cookie; works with or without a session
#[instrument]
pub async fn logout_handler() -> impl IntoResponse {
    (CookieJar::new().add(clear_session_cookie()), Json(SuccessResponse::ok()))
}

/// The signed-in user's own record
pub async fn me_handler(user: AuthUser) -> Json<User> {
    Json(user.0)
}

/// Handler for requesting a password reset
///
/// This function handles POST requests to `/api/auth/forgot-password`. The
/// reply is the same whether or not the account exists; in dev mode it also
/// carries the token and link.
#[instrument(skip(state, payload))]
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordDto>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let mut response = MessageResponse::new(FORGOT_PASSWORD_REPLY);

    if let Some(token) = issue_reset_token(&state.pool, &payload.email, state.options.reset_token_ttl).await? {
        let link = reset_link(&state.options.public_url, &token);
        // No mail transport: the link goes to the log for the operator
        info!(reset_link = %link, "Issued password reset link");

        if state.options.dev_mode {
            response.reset_token = Some(token);
            response.reset_link = Some(link);
        }
    }

    Ok(Json(response))
}

/// Handler for choosing a new password with a reset token
///
/// This function handles POST requests to `/api/auth/reset-password`.
#[instrument(skip_all)]
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordDto>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.token.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Token and password are required"));
    }
    if !password_long_enough(&payload.password) {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let hash = hash_password(&payload.password, state.options.bcrypt_cost).await?;
    if !consume_reset_token(&state.pool, payload.token.trim(), &hash).await? {
        warn!("Rejected invalid or expired reset token");
        return Err(ApiError::bad_request("Invalid or expired reset token"));
    }

    info!("Password reset completed");
    Ok(Json(MessageResponse::new("Password has been reset")))
}
