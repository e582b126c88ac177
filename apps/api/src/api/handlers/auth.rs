use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::cookies::{CookieBuilder, ACCESS_TOKEN_COOKIE, ACTIVE_TEAM_COOKIE};
use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::verify_password;
use crate::domain::user::Email;

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    // An address that cannot exist gets the same answer as an unknown one
    let email = Email::new(&req.email).map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let account = state
        .users
        .find_account_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &account.password_hash)? {
        tracing::info!(user_id = %account.profile.id, "Failed login attempt");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let user_id = account.profile.id;
    if let Err(e) = state.users.update_last_login(user_id).await {
        tracing::warn!(user_id = %user_id, error = %e, "Failed to record last login");
    }

    let token = create_token(user_id, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;
    let cookies = CookieBuilder::from_config(&state.config);

    tracing::info!(user_id = %user_id, "User logged in");

    Ok((
        jar.add(cookies.access_token(token.clone())),
        Json(LoginResponse { token, user_id }),
    ))
}

/// Clears the session and the active team
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let cookies = CookieBuilder::from_config(&state.config);
    let jar = jar
        .add(cookies.expired(ACCESS_TOKEN_COOKIE))
        .add(cookies.expired(ACTIVE_TEAM_COOKIE));

    (jar, StatusCode::NO_CONTENT)
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
