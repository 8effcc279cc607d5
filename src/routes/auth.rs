use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Role, Session};
use crate::users::RegistrationRequest;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Session,
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub logged_in: bool,
    pub user: Option<Session>,
}

/// Register a new account
///
/// Returns 201 with the new user's name and role. The caller logs in
/// separately.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let portal = state.portal.clone();
    let user = tokio::task::spawn_blocking(move || portal.register(&payload)).await??;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            username: user.username,
            role: user.role,
        }),
    ))
}

/// Log in by username or email
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    let portal = state.portal.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        portal.login(&payload.username, &payload.password, payload.remember_me)
    })
    .await??;

    Ok(Json(LoginResponse {
        success: true,
        user: outcome.session,
        redirect: outcome.redirect,
    }))
}

pub async fn logout(State(state): State<AppState>) -> Result<StatusCode> {
    let portal = state.portal.clone();
    tokio::task::spawn_blocking(move || portal.logout()).await??;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_session(State(state): State<AppState>) -> Result<Json<SessionResponse>> {
    let portal = state.portal.clone();
    let session = tokio::task::spawn_blocking(move || portal.session()).await??;

    Ok(Json(SessionResponse {
        logged_in: session.is_some(),
        user: session,
    }))
}
