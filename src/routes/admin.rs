use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::models::UserSummary;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub user_count: usize,
    pub users: Vec<UserSummary>,
}

/// Registered accounts
///
/// Requires an admin session.
///
/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>> {
    let portal = state.portal.clone();
    let users = tokio::task::spawn_blocking(move || portal.users()).await??;

    Ok(Json(UserListResponse {
        user_count: users.len(),
        users,
    }))
}
