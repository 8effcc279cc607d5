pub mod admin;
pub mod auth;
pub mod files;
pub mod health;

pub use admin::list_users;
pub use auth::{current_session, login, logout, register};
pub use files::{
    dashboard_stats, delete_file, download_file, list_files, recent_downloads, upload_files,
    upload_folder,
};
pub use health::health_check;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::files::DashboardVariant;
use crate::models::FileId;
use crate::{AppError, AppState, Result};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/session", get(current_session))
        .route("/api/dashboards/:variant/files", get(list_files))
        .route("/api/dashboards/:variant/stats", get(dashboard_stats))
        .route("/api/dashboards/:variant/:category/files", post(upload_files))
        .route("/api/dashboards/:variant/:category/folders", post(upload_folder))
        .route("/api/dashboards/:variant/:category/files/:id", delete(delete_file))
        .route(
            "/api/dashboards/:variant/:category/files/:id/download",
            post(download_file),
        )
        .route("/api/downloads/recent", get(recent_downloads))
        .route("/api/admin/users", get(list_users))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn parse_variant(raw: &str) -> Result<DashboardVariant> {
    raw.parse().map_err(AppError::InvalidInput)
}

pub(crate) fn parse_file_id(raw: &str) -> Result<FileId> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid file id: {}", raw)))
}
