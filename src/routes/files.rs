use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{parse_file_id, parse_variant};
use crate::error::Result;
use crate::files::CategoryListing;
use crate::models::{DownloadEntry, FileDescriptor, FileRecord, FolderEntry};
use crate::portal::{BatchReport, DashboardStats};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<FileDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct FolderUploadRequest {
    pub files: Vec<FolderEntry>,
}

/// Every category of a dashboard with its records
///
/// GET /api/dashboards/:variant/files
pub async fn list_files(
    State(state): State<AppState>,
    Path(variant): Path<String>,
) -> Result<Json<Vec<CategoryListing>>> {
    let variant = parse_variant(&variant)?;
    let portal = state.portal.clone();
    let listing = tokio::task::spawn_blocking(move || portal.files(variant)).await??;
    Ok(Json(listing))
}

/// Start uploading a batch of picked files
///
/// Responds 202 once validation is done; transfers finish in the background
/// and are reported on the event stream.
///
/// POST /api/dashboards/:variant/:category/files
pub async fn upload_files(
    State(state): State<AppState>,
    Path((variant, category)): Path<(String, String)>,
    Json(payload): Json<UploadRequest>,
) -> Result<(StatusCode, Json<BatchReport>)> {
    let variant = parse_variant(&variant)?;
    let portal = state.portal.clone();
    let batch = tokio::task::spawn_blocking(move || portal.upload(variant, &category, payload.files))
        .await??;

    Ok((StatusCode::ACCEPTED, Json(batch.report)))
}

/// POST /api/dashboards/:variant/:category/folders
pub async fn upload_folder(
    State(state): State<AppState>,
    Path((variant, category)): Path<(String, String)>,
    Json(payload): Json<FolderUploadRequest>,
) -> Result<(StatusCode, Json<BatchReport>)> {
    let variant = parse_variant(&variant)?;
    let portal = state.portal.clone();
    let batch = tokio::task::spawn_blocking(move || {
        portal.upload_folder(variant, &category, payload.files)
    })
    .await??;

    Ok((StatusCode::ACCEPTED, Json(batch.report)))
}

/// DELETE /api/dashboards/:variant/:category/files/:id
pub async fn delete_file(
    State(state): State<AppState>,
    Path((variant, category, id)): Path<(String, String, String)>,
) -> Result<Json<FileRecord>> {
    let variant = parse_variant(&variant)?;
    let id = parse_file_id(&id)?;
    let portal = state.portal.clone();
    let removed = tokio::task::spawn_blocking(move || portal.delete(variant, &category, id)).await??;
    Ok(Json(removed))
}

/// POST /api/dashboards/:variant/:category/files/:id/download
pub async fn download_file(
    State(state): State<AppState>,
    Path((variant, category, id)): Path<(String, String, String)>,
) -> Result<Json<FileRecord>> {
    let variant = parse_variant(&variant)?;
    let id = parse_file_id(&id)?;
    let portal = state.portal.clone();
    let record = tokio::task::spawn_blocking(move || portal.download(variant, &category, id)).await??;
    Ok(Json(record))
}

/// GET /api/dashboards/:variant/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Path(variant): Path<String>,
) -> Result<Json<DashboardStats>> {
    let variant = parse_variant(&variant)?;
    let portal = state.portal.clone();
    let stats = tokio::task::spawn_blocking(move || portal.stats(variant)).await??;
    Ok(Json(stats))
}

/// Latest entries of the download history
///
/// GET /api/downloads/recent
pub async fn recent_downloads(State(state): State<AppState>) -> Result<Json<Vec<DownloadEntry>>> {
    let portal = state.portal.clone();
    let entries = tokio::task::spawn_blocking(move || portal.recent_downloads()).await??;
    Ok(Json(entries))
}
