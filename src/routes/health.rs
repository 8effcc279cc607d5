use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports whether the profile store can be read.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let portal = state.portal.clone();
    let store_status = tokio::task::spawn_blocking(move || match portal.session() {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("Profile health check failed: {:?}", e);
            "disconnected"
        }
    })
    .await
    .unwrap_or("error");

    Json(json!({
        "status": if store_status == "connected" { "healthy" } else { "unhealthy" },
        "store": store_status,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
