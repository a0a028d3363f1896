//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Always `{"status": "ok"}`; no upstream or credential involved.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
