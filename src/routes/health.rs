use axum::Json;
use serde_json::{json, Value};

/// Health check endpoint
///
/// Returns 200 OK while the service is running.
/// Not rate-limited, suitable for Kubernetes probes and uptime checks.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "health"
)]
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
