//! System/health API handlers.
//!
//! Health checks must be fast and side-effect free; the metrics endpoint only
//! renders what the recorder already holds.
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;

/// Return admission service health.
pub(crate) async fn system_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

/// Render Prometheus text exposition.
pub(crate) async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
