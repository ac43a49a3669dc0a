//! `/health` endpoints.
//!
//! Readiness depends on the wine store as well as the lifecycle state: a
//! server whose store cannot count its records is not ready for traffic.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use super::AppState;
use crate::network::HealthState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub state: &'static str,
    /// Stored wine count, `None` when the store did not answer.
    pub wines: Option<u64>,
    pub in_flight: u64,
    pub uptime_secs: u64,
}

async fn wine_count(state: &AppState) -> Option<u64> {
    match state.store.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "wine store did not answer health check");
            None
        }
    }
}

/// Always 200; the body says how healthy the server is.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        state: state.shutdown.health_state().as_str(),
        wines: wine_count(&state).await,
        in_flight: state.shutdown.in_flight_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// The process is up.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// 200 only while serving normally and the store answers; 503 otherwise.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state() != HealthState::Ready {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match wine_count(&state).await {
        Some(_) => StatusCode::OK,
        None => StatusCode::SERVICE_UNAVAILABLE,
    }
}
