//! Health check route

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    limits: LimitsInfo,
}

#[derive(Serialize)]
struct LimitsInfo {
    max_batch_size: usize,
    max_html_size: usize,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let limits = &state.config().limits;
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        limits: LimitsInfo {
            max_batch_size: limits.max_batch_size,
            max_html_size: limits.max_html_size,
        },
    })
}
