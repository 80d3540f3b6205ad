//! HTTP surface: health checks, Prometheus metrics and the ranking endpoint.

mod infra;
mod routes;
mod server;

pub use infra::{parse_date, AppState};
pub use server::serve;

use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::healthcheck))
        .route("/ready", get(routes::readiness_endpoint))
        .route("/metrics", get(routes::metrics_endpoint))
        .route("/api/v1/scoring/rank", post(routes::rank_endpoint))
        .with_state(state)
}
