// Router construction
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, ingest_reading, recent_readings};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/readings", post(ingest_reading))
        .route("/robots/:robot_id/readings", get(recent_readings))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
