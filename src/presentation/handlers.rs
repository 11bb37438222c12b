// HTTP request handlers
use crate::application::ingest_service::Analytics;
use crate::domain::evaluation::EvaluationResult;
use crate::domain::sample::TelemetrySample;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_RECENT_LIMIT: usize = 20;

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub message: &'static str,
    pub robot_id: String,
    pub processed_data: EvaluationResult,
    pub analytics: Analytics,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: &'static str,
    pub error: String,
}

fn error_response(status: StatusCode, message: &'static str, error: impl ToString) -> Response {
    let body = ErrorBody {
        message,
        error: error.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Evaluate and store one robot reading
pub async fn ingest_reading(State(state): State<Arc<AppState>>, Json(event): Json<Value>) -> Response {
    let Some(sample) = TelemetrySample::from_json(event) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Error processing robot data",
            "reading must be a JSON object",
        );
    };

    let outcome = state.ingest_service.ingest(sample).await;
    let message = if outcome.analytics.stored {
        "Robot data processed and stored successfully"
    } else {
        "Robot data processed; storage unavailable"
    };

    let response = IngestResponse {
        message,
        robot_id: outcome.result.robot_id.clone(),
        processed_data: outcome.result,
        analytics: outcome.analytics,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// List the most recent stored readings for a robot
pub async fn recent_readings(
    Path(robot_id): Path<String>,
    Query(query): Query<RecentQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);

    match state.ingest_service.recent_readings(&robot_id, limit).await {
        Ok(items) => {
            let readings: Vec<Value> = items
                .iter()
                .filter_map(|item| {
                    let json = item.to_json();
                    if json.is_none() {
                        tracing::warn!(id = %item.id, "stored item holds an invalid decimal, skipping");
                    }
                    json
                })
                .collect();
            Json(readings).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, robot_id = %robot_id, "failed to fetch readings");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching robot readings", e)
        }
    }
}
