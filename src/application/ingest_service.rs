// Ingest service - Use case for evaluating and storing robot readings
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::evaluation::{self, EvaluationResult};
use crate::domain::sample::TelemetrySample;
use crate::domain::stored_reading::StoredReading;
use serde::Serialize;
use std::sync::Arc;

/// Upper bound for `recent_readings` requests.
pub const MAX_RECENT_READINGS: usize = 500;

/// Analytics attached to every processed reading.
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub data_points_processed: u32,
    pub timestamp: String,
    pub robot_health_score: u8,
    pub stored: bool,
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub result: EvaluationResult,
    pub analytics: Analytics,
}

#[derive(Clone)]
pub struct IngestService {
    repository: Arc<dyn ReadingRepository>,
}

impl IngestService {
    pub fn new(repository: Arc<dyn ReadingRepository>) -> Self {
        Self { repository }
    }

    /// Evaluate one sample and store it. Storage failures are logged and
    /// reported through `analytics.stored`; the evaluation is always returned.
    #[tracing::instrument(skip_all, fields(robot_id = %sample.robot_id))]
    pub async fn ingest(&self, sample: TelemetrySample) -> IngestOutcome {
        let result = evaluation::evaluate(&sample);

        if !result.skipped_channels.is_empty() {
            tracing::warn!(skipped = ?result.skipped_channels, "skipped unusable channels");
        }
        for alert in &result.active_alerts {
            tracing::warn!(%alert, "robot alert raised");
        }

        let stored = match self.store(&result).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to store reading, continuing");
                false
            }
        };

        tracing::info!(
            alert_count = result.alert_count,
            overall_status = ?result.overall_status,
            health_score = result.health_score,
            stored,
            "reading processed"
        );

        let analytics = Analytics {
            data_points_processed: 1,
            timestamp: result.timestamp_string(),
            robot_health_score: result.health_score,
            stored,
        };

        IngestOutcome { result, analytics }
    }

    async fn store(&self, result: &EvaluationResult) -> Result<(), StoreError> {
        let item = StoredReading::from_result(result)?;
        self.repository.put_reading(item).await
    }

    pub async fn recent_readings(&self, robot_id: &str, limit: usize) -> Result<Vec<StoredReading>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = limit.min(MAX_RECENT_READINGS);
        self.repository.recent_readings(robot_id, limit).await
    }
}
