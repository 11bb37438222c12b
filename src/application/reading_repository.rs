// Repository trait for evaluated reading storage
use crate::domain::stored_reading::StoredReading;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("send request to store: {0}")]
    Request(String),

    #[error("store responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store query error: {0}")]
    Query(String),

    #[error("encode or decode stored item: {0}")]
    Codec(#[from] serde_json::Error),
}

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Write one item, replacing any item with the same composite key
    async fn put_reading(&self, item: StoredReading) -> Result<(), StoreError>;

    /// Most recent items for a robot, newest first
    async fn recent_readings(&self, robot_id: &str, limit: usize) -> Result<Vec<StoredReading>, StoreError>;
}
