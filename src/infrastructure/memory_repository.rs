// In-process key-value table for evaluated readings
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::stored_reading::StoredReading;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

pub const DEFAULT_MAX_ITEMS: usize = 10_000;

#[derive(Debug, Default)]
struct Table {
    items: HashMap<String, StoredReading>,
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
}

/// Bounded table: once `max_items` is reached the oldest item is evicted.
#[derive(Debug)]
pub struct MemoryRepository {
    table: RwLock<Table>,
    max_items: usize,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::with_max_items(DEFAULT_MAX_ITEMS)
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_items(max_items: usize) -> Self {
        Self {
            table: RwLock::new(Table::default()),
            max_items: max_items.max(1),
        }
    }
}

#[async_trait]
impl ReadingRepository for MemoryRepository {
    async fn put_reading(&self, item: StoredReading) -> Result<(), StoreError> {
        tracing::debug!(id = %item.id, "put item");
        let mut table = self.table.write().await;

        let id = item.id.clone();
        if table.items.insert(id.clone(), item).is_none() {
            table.order.push_back(id);
        }

        while table.items.len() > self.max_items {
            let Some(oldest) = table.order.pop_front() else {
                break;
            };
            table.items.remove(&oldest);
            tracing::debug!(id = %oldest, "evicted oldest item");
        }
        Ok(())
    }

    async fn recent_readings(&self, robot_id: &str, limit: usize) -> Result<Vec<StoredReading>, StoreError> {
        let table = self.table.read().await;
        let mut readings: Vec<StoredReading> = table
            .items
            .values()
            .filter(|item| item.robot_id == robot_id)
            .cloned()
            .collect();

        // Fixed-width UTC timestamps sort lexically
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        readings.truncate(limit);
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(robot_id: &str, timestamp: &str) -> StoredReading {
        StoredReading {
            id: format!("{}#{}", robot_id, timestamp),
            robot_id: robot_id.to_string(),
            timestamp: timestamp.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_recent_readings_newest_first() {
        let repository = MemoryRepository::new();
        repository.put_reading(item("r1", "2025-01-01T00:00:01.000000Z")).await.unwrap();
        repository.put_reading(item("r1", "2025-01-01T00:00:03.000000Z")).await.unwrap();
        repository.put_reading(item("r2", "2025-01-01T00:00:04.000000Z")).await.unwrap();
        repository.put_reading(item("r1", "2025-01-01T00:00:02.000000Z")).await.unwrap();

        let readings = repository.recent_readings("r1", 2).await.unwrap();
        let timestamps: Vec<&str> = readings.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(timestamps, vec!["2025-01-01T00:00:03.000000Z", "2025-01-01T00:00:02.000000Z"]);
    }

    #[tokio::test]
    async fn test_same_key_replaces_item() {
        let repository = MemoryRepository::new();
        repository.put_reading(item("r1", "2025-01-01T00:00:01.000000Z")).await.unwrap();
        repository.put_reading(item("r1", "2025-01-01T00:00:01.000000Z")).await.unwrap();

        assert_eq!(repository.recent_readings("r1", 10).await.unwrap().len(), 1);
        assert!(repository.recent_readings("missing", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oldest_items_are_evicted_past_capacity() {
        let repository = MemoryRepository::with_max_items(3);
        for second in 1..=5 {
            let timestamp = format!("2025-01-01T00:00:0{}.000000Z", second);
            repository.put_reading(item("r1", &timestamp)).await.unwrap();
        }

        let readings = repository.recent_readings("r1", 10).await.unwrap();
        let timestamps: Vec<&str> = readings.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            timestamps,
            vec![
                "2025-01-01T00:00:05.000000Z",
                "2025-01-01T00:00:04.000000Z",
                "2025-01-01T00:00:03.000000Z",
            ]
        );
    }

    #[tokio::test]
    async fn test_replacing_an_item_does_not_evict() {
        let repository = MemoryRepository::with_max_items(2);
        repository.put_reading(item("r1", "2025-01-01T00:00:01.000000Z")).await.unwrap();
        repository.put_reading(item("r2", "2025-01-01T00:00:02.000000Z")).await.unwrap();
        repository.put_reading(item("r1", "2025-01-01T00:00:01.000000Z")).await.unwrap();

        assert_eq!(repository.recent_readings("r1", 10).await.unwrap().len(), 1);
        assert_eq!(repository.recent_readings("r2", 10).await.unwrap().len(), 1);
    }
}
