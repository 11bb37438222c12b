// InfluxDB repository implementation
use crate::application::reading_repository::{ReadingRepository, StoreError};
use crate::domain::stored_reading::{AttributeValue, StoredReading};
use async_trait::async_trait;
use serde::Deserialize;

const MEASUREMENT: &str = "robot_reading";

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
}

fn request_error(e: reqwest::Error) -> StoreError {
    StoreError::Request(e.to_string())
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(host: String, token: String, database: String, retention_policy: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.retention_policy),
            urlencoding::encode(query)
        )
    }

    fn build_write_url(&self) -> String {
        format!(
            "{}/write?db={}&rp={}&precision=ns",
            self.host,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.retention_policy)
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse, StoreError> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let data = response.json::<InfluxQLResponse>().await.map_err(request_error)?;

        if let Some(error) = data.results.first().and_then(|r| r.error.as_ref()) {
            return Err(StoreError::Query(error.clone()));
        }

        Ok(data)
    }

    /// Encode one item as a line-protocol point.
    fn to_line(item: &StoredReading) -> Result<String, StoreError> {
        let encoded_item = serde_json::to_string(item)?;
        let mut fields = vec![
            format!("id={}", quote_field(&item.id)),
            format!("item={}", quote_field(&encoded_item)),
        ];
        for key in ["health_score", "alert_count"] {
            if let Some(AttributeValue::Number(n)) = item.attributes.get(key) {
                fields.push(format!("{}={}i", key, n));
            }
        }

        let mut line = format!("{},robot_id={} {}", MEASUREMENT, escape_tag(&item.robot_id), fields.join(","));
        if let Some(nanos) = chrono::DateTime::parse_from_rfc3339(&item.timestamp)
            .ok()
            .and_then(|t| t.timestamp_nanos_opt())
        {
            line.push_str(&format!(" {}", nanos));
        }
        Ok(line)
    }

    fn parse_items(response: InfluxQLResponse) -> Result<Vec<StoredReading>, StoreError> {
        let mut items = Vec::new();
        for result in response.results {
            for series in result.series.unwrap_or_default() {
                let Some(item_idx) = series.columns.iter().position(|c| c == "item") else {
                    continue;
                };
                for row in &series.values {
                    if let Some(encoded) = row.get(item_idx).and_then(|v| v.as_str()) {
                        items.push(serde_json::from_str(encoded)?);
                    }
                }
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl ReadingRepository for InfluxRepository {
    async fn put_reading(&self, item: StoredReading) -> Result<(), StoreError> {
        let line = Self::to_line(&item)?;
        tracing::debug!(id = %item.id, "writing reading to InfluxDB");

        let response = self
            .client
            .post(self.build_write_url())
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(line)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(())
    }

    async fn recent_readings(&self, robot_id: &str, limit: usize) -> Result<Vec<StoredReading>, StoreError> {
        let query = format!(
            "SELECT \"item\" FROM \"{}\" WHERE \"robot_id\" = '{}' ORDER BY time DESC LIMIT {}",
            MEASUREMENT,
            escape_string_literal(robot_id),
            limit
        );

        tracing::debug!("Executing recent readings query: {}", query);
        let response = self.execute_query(&query).await?;
        let items = Self::parse_items(response)?;

        tracing::debug!("Found {} readings for robot {}", items.len(), robot_id);
        Ok(items)
    }
}

fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '=' | ' ' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_string_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item() -> StoredReading {
        let mut attributes = BTreeMap::new();
        attributes.insert("health_score".to_string(), AttributeValue::Number("90".to_string()));
        attributes.insert("alert_count".to_string(), AttributeValue::Number("1".to_string()));
        attributes.insert("scenario".to_string(), AttributeValue::String("say \"hi\"".to_string()));
        StoredReading {
            id: "robot 1#2025-01-01T00:00:00.000001Z".to_string(),
            robot_id: "robot 1".to_string(),
            timestamp: "2025-01-01T00:00:00.000001Z".to_string(),
            attributes,
        }
    }

    #[test]
    fn test_line_protocol() {
        let line = InfluxRepository::to_line(&item()).unwrap();

        assert!(line.starts_with("robot_reading,robot_id=robot\\ 1 id=\"robot 1#2025-01-01T00:00:00.000001Z\",item=\""));
        assert!(line.contains(",health_score=90i,alert_count=1i"));
        assert!(line.ends_with(" 1735689600000001000"));
        assert!(line.contains("say \\\\\\\"hi\\\\\\\""));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let repository = InfluxRepository::new(
            "http://127.0.0.1:1".to_string(),
            "token".to_string(),
            "robots".to_string(),
            "autogen".to_string(),
        );

        let err = repository.put_reading(item()).await.unwrap_err();
        assert!(matches!(err, StoreError::Request(_)), "unexpected error: {err}");
    }

    #[test]
    fn test_parse_items() {
        let encoded = serde_json::to_string(&item()).unwrap();
        let body = serde_json::json!({
            "results": [{
                "series": [{
                    "name": "robot_reading",
                    "columns": ["time", "item"],
                    "values": [["2025-01-01T00:00:00.000001Z", encoded]]
                }]
            }]
        });
        let response: InfluxQLResponse = serde_json::from_value(body).unwrap();

        let items = InfluxRepository::parse_items(response).unwrap();
        assert_eq!(items, vec![item()]);
    }

    #[test]
    fn test_query_url_encoding() {
        let repository = InfluxRepository::new(
            "http://localhost:8086/".to_string(),
            "token".to_string(),
            "robots".to_string(),
            "autogen".to_string(),
        );

        assert_eq!(
            repository.build_query_url("SELECT 1"),
            "http://localhost:8086/query?db=robots&rp=autogen&q=SELECT%201"
        );
        assert_eq!(
            repository.build_write_url(),
            "http://localhost:8086/write?db=robots&rp=autogen&precision=ns"
        );
        assert_eq!(escape_string_literal("o'neil"), "o\\'neil");
    }
}
