// Rule evaluation of a single telemetry sample
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::rules::{self, ActivityStatus, AlertTag, LightingCondition, OverallStatus, RiskLevel};
use super::sample::{Channel, TelemetrySample};

/// Normalized record produced from exactly one sample.
///
/// Channel fields are `None` when the channel was absent or unusable; those
/// are left out of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub robot_id: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub raw_data: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_celsius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_fahrenheit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_alert: Option<AlertTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_alert: Option<AlertTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obstacle_alert: Option<AlertTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting_condition: Option<LightingCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting_alert: Option<AlertTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_status: Option<ActivityStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_alert: Option<AlertTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,

    /// Recognized channels that were present but could not be used.
    #[serde(default)]
    pub skipped_channels: Vec<String>,

    pub active_alerts: Vec<AlertTag>,
    pub alert_count: usize,
    pub overall_status: OverallStatus,
    pub health_score: u8,
}

impl EvaluationResult {
    /// Timestamp in the form used for storage keys and responses.
    pub fn timestamp_string(&self) -> String {
        format_timestamp(&self.timestamp)
    }

    /// Composite storage key: `<robot_id>#<timestamp>`.
    pub fn storage_key(&self) -> String {
        format!("{}#{}", self.robot_id, self.timestamp_string())
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_timestamp<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

/// Evaluate a sample, stamping it with the current time.
pub fn evaluate(sample: &TelemetrySample) -> EvaluationResult {
    evaluate_at(sample, Utc::now())
}

/// Evaluate a sample against the fixed rule set. Never fails: unusable
/// channels are recorded in `skipped_channels` and otherwise ignored.
pub fn evaluate_at(sample: &TelemetrySample, now: DateTime<Utc>) -> EvaluationResult {
    let channels = sample.channels();
    let mut skipped_channels = Vec::new();
    let mut skip_if_unusable = |name: &str, unusable: bool| {
        if unusable {
            skipped_channels.push(name.to_string());
        }
    };

    skip_if_unusable("temperature", channels.temperature.is_unusable());
    let temperature_celsius = channels.temperature.value();
    let temperature_fahrenheit = temperature_celsius.map(rules::celsius_to_fahrenheit);
    let temperature_alert = temperature_celsius.and_then(rules::temperature_alert);

    skip_if_unusable("humidity", channels.humidity.is_unusable());
    let humidity = channels.humidity.value();
    let humidity_alert = humidity.and_then(rules::humidity_alert);

    skip_if_unusable("distance", channels.distance.is_unusable());
    let distance = channels.distance.value();
    let risk_level = distance.map(rules::risk_level);
    let obstacle_alert = risk_level.and_then(rules::obstacle_alert);

    skip_if_unusable("light", channels.light.is_unusable());
    let light_level = channels.light.value();
    let lighting_condition = light_level.map(rules::lighting_condition);
    let lighting_alert = lighting_condition.and_then(rules::lighting_alert);

    skip_if_unusable("motion", channels.motion.is_unusable());
    let motion_detected = channels.motion.value();
    let activity_status = motion_detected.map(rules::activity_status);

    skip_if_unusable("battery", channels.battery.is_unusable());
    let battery_level = channels.battery.value();
    let battery_alert = battery_level.and_then(rules::battery_alert);

    skip_if_unusable("scenario", channels.scenario.is_unusable());
    let scenario = match channels.scenario {
        Channel::Valid(s) => Some(s),
        _ => None,
    };

    let active_alerts: Vec<AlertTag> = [
        temperature_alert,
        humidity_alert,
        obstacle_alert,
        lighting_alert,
        battery_alert,
    ]
    .into_iter()
    .flatten()
    .collect();
    let alert_count = active_alerts.len();

    EvaluationResult {
        robot_id: sample.robot_id.clone(),
        timestamp: now,
        raw_data: sample.raw.clone(),
        temperature_celsius,
        temperature_fahrenheit,
        temperature_alert,
        humidity,
        humidity_alert,
        distance,
        obstacle_alert,
        risk_level,
        light_level,
        lighting_condition,
        lighting_alert,
        motion_detected,
        activity_status,
        battery_level,
        battery_alert,
        scenario,
        skipped_channels,
        overall_status: OverallStatus::from_alert_count(alert_count),
        health_score: rules::health_score(battery_level, alert_count, risk_level),
        active_alerts,
        alert_count,
    }
}
