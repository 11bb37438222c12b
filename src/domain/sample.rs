// Telemetry sample as received from a robot
use serde_json::{Map, Value};

pub const UNKNOWN_ROBOT_ID: &str = "unknown-robot";

const ABSOLUTE_ZERO_C: f64 = -273.15;
/// Hottest reading accepted from a temperature sensor.
const MAX_TEMPERATURE_C: f64 = 1_000.0;

/// State of one recognized channel after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Channel<T> {
    /// Key not present in the sample.
    Missing,
    /// Key present, but the value has the wrong type or is out of range.
    Unusable,
    Valid(T),
}

impl<T: Copy> Channel<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Channel::Valid(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T> Channel<T> {
    pub fn is_unusable(&self) -> bool {
        matches!(self, Channel::Unusable)
    }
}

/// One telemetry sample. The raw object is kept untouched, including keys the
/// evaluator does not recognize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySample {
    pub robot_id: String,
    pub raw: Map<String, Value>,
}

/// Typed view over the recognized channels of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Channels {
    pub temperature: Channel<f64>,
    pub humidity: Channel<f64>,
    pub distance: Channel<f64>,
    pub light: Channel<f64>,
    pub motion: Channel<bool>,
    pub battery: Channel<f64>,
    pub scenario: Channel<String>,
}

impl TelemetrySample {
    pub fn new(raw: Map<String, Value>) -> Self {
        let robot_id = raw
            .get("robot_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_ROBOT_ID)
            .to_string();
        Self { robot_id, raw }
    }

    /// Build a sample from any JSON value; only objects are samples.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(raw) => Some(Self::new(raw)),
            _ => None,
        }
    }

    pub fn channels(&self) -> Channels {
        Channels {
            temperature: self.number("temperature", |v| (ABSOLUTE_ZERO_C..=MAX_TEMPERATURE_C).contains(&v)),
            humidity: self.number("humidity", |v| (0.0..=100.0).contains(&v)),
            distance: self.number("distance", |v| v >= 0.0),
            light: self.number("light", |v| v >= 0.0),
            motion: match self.raw.get("motion") {
                None => Channel::Missing,
                Some(Value::Bool(b)) => Channel::Valid(*b),
                Some(_) => Channel::Unusable,
            },
            battery: self.number("battery", |v| (0.0..=100.0).contains(&v)),
            scenario: match self.raw.get("scenario") {
                None => Channel::Missing,
                Some(Value::String(s)) => Channel::Valid(s.clone()),
                Some(_) => Channel::Unusable,
            },
        }
    }

    fn number(&self, key: &str, in_range: impl Fn(f64) -> bool) -> Channel<f64> {
        match self.raw.get(key) {
            None => Channel::Missing,
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() && in_range(v) => Channel::Valid(v),
                _ => Channel::Unusable,
            },
            Some(_) => Channel::Unusable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(value: Value) -> TelemetrySample {
        TelemetrySample::from_json(value).unwrap()
    }

    #[test]
    fn test_robot_id_defaults() {
        assert_eq!(sample(json!({})).robot_id, UNKNOWN_ROBOT_ID);
        assert_eq!(sample(json!({"robot_id": 7})).robot_id, UNKNOWN_ROBOT_ID);
        assert_eq!(sample(json!({"robot_id": ""})).robot_id, UNKNOWN_ROBOT_ID);
        assert_eq!(sample(json!({"robot_id": "slam-robot-001"})).robot_id, "slam-robot-001");
    }

    #[test]
    fn test_only_objects_are_samples() {
        assert!(TelemetrySample::from_json(json!([1, 2])).is_none());
        assert!(TelemetrySample::from_json(json!("temperature")).is_none());
    }

    #[test]
    fn test_channel_parsing() {
        let channels = sample(json!({
            "temperature": 21.5,
            "humidity": "55",
            "distance": -1,
            "motion": false,
            "battery": null,
            "scenario": "warehouse",
            "lidar": [1, 2, 3]
        }))
        .channels();

        assert_eq!(channels.temperature, Channel::Valid(21.5));
        assert_eq!(channels.humidity, Channel::Unusable);
        assert_eq!(channels.distance, Channel::Unusable);
        assert_eq!(channels.light, Channel::Missing);
        assert_eq!(channels.motion, Channel::Valid(false));
        assert_eq!(channels.battery, Channel::Unusable);
        assert_eq!(channels.scenario, Channel::Valid("warehouse".to_string()));
    }

    #[test]
    fn test_out_of_range_values_are_unusable() {
        let channels = sample(json!({"humidity": 100.5, "battery": 101, "temperature": -300})).channels();
        assert!(channels.humidity.is_unusable());
        assert!(channels.battery.is_unusable());
        assert!(channels.temperature.is_unusable());
    }

    #[test]
    fn test_extreme_temperature_is_unusable() {
        let channels = sample(json!({"temperature": 1e307})).channels();
        assert!(channels.temperature.is_unusable());

        let channels = sample(json!({"temperature": 1000.5})).channels();
        assert!(channels.temperature.is_unusable());

        let channels = sample(json!({"temperature": 1000})).channels();
        assert_eq!(channels.temperature, Channel::Valid(1000.0));
    }
}
