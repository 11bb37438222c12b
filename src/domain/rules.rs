// Threshold rules for robot sensor channels
//
// Comparisons are strict: a value equal to a threshold does not cross it.
use serde::{Deserialize, Serialize};

pub const HIGH_TEMPERATURE_C: f64 = 30.0;
pub const LOW_TEMPERATURE_C: f64 = 10.0;

pub const HIGH_HUMIDITY_PCT: f64 = 80.0;
pub const LOW_HUMIDITY_PCT: f64 = 20.0;

pub const HIGH_RISK_DISTANCE_CM: f64 = 20.0;
pub const MEDIUM_RISK_DISTANCE_CM: f64 = 50.0;

pub const BRIGHT_LUX: f64 = 700.0;
pub const NORMAL_LUX: f64 = 300.0;
pub const DIM_LUX: f64 = 100.0;

pub const CRITICAL_BATTERY_PCT: f64 = 20.0;
pub const LOW_BATTERY_PCT: f64 = 30.0;

/// Battery level below which the health score takes the smaller penalty.
pub const DEGRADED_BATTERY_PCT: f64 = 40.0;

const CRITICAL_BATTERY_PENALTY: i32 = 30;
const DEGRADED_BATTERY_PENALTY: i32 = 15;
const PER_ALERT_PENALTY: i32 = 10;
const HIGH_RISK_PENALTY: i32 = 20;
const MEDIUM_RISK_PENALTY: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertTag {
    HighTemperature,
    LowTemperature,
    HighHumidity,
    LowHumidity,
    ObstacleDetected,
    LowLightWarning,
    CriticalBattery,
    LowBattery,
}

impl AlertTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTag::HighTemperature => "HIGH_TEMPERATURE",
            AlertTag::LowTemperature => "LOW_TEMPERATURE",
            AlertTag::HighHumidity => "HIGH_HUMIDITY",
            AlertTag::LowHumidity => "LOW_HUMIDITY",
            AlertTag::ObstacleDetected => "OBSTACLE_DETECTED",
            AlertTag::LowLightWarning => "LOW_LIGHT_WARNING",
            AlertTag::CriticalBattery => "CRITICAL_BATTERY",
            AlertTag::LowBattery => "LOW_BATTERY",
        }
    }
}

impl std::fmt::Display for AlertTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightingCondition {
    Bright,
    Normal,
    Dim,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    Active,
    Stationary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Normal,
    Alert,
}

impl OverallStatus {
    pub fn from_alert_count(alert_count: usize) -> Self {
        if alert_count > 0 {
            OverallStatus::Alert
        } else {
            OverallStatus::Normal
        }
    }
}

/// Convert Celsius to Fahrenheit, rounded half away from zero to one decimal.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    let fahrenheit = celsius * 9.0 / 5.0 + 32.0;
    (fahrenheit * 10.0).round() / 10.0
}

pub fn temperature_alert(celsius: f64) -> Option<AlertTag> {
    if celsius > HIGH_TEMPERATURE_C {
        Some(AlertTag::HighTemperature)
    } else if celsius < LOW_TEMPERATURE_C {
        Some(AlertTag::LowTemperature)
    } else {
        None
    }
}

pub fn humidity_alert(humidity: f64) -> Option<AlertTag> {
    if humidity > HIGH_HUMIDITY_PCT {
        Some(AlertTag::HighHumidity)
    } else if humidity < LOW_HUMIDITY_PCT {
        Some(AlertTag::LowHumidity)
    } else {
        None
    }
}

pub fn risk_level(distance_cm: f64) -> RiskLevel {
    if distance_cm < HIGH_RISK_DISTANCE_CM {
        RiskLevel::High
    } else if distance_cm < MEDIUM_RISK_DISTANCE_CM {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn obstacle_alert(risk: RiskLevel) -> Option<AlertTag> {
    (risk == RiskLevel::High).then_some(AlertTag::ObstacleDetected)
}

pub fn lighting_condition(lux: f64) -> LightingCondition {
    if lux > BRIGHT_LUX {
        LightingCondition::Bright
    } else if lux > NORMAL_LUX {
        LightingCondition::Normal
    } else if lux > DIM_LUX {
        LightingCondition::Dim
    } else {
        LightingCondition::Dark
    }
}

pub fn lighting_alert(condition: LightingCondition) -> Option<AlertTag> {
    (condition == LightingCondition::Dark).then_some(AlertTag::LowLightWarning)
}

pub fn activity_status(motion: bool) -> ActivityStatus {
    if motion {
        ActivityStatus::Active
    } else {
        ActivityStatus::Stationary
    }
}

pub fn battery_alert(battery_pct: f64) -> Option<AlertTag> {
    if battery_pct < CRITICAL_BATTERY_PCT {
        Some(AlertTag::CriticalBattery)
    } else if battery_pct < LOW_BATTERY_PCT {
        Some(AlertTag::LowBattery)
    } else {
        None
    }
}

/// Health score in `0..=100` from battery level, alert count and obstacle risk.
pub fn health_score(battery_pct: Option<f64>, alert_count: usize, risk: Option<RiskLevel>) -> u8 {
    let mut score: i32 = 100;

    if let Some(battery) = battery_pct {
        if battery < CRITICAL_BATTERY_PCT {
            score -= CRITICAL_BATTERY_PENALTY;
        } else if battery < DEGRADED_BATTERY_PCT {
            score -= DEGRADED_BATTERY_PENALTY;
        }
    }

    let alert_count = i32::try_from(alert_count).unwrap_or(i32::MAX / PER_ALERT_PENALTY);
    score = score.saturating_sub(alert_count.saturating_mul(PER_ALERT_PENALTY));

    match risk {
        Some(RiskLevel::High) => score -= HIGH_RISK_PENALTY,
        Some(RiskLevel::Medium) => score -= MEDIUM_RISK_PENALTY,
        Some(RiskLevel::Low) | None => {}
    }

    score.clamp(0, 100) as u8
}
