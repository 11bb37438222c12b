// Storage representation of an evaluation result
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use super::evaluation::EvaluationResult;

/// A typed attribute value, in the style of a key-value table item.
///
/// Numbers are kept as decimal text: the shortest representation that
/// reads back to the same `f64`, so nothing drifts at the storage boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttributeValue>),
    #[serde(rename = "NULL")]
    Null,
}

impl AttributeValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::Number(n.to_string()),
            Value::String(s) => AttributeValue::String(s.clone()),
            Value::Array(items) => AttributeValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => AttributeValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to JSON. Returns `None` if a number attribute does not
    /// hold a valid decimal.
    pub fn to_json(&self) -> Option<Value> {
        Some(match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Number(text) => Value::Number(parse_decimal(text)?),
            AttributeValue::List(items) => {
                Value::Array(items.iter().map(Self::to_json).collect::<Option<Vec<_>>>()?)
            }
            AttributeValue::Map(map) => {
                let mut object = Map::new();
                for (k, v) in map {
                    object.insert(k.clone(), v.to_json()?);
                }
                Value::Object(object)
            }
        })
    }
}

fn parse_decimal(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// One item of the readings table: composite key plus every result field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// `<robot_id>#<timestamp>`
    pub id: String,
    pub robot_id: String,
    pub timestamp: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl StoredReading {
    pub fn from_result(result: &EvaluationResult) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(result)?;
        let attributes = match &value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
                .collect(),
            _ => BTreeMap::new(),
        };

        Ok(Self {
            id: result.storage_key(),
            robot_id: result.robot_id.clone(),
            timestamp: result.timestamp_string(),
            attributes,
        })
    }

    /// JSON view of the item, including the composite key.
    pub fn to_json(&self) -> Option<Value> {
        let mut object = Map::new();
        for (k, v) in &self.attributes {
            object.insert(k.clone(), v.to_json()?);
        }
        object.insert("id".to_string(), Value::String(self.id.clone()));
        Some(Value::Object(object))
    }
}
