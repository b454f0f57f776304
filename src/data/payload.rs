//! Raw time-series payload as returned by a rate source

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ "base": "USD", "rates": { "2024-01-01": { "EUR": 0.9, ... }, ... } }`
///
/// `rates` stays an untyped JSON value: a missing, mistyped or partially
/// malformed member is data for the tidy transformer to judge, not a
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRatePayload {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub rates: Value,
}

impl RawRatePayload {
    pub fn new(base: impl Into<String>, rates: Value) -> Self {
        Self {
            base: Some(base.into()),
            rates,
        }
    }

    /// Parse a JSON document; non-object documents yield an empty payload
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    /// Interpret an arbitrary JSON value as a payload
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => Self {
                base: map
                    .remove("base")
                    .and_then(|b| b.as_str().map(str::to_string)),
                rates: map.remove("rates").unwrap_or(Value::Null),
            },
            _ => Self::default(),
        }
    }

    /// Number of dates in `rates`, zero when it is not an object
    pub fn date_count(&self) -> usize {
        self.rates.as_object().map_or(0, |m| m.len())
    }
}
