use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Telemetry payload published by the device on the data topic.
///
/// The device omits fields it has no sample for, so each field falls back
/// to 0 when missing or non-numeric; one bad field never discards the rest
/// of the message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryMessage {
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

impl TelemetryMessage {
    /// Decode a raw payload. Fails only when the payload is not a JSON
    /// object at all; field-level problems read as 0.
    pub fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        if !value.is_object() {
            return Err(DecodeError::NotAnObject);
        }
        Ok(Self {
            suhu: numeric_field(&value, "suhu"),
            humidity: numeric_field(&value, "humidity"),
            lux: numeric_field(&value, "lux"),
        })
    }
}

fn numeric_field(value: &serde_json::Value, key: &str) -> f64 {
    value.get(key).and_then(serde_json::Value::as_f64).unwrap_or(0.0)
}

/// Desired relay position, as carried on the control topic and in the
/// relay API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelayState {
    On,
    Off,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelayState::On => "ON",
            RelayState::Off => "OFF",
        })
    }
}

/// Wire payload for the control topic: `{"relay":"ON"}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelayCommand {
    pub relay: RelayState,
}
