use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{EVENT_DEVICE_ID, EVENT_TIMESTAMP};

/// A device event that toggles the device's interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvent {
    pub device_id: String,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("missing event field: {0}")]
    MissingField(&'static str),
    #[error("event field {0} must be a string")]
    InvalidField(&'static str),
    #[error("malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("event is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
}

impl DeviceEvent {
    /// Extracts `deviceId` and `timestamp`; any other fields are ignored.
    pub fn parse(event: &Value) -> Result<Self, EventError> {
        Ok(Self {
            device_id: string_field(event, EVENT_DEVICE_ID)?,
            timestamp: string_field(event, EVENT_TIMESTAMP)?,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, EventError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::parse(&value)
    }
}

fn string_field(event: &Value, field: &'static str) -> Result<String, EventError> {
    match event.get(field) {
        None => Err(EventError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(EventError::InvalidField(field)),
    }
}
