use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::constants::{ATTR_DEVICE_ID, ATTR_END_TIMESTAMP, ATTR_START_TIMESTAMP, MAX_CAS_RETRIES};
use crate::store::keys;
use crate::store::{IntervalStore, Store, StoreError};

/// Deserializing into this type projects a stored item down to
/// (deviceId, startTimestamp, endTimestamp).
///
/// `end_timestamp` holds whatever value the stored attribute has, `null`
/// included; only an absent attribute leaves it `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalRecord {
    pub device_id: String,
    pub start_timestamp: String,
    #[serde(
        default,
        deserialize_with = "present_attribute",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_timestamp: Option<Value>,
}

fn present_attribute<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl IntervalRecord {
    pub fn open(device_id: &str, start_timestamp: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            start_timestamp: start_timestamp.to_string(),
            end_timestamp: None,
        }
    }

    pub fn closed(device_id: &str, start_timestamp: &str, end_timestamp: &str) -> Self {
        Self {
            end_timestamp: Some(Value::from(end_timestamp)),
            ..Self::open(device_id, start_timestamp)
        }
    }

    /// Open means the item has no `endTimestamp` attribute at all.
    pub fn is_open(&self) -> bool {
        self.end_timestamp.is_none()
    }
}

/// Stored item with `endTimestamp` set. Attributes other than the three
/// interval fields are carried over untouched.
pub(crate) fn with_end_timestamp(
    current: Option<Map<String, Value>>,
    device_id: &str,
    start_timestamp: &str,
    end_timestamp: &str,
) -> Map<String, Value> {
    let mut item = match current {
        Some(item) => item,
        None => {
            let mut item = Map::new();
            item.insert(ATTR_DEVICE_ID.to_string(), Value::from(device_id));
            item.insert(ATTR_START_TIMESTAMP.to_string(), Value::from(start_timestamp));
            item
        }
    };
    item.insert(ATTR_END_TIMESTAMP.to_string(), Value::from(end_timestamp));
    item
}

impl IntervalStore for Store {
    fn latest_interval(&self, device_id: &str) -> Result<Option<IntervalRecord>, StoreError> {
        let prefix = keys::interval_prefix(device_id);
        match self.intervals.scan_prefix(prefix.as_bytes()).next_back() {
            Some(item) => {
                let (_, value) = item?;
                Ok(Some(Self::deserialize(&value)?))
            }
            None => Ok(None),
        }
    }

    fn put_interval(&self, record: &IntervalRecord) -> Result<(), StoreError> {
        let key = keys::interval_key(&record.device_id, &record.start_timestamp);
        self.intervals
            .insert(key.as_bytes(), Self::serialize(record)?)?;
        Ok(())
    }

    fn close_interval(
        &self,
        device_id: &str,
        start_timestamp: &str,
        end_timestamp: &str,
    ) -> Result<IntervalRecord, StoreError> {
        let key = keys::interval_key(device_id, start_timestamp);

        for _ in 0..MAX_CAS_RETRIES {
            let current = self.intervals.get(key.as_bytes())?;
            let current_item = match &current {
                Some(raw) => Some(Self::deserialize::<Map<String, Value>>(raw)?),
                None => None,
            };
            let item = with_end_timestamp(current_item, device_id, start_timestamp, end_timestamp);
            let new_bytes = Self::serialize(&item)?;

            let cas_result = self
                .intervals
                .compare_and_swap(key.as_bytes(), current, Some(new_bytes))?;
            if cas_result.is_ok() {
                return Ok(serde_json::from_value(Value::Object(item))?);
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "interval".to_string(),
            key,
            attempts: MAX_CAS_RETRIES,
        })
    }

    fn get_interval(
        &self,
        device_id: &str,
        start_timestamp: &str,
    ) -> Result<Option<IntervalRecord>, StoreError> {
        let key = keys::interval_key(device_id, start_timestamp);
        match self.intervals.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn list_intervals(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<IntervalRecord>, StoreError> {
        let prefix = keys::interval_prefix(device_id);
        let mut records = Vec::new();
        for item in self.intervals.scan_prefix(prefix.as_bytes()).rev() {
            if records.len() >= limit {
                break;
            }
            let (_, value) = item?;
            records.push(Self::deserialize::<IntervalRecord>(&value)?);
        }
        Ok(records)
    }
}
