use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

use crate::store::keys;
use crate::store::operations::intervals::with_end_timestamp;
use crate::store::{IntervalRecord, IntervalStore, StoreError};

/// In-memory interval table with the same key ordering as the sled
/// [`Store`](crate::store::Store).
/// Used as a test double; nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<'a>(
        records: impl IntoIterator<Item = &'a IntervalRecord>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            store.put_interval(record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Map<String, Value>>>, StoreError> {
        self.items
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn project(item: &Map<String, Value>) -> Result<IntervalRecord, StoreError> {
    Ok(serde_json::from_value(Value::Object(item.clone()))?)
}

impl IntervalStore for MemoryStore {
    fn latest_interval(&self, device_id: &str) -> Result<Option<IntervalRecord>, StoreError> {
        let prefix = keys::interval_prefix(device_id);
        let items = self.lock()?;
        let latest = items
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .last()
            .map(|(_, item)| project(item))
            .transpose()?;
        Ok(latest)
    }

    fn put_interval(&self, record: &IntervalRecord) -> Result<(), StoreError> {
        let key = keys::interval_key(&record.device_id, &record.start_timestamp);
        let item: Map<String, Value> = serde_json::from_value(serde_json::to_value(record)?)?;
        self.lock()?.insert(key, item);
        Ok(())
    }

    fn close_interval(
        &self,
        device_id: &str,
        start_timestamp: &str,
        end_timestamp: &str,
    ) -> Result<IntervalRecord, StoreError> {
        let key = keys::interval_key(device_id, start_timestamp);
        let mut items = self.lock()?;
        let current = items.get(&key).cloned();
        let item = with_end_timestamp(current, device_id, start_timestamp, end_timestamp);
        let record = project(&item)?;
        items.insert(key, item);
        Ok(record)
    }

    fn get_interval(
        &self,
        device_id: &str,
        start_timestamp: &str,
    ) -> Result<Option<IntervalRecord>, StoreError> {
        let key = keys::interval_key(device_id, start_timestamp);
        self.lock()?.get(&key).map(project).transpose()
    }

    fn list_intervals(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<IntervalRecord>, StoreError> {
        let prefix = keys::interval_prefix(device_id);
        let items = self.lock()?;
        let matching: Vec<&Map<String, Value>> = items
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(_, item)| item)
            .collect();
        let records = matching
            .into_iter()
            .rev()
            .take(limit)
            .map(project)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
