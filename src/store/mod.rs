pub mod keys;
pub mod memory;
pub mod operations;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

pub use memory::MemoryStore;
pub use operations::intervals::IntervalRecord;

/// Sled-backed interval table. Each table lives in its own tree.
#[derive(Debug)]
pub struct Store {
    db: Db,
    table_name: String,
    pub intervals: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CAS retry exhausted after {attempts} attempts: entity={entity}, key={key}")]
    CasRetryExhausted {
        entity: String,
        key: String,
        attempts: u32,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Operations the toggler needs from a sorted store keyed by
/// (deviceId, startTimestamp).
pub trait IntervalStore {
    /// Most recent interval for the device, by descending `startTimestamp`.
    fn latest_interval(&self, device_id: &str) -> Result<Option<IntervalRecord>, StoreError>;

    /// Inserts the record, overwriting any record with the same key.
    fn put_interval(&self, record: &IntervalRecord) -> Result<(), StoreError>;

    /// Sets `endTimestamp` on the keyed record and returns all new values.
    /// A missing record is created, as a document-store update would.
    fn close_interval(
        &self,
        device_id: &str,
        start_timestamp: &str,
        end_timestamp: &str,
    ) -> Result<IntervalRecord, StoreError>;

    fn get_interval(
        &self,
        device_id: &str,
        start_timestamp: &str,
    ) -> Result<Option<IntervalRecord>, StoreError>;

    /// Newest first.
    fn list_intervals(
        &self,
        device_id: &str,
        limit: usize,
    ) -> Result<Vec<IntervalRecord>, StoreError>;
}

impl Store {
    pub fn open(sled_path: &str, table_name: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        Self::with_db(db, table_name)
    }

    /// Store backed by a temporary sled database, removed on drop.
    pub fn temporary(table_name: &str) -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::with_db(db, table_name)
    }

    fn with_db(db: Db, table_name: &str) -> Result<Self, StoreError> {
        let intervals = db.open_tree(table_name)?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            intervals,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
