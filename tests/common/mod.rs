#![allow(dead_code)]

use serde_json::{json, Value};
use tempfile::TempDir;

use device_intervals::store::{IntervalRecord, IntervalStore, Store};

pub const TABLE: &str = "test_table";

/// On-disk store in a temp dir; the dir lives as long as the fixture.
pub struct TestStore {
    pub store: Store,
    _temp_dir: TempDir,
}

pub fn open_store(records: &[IntervalRecord]) -> TestStore {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("intervals-test.sled");
    let store = Store::open(&sled_path.to_string_lossy(), TABLE).expect("open store");
    for record in records {
        store.put_interval(record).expect("seed record");
    }
    TestStore {
        store,
        _temp_dir: temp_dir,
    }
}

pub fn event(device_id: &str, timestamp: &str) -> Value {
    json!({"deviceId": device_id, "timestamp": timestamp})
}
