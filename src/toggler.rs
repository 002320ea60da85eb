use crate::event::DeviceEvent;
use crate::store::{IntervalRecord, IntervalStore, StoreError};

/// Which way an event toggled the device's interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// A new open interval starting at the event timestamp.
    Opened(IntervalRecord),
    /// The previously open interval, now carrying the event timestamp as its end.
    Closed(IntervalRecord),
}

impl Toggle {
    pub fn record(&self) -> &IntervalRecord {
        match self {
            Toggle::Opened(record) | Toggle::Closed(record) => record,
        }
    }
}

/// 没有记录或最近一条已有 endTimestamp，都视为已结束
pub fn is_ended(latest: Option<&IntervalRecord>) -> bool {
    latest.map_or(true, |record| !record.is_open())
}

/// Opens a new interval or closes the latest open one.
///
/// The event timestamp is not compared against the open interval's start;
/// an earlier or identical timestamp still closes it.
pub fn toggle<S>(store: &S, event: &DeviceEvent) -> Result<Toggle, StoreError>
where
    S: IntervalStore + ?Sized,
{
    let latest = store.latest_interval(&event.device_id)?;
    tracing::debug!(
        device_id = %event.device_id,
        latest = ?latest,
        "Fetched latest interval"
    );

    match latest {
        Some(open) if !is_ended(Some(&open)) => {
            let closed = store.close_interval(
                &event.device_id,
                &open.start_timestamp,
                &event.timestamp,
            )?;
            tracing::info!(
                device_id = %closed.device_id,
                start_timestamp = %closed.start_timestamp,
                end_timestamp = %event.timestamp,
                "Closed interval"
            );
            Ok(Toggle::Closed(closed))
        }
        _ => {
            let record = IntervalRecord::open(&event.device_id, &event.timestamp);
            store.put_interval(&record)?;
            tracing::info!(
                device_id = %record.device_id,
                start_timestamp = %record.start_timestamp,
                "Opened interval"
            );
            Ok(Toggle::Opened(record))
        }
    }
}
