use std::future::Future;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::event::{DeviceEvent, EventError};
use crate::store::{IntervalStore, StoreError};
use crate::toggler::{self, Toggle};

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts for one pass over an event stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: u64,
    pub failed: u64,
    /// The shutdown future fired before the input ended.
    pub interrupted: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> u64 {
        self.processed - self.failed
    }
}

/// One invocation. Nothing is returned on success; a failure is logged and
/// handed back to the caller unchanged.
pub fn handle<S>(store: &S, event: &Value) -> Result<(), HandlerError>
where
    S: IntervalStore + ?Sized,
{
    report(process(store, event))
}

/// Same as [`handle`], for a raw JSON payload.
pub fn handle_json<S>(store: &S, raw: &str) -> Result<(), HandlerError>
where
    S: IntervalStore + ?Sized,
{
    let result = serde_json::from_str::<Value>(raw)
        .map_err(|e| HandlerError::from(EventError::from(e)))
        .and_then(|event| process(store, &event));
    report(result)
}

fn process<S>(store: &S, event: &Value) -> Result<Toggle, HandlerError>
where
    S: IntervalStore + ?Sized,
{
    tracing::debug!(event = %event, "Received event");
    let event = DeviceEvent::parse(event)?;
    Ok(toggler::toggle(store, &event)?)
}

fn report(result: Result<Toggle, HandlerError>) -> Result<(), HandlerError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to handle event");
            Err(e)
        }
    }
}

/// Feeds newline-delimited JSON events to [`handle_json`] in order until the
/// reader is exhausted or `shutdown` resolves. Blank lines are skipped; a line
/// that is not UTF-8 or not a valid event is counted as failed and the next
/// line is read. Only an I/O error on the reader ends the run early.
pub async fn run_events<R, S, F>(
    mut reader: R,
    store: &S,
    shutdown: F,
) -> std::io::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
    S: IntervalStore + ?Sized,
    F: Future<Output = ()>,
{
    let mut summary = RunSummary::default();
    let mut buf = Vec::new();
    tokio::pin!(shutdown);

    loop {
        buf.clear();
        // 已缓冲的整行先处理完；read_until 被取消时丢掉的半行只出现在退出时
        let read = tokio::select! {
            biased;
            read = reader.read_until(b'\n', &mut buf) => read?,
            _ = &mut shutdown => {
                summary.interrupted = true;
                break;
            }
        };
        if read == 0 {
            break;
        }

        let result = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_json(store, line.trim()),
            Err(e) => report(Err(EventError::from(e).into())),
        };
        summary.processed += 1;
        if result.is_err() {
            summary.failed += 1;
        }
    }

    Ok(summary)
}
