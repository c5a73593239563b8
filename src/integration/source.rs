//! Trait for producers of frame records.

use std::collections::VecDeque;
use std::convert::Infallible;

use crate::tracker::FrameRecord;

/// Trait for anything that yields frame records in timestamp order.
///
/// Implement this trait to connect a detector, a message queue or a file
/// reader to the tracker.
///
/// # Example
///
/// ```ignore
/// use frametrack_rs::{FrameRecord, RecordSource};
///
/// struct MyFeed {
///     // Your connection here
/// }
///
/// impl RecordSource for MyFeed {
///     type Error = std::io::Error;
///
///     fn next_record(&mut self) -> Result<Option<FrameRecord>, Self::Error> {
///         // Fetch and decode the next frame
///         Ok(None)
///     }
/// }
/// ```
pub trait RecordSource {
    /// Error type for fetch or decode failures.
    type Error: std::error::Error + 'static;

    /// Next record of the stream, or `None` once it is exhausted.
    fn next_record(&mut self) -> Result<Option<FrameRecord>, Self::Error>;
}

/// Helper trait for converting collected inputs into frame records.
pub trait IntoRecords {
    /// Convert the input into a vector of records.
    fn into_records(self) -> Vec<FrameRecord>;
}

impl IntoRecords for Vec<FrameRecord> {
    fn into_records(self) -> Vec<FrameRecord> {
        self
    }
}

impl IntoRecords for FrameRecord {
    fn into_records(self) -> Vec<FrameRecord> {
        vec![self]
    }
}

/// In-memory record source.
#[derive(Debug, Clone, Default)]
pub struct RecordQueue {
    records: VecDeque<FrameRecord>,
}

impl RecordQueue {
    pub fn new(records: impl IntoRecords) -> Self {
        Self {
            records: records.into_records().into(),
        }
    }

    pub fn push(&mut self, record: FrameRecord) {
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for RecordQueue {
    type Error = Infallible;

    fn next_record(&mut self) -> Result<Option<FrameRecord>, Self::Error> {
        Ok(self.records.pop_front())
    }
}
