//! Integration module for connecting frame record producers with the tracker.
//!
//! This module provides the traits and adapters that feed already-detected
//! frames into an [`ObjectTracker`](crate::ObjectTracker): a source trait,
//! a newline-delimited JSON reader, a record builder and a pipeline that
//! drains a source through a tracker.

mod builder;
mod json_lines;
mod pipeline;
mod source;

pub use builder::FrameRecordBuilder;
pub use json_lines::{JsonLinesSource, JsonSourceError};
pub use pipeline::{PipelineError, TrackerPipeline};
pub use source::{IntoRecords, RecordQueue, RecordSource};
