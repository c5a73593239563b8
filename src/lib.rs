//! Short-horizon multi-object tracking across timestamped single-camera frames.
//!
//! Frame records are fed one at a time into an [`ObjectTracker`]. Objects that
//! overlap (or move at a similar speed) across the recent active window are
//! merged into one identity, and every identity whose lifetime reaches the
//! configured minimum is written to the tracker log once it leaves the window.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{TrackError, TrackResult};
pub use integration::{
    FrameRecordBuilder, IntoRecords, JsonLinesSource, PipelineError, RecordQueue, RecordSource,
    TrackerPipeline,
};
pub use tracker::{
    BBox, Footprint, Frame, FrameRecord, LoggedObject, ObjectTracker, TrackerConfig,
    track_objects,
};
