//! TrackerPipeline for draining a record source through the tracker.

use thiserror::Error;
use tracing::warn;

use super::RecordSource;
use crate::error::{TrackError, TrackResult};
use crate::tracker::{LoggedObject, ObjectTracker, TrackerConfig};

#[derive(Debug, Error)]
pub enum PipelineError<E: std::error::Error + 'static> {
    #[error("record source failed")]
    Source(#[source] E),
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// A source of frame records bundled with an `ObjectTracker`.
pub struct TrackerPipeline<S: RecordSource> {
    source: S,
    tracker: ObjectTracker,
    skip_rejected: bool,
}

impl<S: RecordSource> TrackerPipeline<S> {
    /// Create a new pipeline with the given source and tracker config.
    pub fn new(source: S, config: TrackerConfig) -> TrackResult<Self> {
        Ok(Self {
            source,
            tracker: ObjectTracker::new(config)?,
            skip_rejected: false,
        })
    }

    /// Create a new pipeline with default tracker configuration.
    pub fn with_default_config(source: S) -> Self {
        Self {
            source,
            tracker: ObjectTracker::default(),
            skip_rejected: false,
        }
    }

    /// Keep going past records the tracker rejects (malformed data, out of
    /// order timestamps). Identifier exhaustion always stops the pipeline.
    pub fn skip_rejected(mut self, skip: bool) -> Self {
        self.skip_rejected = skip;
        self
    }

    /// Pull one record from the source and feed it to the tracker.
    ///
    /// Returns `false` once the source is exhausted.
    pub fn process_next(&mut self) -> Result<bool, PipelineError<S::Error>> {
        let Some(record) = self.source.next_record().map_err(PipelineError::Source)? else {
            return Ok(false);
        };

        match self.tracker.process_record(&record) {
            Ok(()) => {}
            Err(err @ TrackError::IdsExhausted { .. }) => return Err(err.into()),
            Err(err) if self.skip_rejected => {
                warn!(error = %err, "frame record rejected");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(true)
    }

    /// Drain the source, close the tracker and return its log.
    pub fn run(mut self) -> Result<Vec<LoggedObject>, PipelineError<S::Error>> {
        while self.process_next()? {}
        self.tracker.close();
        Ok(self.tracker.into_log())
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &ObjectTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut ObjectTracker {
        &mut self.tracker
    }
}
