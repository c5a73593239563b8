//! Main object tracking loop: frame ingestion, cross-frame matching, window
//! eviction and lifetime-gated logging.

use std::borrow::Borrow;
use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{TrackError, TrackResult};
use crate::tracker::bbox::{BBox, iou_batch};
use crate::tracker::frame::Frame;
use crate::tracker::id_allocator::IdAllocator;
use crate::tracker::matching::{exceeds_threshold, momentum_match};
use crate::tracker::object::{LoggedObject, TrackedObject};
use crate::tracker::record::FrameRecord;
use crate::tracker::track::{Footprint, TrackArena, TrackMerge};

/// Configuration for the ObjectTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Overlap above which two boxes are the same object
    pub iou_threshold: f64,
    /// Speed difference below which two moving objects are the same object
    pub momentum_scale: f64,
    /// Number of recent frames eligible for matching
    pub max_frames: usize,
    /// Minimum lifetime in whole seconds for an object to be logged
    pub min_seconds: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.8,
            momentum_scale: 1.0,
            max_frames: 150,
            min_seconds: 1,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> TrackResult<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(TrackError::InvalidConfig(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }
        if !self.momentum_scale.is_finite() || self.momentum_scale < 0.0 {
            return Err(TrackError::InvalidConfig(format!(
                "momentum_scale must be a non-negative number, got {}",
                self.momentum_scale
            )));
        }
        if self.max_frames == 0 {
            return Err(TrackError::InvalidConfig("max_frames must be at least 1".into()));
        }
        Ok(())
    }
}

/// Tracks objects from a single view across a bounded window of frames.
///
/// Frames must be submitted in non-decreasing timestamp order; a record
/// older than the last accepted frame is rejected.
#[derive(Debug)]
pub struct ObjectTracker {
    active: VecDeque<Frame>,
    log: Vec<LoggedObject>,
    arena: TrackArena,
    ids: IdAllocator,
    config: TrackerConfig,
    last_timestamp: Option<f64>,
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::with_config(TrackerConfig::default())
    }
}

impl ObjectTracker {
    pub fn new(config: TrackerConfig) -> TrackResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: TrackerConfig) -> Self {
        Self {
            active: VecDeque::new(),
            log: Vec::new(),
            arena: TrackArena::new(),
            ids: IdAllocator::default(),
            config,
            last_timestamp: None,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Shared track storage, needed to read ids and histories of active objects.
    pub fn arena(&self) -> &TrackArena {
        &self.arena
    }

    /// Active frames, oldest first.
    pub fn active_frames(&self) -> impl Iterator<Item = &Frame> {
        self.active.iter()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Objects logged so far, in retirement order.
    pub fn log(&self) -> &[LoggedObject] {
        &self.log
    }

    /// Take the objects logged so far, leaving the log empty.
    pub fn drain_log(&mut self) -> Vec<LoggedObject> {
        std::mem::take(&mut self.log)
    }

    pub fn into_log(self) -> Vec<LoggedObject> {
        self.log
    }

    /// Identifiers of every object in the active window.
    pub fn active_ids(&self) -> HashSet<u32> {
        self.active
            .iter()
            .flat_map(|frame| frame.objects())
            .map(|obj| obj.id(&self.arena))
            .collect()
    }

    /// Ingest one record.
    ///
    /// Records without detections are ignored. Otherwise the new frame is
    /// matched against the active window, appended to it, and the oldest
    /// frames are retired once the window overflows. On error the tracker is
    /// left untouched.
    pub fn process_record(&mut self, record: &FrameRecord) -> TrackResult<()> {
        if !record.has_detections() {
            trace!("skipping record without detections");
            return Ok(());
        }

        let mut frame = self.build_frame(record)?;

        for older in 0..self.active.len() {
            if !frame.has_new_objects() {
                break;
            }
            self.frame_update(older, &mut frame);
        }

        debug!(
            timestamp = frame.timestamp,
            objects = frame.len(),
            unmatched = frame.new_objects().count(),
            "frame ingested"
        );
        self.last_timestamp = Some(frame.timestamp);
        self.active.push_back(frame);

        while self.active.len() > self.config.max_frames {
            if let Some(retiring) = self.active.pop_front() {
                debug!(timestamp = retiring.timestamp, "frame evicted");
                self.retire(retiring);
            }
        }
        Ok(())
    }

    /// Retire every remaining active frame, oldest first.
    pub fn close(&mut self) {
        while let Some(frame) = self.active.pop_front() {
            debug!(timestamp = frame.timestamp, "frame flushed");
            self.retire(frame);
        }
    }

    fn build_frame(&mut self, record: &FrameRecord) -> TrackResult<Frame> {
        let timestamp = record.timestamp()?;
        if let Some(previous) = self.last_timestamp {
            if timestamp < previous {
                return Err(TrackError::OutOfOrder {
                    previous,
                    current: timestamp,
                });
            }
        }

        let boxes = record.boxes()?;
        let mut taken = self.active_ids();
        let ids = self.ids.allocate_many(&mut taken, boxes.len())?;

        let objects = boxes
            .into_iter()
            .zip(ids)
            .map(|(coords, id)| {
                let track = self.arena.insert(id, Footprint::new(coords, timestamp));
                TrackedObject::new(coords, track)
            })
            .collect();

        Ok(Frame::new(timestamp, record.no_faces, objects))
    }

    /// Match the unmerged objects of `newer` against the active frame at
    /// index `older`.
    fn frame_update(&mut self, older: usize, newer: &mut Frame) {
        let older_len = self.active[older].len();

        // First pass using momentum
        for i in 0..older_len {
            for j in newer.new_object_indices() {
                let matched = momentum_match(
                    &self.active[older].objects()[i],
                    &newer.objects()[j],
                    &self.arena,
                    self.config.momentum_scale,
                );
                if matched {
                    self.observe(older, i, newer, j);
                }
            }
        }

        // Second pass using location
        let older_boxes: Vec<BBox> = self.active[older]
            .objects()
            .iter()
            .map(|o| o.coords)
            .collect();
        let newer_boxes: Vec<BBox> = newer.objects().iter().map(|o| o.coords).collect();
        let ious = iou_batch(&older_boxes, &newer_boxes);

        for i in 0..older_len {
            for j in newer.new_object_indices() {
                if exceeds_threshold(ious[[i, j]], self.config.iou_threshold) {
                    self.observe(older, i, newer, j);
                }
            }
        }
    }

    fn observe(&mut self, older: usize, i: usize, newer: &mut Frame, j: usize) {
        let older_obj = &mut self.active[older].objects_mut()[i];
        let Some(merge) = newer.objects_mut()[j].observe(older_obj, &mut self.arena) else {
            return;
        };

        trace!(
            id = self.arena.get(merge.kept).id,
            footprints = self.arena.get(merge.kept).history.len(),
            "objects merged"
        );
        for frame in self.active.iter_mut() {
            rewire(frame, merge);
        }
        rewire(newer, merge);
    }

    /// Log the objects of a retiring frame that are no longer tracked
    /// anywhere in the active window and lived long enough.
    fn retire(&mut self, frame: Frame) {
        let still_tracked = self.active_ids();

        for obj in frame.objects() {
            if still_tracked.contains(&obj.id(&self.arena)) {
                continue;
            }
            if obj.time_alive(&self.arena) < self.config.min_seconds {
                continue;
            }
            let logged = obj.snapshot(&self.arena);
            debug!(
                id = logged.id,
                time_alive = logged.time_alive,
                footprints = logged.history.len(),
                "object logged"
            );
            self.log.push(logged);
        }

        for obj in frame.into_objects() {
            self.arena.release(obj.track);
        }
    }
}

fn rewire(frame: &mut Frame, merge: TrackMerge) {
    for obj in frame.objects_mut() {
        if obj.track == merge.retired {
            obj.track = merge.kept;
        }
    }
}

/// Run a whole record stream through a default-configured tracker and
/// return the log.
pub fn track_objects<I>(records: I) -> TrackResult<Vec<LoggedObject>>
where
    I: IntoIterator,
    I::Item: Borrow<FrameRecord>,
{
    track_objects_with(TrackerConfig::default(), records)
}

pub fn track_objects_with<I>(config: TrackerConfig, records: I) -> TrackResult<Vec<LoggedObject>>
where
    I: IntoIterator,
    I::Item: Borrow<FrameRecord>,
{
    let mut tracker = ObjectTracker::new(config)?;
    for record in records {
        tracker.process_record(record.borrow())?;
    }
    tracker.close();
    Ok(tracker.into_log())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::record::Windows;

    fn record(t: f64, windows: &str) -> FrameRecord {
        let count = windows.split(',').count() as u32 / 4;
        FrameRecord::new(count.max(1), Windows::Text(windows.to_string()), t)
    }

    #[test]
    fn test_config_validation() {
        assert!(TrackerConfig::default().validate().is_ok());

        let bad = TrackerConfig {
            iou_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(ObjectTracker::new(bad), Err(TrackError::InvalidConfig(_))));

        let bad = TrackerConfig {
            max_frames: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = TrackerConfig {
            momentum_scale: f64::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: TrackerConfig = serde_json::from_str(r#"{"max_frames": 10}"#).unwrap();
        assert_eq!(config.max_frames, 10);
        assert_eq!(config.iou_threshold, 0.8);
        assert_eq!(config.min_seconds, 1);
    }

    #[test]
    fn test_ids_distinct_within_frame() {
        let mut tracker = ObjectTracker::default();
        tracker
            .process_record(&record(1000.0, "0,0,9,9,100,100,109,109,200,200,209,209"))
            .unwrap();
        let ids: Vec<u32> = tracker
            .active_frames()
            .flat_map(|f| f.objects())
            .map(|o| o.id(tracker.arena()))
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_matched_object_adopts_older_id() {
        let mut tracker = ObjectTracker::default();
        tracker.process_record(&record(1000.0, "0,0,9,9")).unwrap();
        tracker.process_record(&record(1001.0, "500,500,509,509,0,0,9,9")).unwrap();

        let frames: Vec<&Frame> = tracker.active_frames().collect();
        let arena = tracker.arena();
        let newest = frames[1].objects();
        assert!(newest[0].is_unmerged());
        assert!(!newest[1].is_unmerged());
        assert_eq!(newest[1].id(arena), frames[0].objects()[0].id(arena));
        assert_ne!(newest[0].id(arena), newest[1].id(arena));
    }

    #[test]
    fn test_out_of_order_is_rejected_without_side_effects() {
        let mut tracker = ObjectTracker::default();
        tracker.process_record(&record(1000.0, "0,0,9,9")).unwrap();
        let err = tracker.process_record(&record(999.0, "0,0,9,9")).unwrap_err();
        assert_eq!(
            err,
            TrackError::OutOfOrder {
                previous: 1000.0,
                current: 999.0
            }
        );
        assert_eq!(tracker.active_len(), 1);
        assert_eq!(tracker.arena().live(), 1);

        // Equal timestamps are fine.
        tracker.process_record(&record(1000.0, "50,50,59,59")).unwrap();
        assert_eq!(tracker.active_len(), 2);
    }

    #[test]
    fn test_malformed_record_leaves_state() {
        let mut tracker = ObjectTracker::default();
        tracker.process_record(&record(1000.0, "0,0,9,9")).unwrap();
        assert!(tracker.process_record(&record(1001.0, "0,0,x,9")).is_err());
        assert_eq!(tracker.active_len(), 1);
        assert_eq!(tracker.arena().live(), 1);
    }

    #[test]
    fn test_id_exhaustion() {
        let mut tracker = ObjectTracker::default();
        let coords: Vec<i64> = (0..901).flat_map(|k| [k * 20, 0, k * 20 + 9, 9]).collect();
        let rec = FrameRecord::new(901, Windows::Values(coords), 1000.0);
        assert_eq!(
            tracker.process_record(&rec),
            Err(TrackError::IdsExhausted { capacity: 900 })
        );
        assert_eq!(tracker.active_len(), 0);
        assert_eq!(tracker.arena().live(), 0);
    }

    #[test]
    fn test_window_is_bounded_and_arena_reclaimed() {
        let config = TrackerConfig {
            max_frames: 5,
            ..Default::default()
        };
        let mut tracker = ObjectTracker::new(config).unwrap();
        for k in 0..20 {
            let x = k * 50;
            tracker
                .process_record(&record(1000.0 + k as f64, &format!("{x},0,{},9", x + 9)))
                .unwrap();
            assert!(tracker.active_len() <= 5);
        }
        assert_eq!(tracker.arena().live(), 5);
        tracker.close();
        assert_eq!(tracker.active_len(), 0);
        assert_eq!(tracker.arena().live(), 0);
        assert!(tracker.log().is_empty());
    }

    #[test]
    fn test_drain_log() {
        let mut tracker = ObjectTracker::default();
        tracker.process_record(&record(1000.0, "0,0,9,9")).unwrap();
        tracker.process_record(&record(1002.0, "0,0,9,9")).unwrap();
        tracker.close();
        assert_eq!(tracker.drain_log().len(), 1);
        assert!(tracker.log().is_empty());
    }
}
