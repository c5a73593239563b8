//! Shared track records.
//!
//! Every [`TrackedObject`](super::TrackedObject) points at one slot of the
//! [`TrackArena`]. Merging two objects folds one slot into the other and
//! rewires both objects to the surviving slot, so every alias of a merged
//! identity reads the same id and the same chronological history.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::bbox::BBox;

/// One timestamped box observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub coords: BBox,
    /// Epoch seconds
    pub timestamp: f64,
}

impl Footprint {
    pub fn new(coords: BBox, timestamp: f64) -> Self {
        Self { coords, timestamp }
    }

    /// Chronological order. Footprints sharing a timestamp compare equal.
    pub fn cmp_time(&self, other: &Footprint) -> Ordering {
        self.timestamp.total_cmp(&other.timestamp)
    }

    /// UTC ISO-8601 rendering of the timestamp, `None` if out of range.
    pub fn iso_timestamp(&self) -> Option<String> {
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::<Utc>::from_timestamp(secs as i64, nanos)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iso_timestamp() {
            Some(iso) => write!(f, "{iso} ({})", self.coords),
            None => write!(f, "{} ({})", self.timestamp, self.coords),
        }
    }
}

/// Index of a slot in the [`TrackArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackKey(usize);

/// Identity and history shared by every object aliasing one physical object.
#[derive(Debug, Clone, Default)]
pub struct Track {
    pub id: u32,
    /// Sorted ascending by timestamp, never empty while referenced.
    pub history: Vec<Footprint>,
    refs: usize,
}

impl Track {
    pub fn date_created(&self) -> f64 {
        self.history.first().map_or(f64::NAN, |fp| fp.timestamp)
    }

    pub fn end_time(&self) -> f64 {
        self.history.last().map_or(f64::NAN, |fp| fp.timestamp)
    }
}

/// Outcome of folding one track slot into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMerge {
    pub kept: TrackKey,
    pub retired: TrackKey,
}

/// Slot storage for tracks, reference counted by the objects pointing at them.
#[derive(Debug, Default)]
pub struct TrackArena {
    slots: Vec<Track>,
    free: Vec<usize>,
}

impl TrackArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new track holding a single footprint. The caller owns one reference.
    pub fn insert(&mut self, id: u32, footprint: Footprint) -> TrackKey {
        let track = Track {
            id,
            history: vec![footprint],
            refs: 1,
        };
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = track;
                TrackKey(slot)
            }
            None => {
                self.slots.push(track);
                TrackKey(self.slots.len() - 1)
            }
        }
    }

    #[inline]
    pub fn get(&self, key: TrackKey) -> &Track {
        &self.slots[key.0]
    }

    /// Fold `retired` into `kept`: histories are concatenated and re-sorted,
    /// references move over and the retired slot is recycled. The id of
    /// `kept` wins.
    pub fn merge(&mut self, kept: TrackKey, retired: TrackKey) -> Option<TrackMerge> {
        if kept == retired {
            return None;
        }
        let absorbed = std::mem::take(&mut self.slots[retired.0]);
        self.free.push(retired.0);

        let track = &mut self.slots[kept.0];
        track.history.extend(absorbed.history);
        track.history.sort_by(Footprint::cmp_time);
        track.refs += absorbed.refs;
        Some(TrackMerge { kept, retired })
    }

    /// Drop one reference, recycling the slot once nothing points at it.
    pub fn release(&mut self, key: TrackKey) {
        let track = &mut self.slots[key.0];
        if track.refs == 0 {
            return;
        }
        track.refs -= 1;
        if track.refs == 0 {
            *track = Track::default();
            self.free.push(key.0);
        }
    }

    /// Number of slots currently referenced.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
