//! Tracked objects and their logged snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tracker::bbox::BBox;
use crate::tracker::merge_state::MergeState;
use crate::tracker::track::{Footprint, TrackArena, TrackKey, TrackMerge};

/// An object detected in one frame.
///
/// Identity and history live in the shared [`TrackArena`]; the object only
/// keeps its own box and the key of the track it currently belongs to.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// Box observed in the owning frame
    pub coords: BBox,
    /// Shared identity and history
    pub track: TrackKey,
    pub state: MergeState,
}

impl TrackedObject {
    pub fn new(coords: BBox, track: TrackKey) -> Self {
        Self {
            coords,
            track,
            state: MergeState::Unmerged,
        }
    }

    #[inline]
    pub fn is_unmerged(&self) -> bool {
        self.state.is_unmerged()
    }

    pub fn id(&self, arena: &TrackArena) -> u32 {
        arena.get(self.track).id
    }

    pub fn history<'a>(&self, arena: &'a TrackArena) -> &'a [Footprint] {
        &arena.get(self.track).history
    }

    pub fn date_created(&self, arena: &TrackArena) -> f64 {
        arena.get(self.track).date_created()
    }

    pub fn end_time(&self, arena: &TrackArena) -> f64 {
        arena.get(self.track).end_time()
    }

    /// Whole seconds between the first and last footprint.
    pub fn time_alive(&self, arena: &TrackArena) -> u64 {
        lifetime(self.date_created(arena), self.end_time(arena))
    }

    /// Average speed in pixels per second between the first and last
    /// footprint. Undefined until the history spans a positive duration.
    pub fn speed(&self, arena: &TrackArena) -> Option<f64> {
        let history = self.history(arena);
        let (first, last) = (history.first()?, history.last()?);
        let elapsed = last.timestamp - first.timestamp;
        if elapsed.is_nan() || elapsed <= 0.0 {
            return None;
        }
        let displacement = last.coords.corner() - first.coords.corner();
        Some(displacement.norm() / elapsed)
    }

    /// Merge this object with an observation `other` of the same physical
    /// object made at a different time.
    ///
    /// The object created first keeps its identity; the other adopts it and
    /// is marked as merged. Both end up pointing at one track holding the
    /// combined history. Nothing happens when both sides were merged before.
    ///
    /// Returns the slot rewiring the caller must apply to any other alias of
    /// the retired track.
    pub fn observe(
        &mut self,
        other: &mut TrackedObject,
        arena: &mut TrackArena,
    ) -> Option<TrackMerge> {
        if !self.is_unmerged() && !other.is_unmerged() {
            return None;
        }

        let (kept, retired) = if other.date_created(arena) < self.date_created(arena) {
            self.state = MergeState::Merged;
            (other.track, self.track)
        } else {
            other.state = MergeState::Merged;
            (self.track, other.track)
        };

        self.track = kept;
        other.track = kept;
        arena.merge(kept, retired)
    }

    /// Owned copy of this object as it stands, for the tracker log.
    pub fn snapshot(&self, arena: &TrackArena) -> LoggedObject {
        let track = arena.get(self.track);
        LoggedObject {
            id: track.id,
            coords: self.coords,
            date_created: track.date_created(),
            end_time: track.end_time(),
            time_alive: self.time_alive(arena),
            history: track.history.clone(),
        }
    }
}

fn lifetime(start: f64, end: f64) -> u64 {
    let span = (end - start).floor();
    if span > 0.0 { span as u64 } else { 0 }
}

/// A retired object that lived long enough to be logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedObject {
    pub id: u32,
    /// Box of the object in the frame it retired from
    pub coords: BBox,
    pub date_created: f64,
    pub end_time: f64,
    pub time_alive: u64,
    pub history: Vec<Footprint>,
}

impl fmt::Display for LoggedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {} - coords: {}", self.id, self.coords)?;
        writeln!(
            f,
            "  lived {} secs ({} to {})",
            self.time_alive, self.date_created, self.end_time
        )?;
        write!(f, "  tracks: [")?;
        for (i, footprint) in self.history.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{footprint}")?;
        }
        writeln!(f, "]")
    }
}
