mod bbox;
mod frame;
mod id_allocator;
mod matching;
mod merge_state;
mod object;
mod object_tracker;
mod record;
mod track;

pub use bbox::{BBox, iou_batch};
pub use frame::Frame;
pub use id_allocator::IdAllocator;
pub use matching::{location_match, momentum_match};
pub use merge_state::MergeState;
pub use object::{LoggedObject, TrackedObject};
pub use object_tracker::{ObjectTracker, TrackerConfig, track_objects, track_objects_with};
pub use record::{FrameRecord, Timestamp, Windows, parse_windows};
pub use track::{Footprint, Track, TrackArena, TrackKey, TrackMerge};
