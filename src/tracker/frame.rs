use std::fmt;

use crate::tracker::object::TrackedObject;

/// The objects detected at one timestamp.
///
/// The object set is fixed at construction; member objects only change
/// through merges.
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp: f64,
    /// Detection count reported by the record
    pub object_count: u32,
    objects: Vec<TrackedObject>,
}

impl Frame {
    pub fn new(timestamp: f64, object_count: u32, objects: Vec<TrackedObject>) -> Self {
        Self {
            timestamp,
            object_count,
            objects,
        }
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut [TrackedObject] {
        &mut self.objects
    }

    pub(crate) fn into_objects(self) -> Vec<TrackedObject> {
        self.objects
    }

    /// Objects not yet merged into an older identity.
    pub fn new_objects(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.iter().filter(|obj| obj.is_unmerged())
    }

    pub(crate) fn new_object_indices(&self) -> Vec<usize> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(i, obj)| obj.is_unmerged().then_some(i))
            .collect()
    }

    pub fn has_new_objects(&self) -> bool {
        self.objects.iter().any(TrackedObject::is_unmerged)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame at {} with {} objects", self.timestamp, self.objects.len())?;
        for obj in &self.objects {
            write!(f, "\n    {}", obj.coords)?;
        }
        Ok(())
    }
}
