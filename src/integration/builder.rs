//! Builder for creating FrameRecord objects from boxes in various formats.

use serde_json::{Map, Value};

use crate::tracker::{FrameRecord, Timestamp, Windows};

/// Builder for creating `FrameRecord` objects.
///
/// Unless set explicitly, the detection count is the number of complete
/// boxes in the coordinates.
#[derive(Debug, Clone, Default)]
pub struct FrameRecordBuilder {
    no_faces: Option<u32>,
    coords: Vec<i64>,
    windows: Option<String>,
    timestamp: f64,
    metadata: Map<String, Value>,
}

impl FrameRecordBuilder {
    /// Create a new record builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame timestamp in epoch seconds.
    pub fn timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a box in TLBR format (x1, y1, x2, y2), inclusive.
    pub fn tlbr(mut self, x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        self.coords.extend([x1, y1, x2, y2]);
        self
    }

    /// Add a box in TLWH format (left, top, width, height).
    pub fn tlwh(self, x: i64, y: i64, w: i64, h: i64) -> Self {
        self.tlbr(x, y, x + w - 1, y + h - 1)
    }

    /// Use a raw comma separated coordinate string instead of added boxes.
    pub fn windows(mut self, windows: impl Into<String>) -> Self {
        self.windows = Some(windows.into());
        self
    }

    /// Override the detection count.
    pub fn no_faces(mut self, no_faces: u32) -> Self {
        self.no_faces = Some(no_faces);
        self
    }

    /// Attach a passthrough field.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the final `FrameRecord`.
    pub fn build(self) -> FrameRecord {
        let value_count = match &self.windows {
            Some(text) => text.split(',').count(),
            None => self.coords.len(),
        };
        let no_faces = self
            .no_faces
            .unwrap_or_else(|| u32::try_from(value_count / 4).unwrap_or(u32::MAX));
        let windows = match self.windows {
            Some(text) => Windows::Text(text),
            None => Windows::Values(self.coords),
        };
        FrameRecord {
            no_faces,
            windows,
            date_created: Timestamp::Seconds(self.timestamp),
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::BBox;

    #[test]
    fn test_record_builder() {
        let record = FrameRecordBuilder::new()
            .timestamp(1000.0)
            .tlbr(10, 20, 50, 80)
            .tlwh(100, 100, 10, 10)
            .meta("camera_id", "camera-1")
            .build();

        assert_eq!(record.no_faces, 2);
        assert_eq!(record.timestamp().unwrap(), 1000.0);
        assert_eq!(
            record.boxes().unwrap(),
            vec![BBox::new(10, 20, 50, 80), BBox::new(100, 100, 109, 109)]
        );
        assert_eq!(record.metadata["camera_id"], "camera-1");
    }

    #[test]
    fn test_raw_windows_and_count() {
        let record = FrameRecordBuilder::new().windows("1,2,3").no_faces(3).build();
        assert_eq!(record.no_faces, 3);
        assert!(record.boxes().unwrap().is_empty());
    }
}
