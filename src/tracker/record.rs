//! Input schema for one frame of detections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TrackError, TrackResult};
use crate::tracker::bbox::BBox;

/// One frame of detections as delivered by an upstream detector.
///
/// Fields other than the three the tracker reads (camera, location, image
/// ids and so on) are kept verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Number of detected objects. `0` means the frame is skipped.
    pub no_faces: u32,
    /// Flattened `x1,y1,x2,y2` box coordinates
    #[serde(default)]
    pub windows: Windows,
    pub date_created: Timestamp,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Box coordinates, either as a comma separated string or a number list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Windows {
    Values(Vec<i64>),
    Text(String),
}

impl Default for Windows {
    fn default() -> Self {
        Windows::Text(String::new())
    }
}

/// Epoch seconds, either numeric or as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Seconds(f64),
    Text(String),
}

impl Timestamp {
    pub fn seconds(&self) -> TrackResult<f64> {
        let seconds = match self {
            Timestamp::Seconds(s) => *s,
            Timestamp::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid_timestamp(text))?,
        };
        if seconds.is_finite() {
            Ok(seconds)
        } else {
            Err(invalid_timestamp(&seconds.to_string()))
        }
    }
}

fn invalid_timestamp(value: &str) -> TrackError {
    TrackError::InvalidTimestamp {
        value: value.to_string(),
    }
}

impl FrameRecord {
    pub fn new(no_faces: u32, windows: Windows, date_created: f64) -> Self {
        Self {
            no_faces,
            windows,
            date_created: Timestamp::Seconds(date_created),
            metadata: Map::new(),
        }
    }

    /// Whether this record can produce a frame at all.
    #[inline]
    pub fn has_detections(&self) -> bool {
        self.no_faces != 0
    }

    pub fn timestamp(&self) -> TrackResult<f64> {
        self.date_created.seconds()
    }

    pub fn boxes(&self) -> TrackResult<Vec<BBox>> {
        parse_windows(&self.windows)
    }
}

/// Split a flattened coordinate stream into consecutive `x1,y1,x2,y2` boxes.
///
/// Fewer than four values yield no boxes without being inspected. Otherwise
/// every value must be an integer and a trailing remainder shorter than four
/// values is dropped.
pub fn parse_windows(windows: &Windows) -> TrackResult<Vec<BBox>> {
    let values = match windows {
        Windows::Values(values) => {
            if values.len() < 4 {
                return Ok(Vec::new());
            }
            values.clone()
        }
        Windows::Text(text) => {
            let items: Vec<&str> = text.split(',').collect();
            if items.len() < 4 {
                return Ok(Vec::new());
            }
            items
                .into_iter()
                .map(|item| {
                    item.trim().parse::<i64>().map_err(|_| TrackError::InvalidCoordinate {
                        value: item.to_string(),
                    })
                })
                .collect::<TrackResult<Vec<_>>>()?
        }
    };

    Ok(values
        .chunks_exact(4)
        .map(|c| BBox::new(c[0], c[1], c[2], c[3]))
        .collect())
}
