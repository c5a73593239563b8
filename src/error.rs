use thiserror::Error;

pub type TrackResult<T> = Result<T, TrackError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("invalid box coordinate {value:?}")]
    InvalidCoordinate { value: String },
    #[error("invalid frame timestamp {value:?}")]
    InvalidTimestamp { value: String },
    #[error("frame timestamp {current} precedes previous frame at {previous}")]
    OutOfOrder { previous: f64, current: f64 },
    #[error("all {capacity} object identifiers are in use")]
    IdsExhausted { capacity: u32 },
    #[error("invalid tracker config: {0}")]
    InvalidConfig(String),
}
