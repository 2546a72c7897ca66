//! Error types for sonartrace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonarTraceError {
    #[error("depth query against a ray with no traced segments")]
    EmptyPath,

    #[error("range {range_m} m outside the traced span [{min_range_m}, {max_range_m}] m")]
    RangeOutOfBounds {
        range_m: f64,
        min_range_m: f64,
        max_range_m: f64,
    },

    #[error("invalid ray path: {0}")]
    InvalidPath(String),

    #[error("invalid sound speed profile: {0}")]
    InvalidProfile(String),

    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SonarTraceError>;
