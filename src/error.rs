//! Error types.
//!
//! Per-schedule anomalies (missing geometry, unknown route type) are not
//! errors; they are logged and skipped by the projector. The types here cover
//! the collaborator boundaries.

use thiserror::Error;

/// Failure of a walking-directions lookup.
#[derive(Error, Debug)]
pub enum DirectionsError {
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directions service returned {code}: {message}")]
    Service { code: String, message: String },

    #[error("invalid route geometry: {0}")]
    Geometry(#[from] PolylineError),
}

/// Malformed encoded polyline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolylineError {
    #[error("encoded polyline truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("byte {byte:#04x} at offset {offset} is outside the polyline alphabet")]
    InvalidByte { offset: usize, byte: u8 },

    #[error("coordinate overflow in value starting at byte {offset}")]
    Overflow { offset: usize },
}

/// Upstream schedule fetch failure, surfaced to the caller as-is.
#[derive(Error, Debug)]
pub enum ScheduleSourceError {
    #[error("schedule source unavailable: {reason}")]
    Unavailable {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("schedule source rejected the request: {0}")]
    Rejected(String),
}

impl ScheduleSourceError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
            source: None,
        }
    }
}

/// OSRM dataset preparation failure.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("dataset i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    ProcessFailure(String),
}
