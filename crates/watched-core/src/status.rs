//! Marker status codes reported by the script and their display labels.

use serde::Serialize;

/// Raw status code as reported by the script.
pub type StatusCode = i64;

/// Status before anything has been reported.
pub const INITIAL_STATUS: StatusCode = 0;

/// Interpretation of a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedStatus {
    /// Code 0: the marker does not exist.
    NotWatched,
    /// Code 1: the marker exists.
    Watched,
    /// Anything else; the raw code is kept.
    Unknown(StatusCode),
}

impl WatchedStatus {
    pub fn from_code(code: StatusCode) -> Self {
        match code {
            0 => WatchedStatus::NotWatched,
            1 => WatchedStatus::Watched,
            other => WatchedStatus::Unknown(other),
        }
    }

    /// Only an exact `1` counts as watched.
    pub fn is_watched(self) -> bool {
        self == WatchedStatus::Watched
    }
}

/// Label shown to the user for a reply: `Yes`, `No`, or `Unknown: {status}::{action}`.
pub fn status_label(action: i64, status: StatusCode) -> String {
    match WatchedStatus::from_code(status) {
        WatchedStatus::Watched => "Yes".to_string(),
        WatchedStatus::NotWatched => "No".to_string(),
        WatchedStatus::Unknown(code) => format!("Unknown: {}::{}", code, action),
    }
}
