/// BuoyObservation, LakeSnapshot, FeedError
/// core data structures and error handling
///
/// Core data types for the lake buoy monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies beyond the
/// timestamp types — only types.

use chrono::DateTime;
use chrono_tz::Tz;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Attribution
// ---------------------------------------------------------------------------

/// Required data credit, surfaced on every consumer-facing view.
pub const ATTRIBUTION: &str =
    "Data provided by King County https://green2.kingcounty.gov/lake-buoy/";

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// The latest set of readings from a single lake buoy.
///
/// Corresponds to one valid entry in the upstream map-data payload. Both
/// timestamps are reported by the buoy in Pacific local time and carry the
/// America/Los_Angeles zone.
#[derive(Debug, Clone, PartialEq)]
pub struct BuoyObservation {
    pub weather_last_update: DateTime<Tz>,
    pub air_temperature_c: f64,
    pub wind_speed_ms: f64,
    pub wind_direction: String, // compass text, e.g. "NNE"
    pub water_temperature_c: f64,
    pub water_last_update: DateTime<Tz>,
    pub buoy_latitude: f64,
    pub buoy_longitude: f64,
}

/// One complete parse of the upstream payload: display name → observation.
///
/// Keys are display names like "Lake Washington". An empty map is a valid
/// snapshot — it means the feed answered but listed no valid buoys, which is
/// distinct from a failed fetch.
pub type LakeSnapshot = HashMap<String, BuoyObservation>;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching the buoy feed.
///
/// One refresh cycle produces at most one of these; the coordinator records
/// it and keeps serving the previous snapshot. Downstream code branches only
/// on success vs. failure — the variants exist for logging and the status
/// endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Non-2xx HTTP response from the feed.
    HttpStatus(u16),
    /// The request exceeded the configured fetch timeout.
    Timeout,
    /// Connection-level failure (DNS, refused, reset, TLS).
    Transport(String),
    /// Anything else that escaped the fetch path.
    Unexpected(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::HttpStatus(code) => write!(f, "HTTP error: {}", code),
            FeedError::Timeout => write!(f, "Timeout communicating with feed"),
            FeedError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FeedError::Unexpected(msg) => write!(f, "Unexpected error: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}
