/// King County Lake Buoy Feed Client
///
/// Retrieves buoy telemetry (weather and water conditions) for the Lake
/// Washington and Lake Sammamish monitoring buoys from King County's
/// map-data endpoint, and parses the delimited text payload into typed
/// per-lake observations.
///
/// Feed portal: https://green2.kingcounty.gov/lake-buoy/

use crate::logging::{self, DataSource};
use crate::model::{BuoyObservation, FeedError, LakeSnapshot};
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use std::time::Duration;

/// The production map-data endpoint. GET, no parameters, no auth.
pub const API_URL: &str = "https://green2.kingcounty.gov/lake-buoy/GenerateMapData.aspx";

// ============================================================================
// Payload contract
// ============================================================================
//
// The payload is one line of text: entries separated by "^|", fields within
// an entry separated by "|" followed by a tab. Field order and the "Y" flag
// are a fixed, unversioned contract with the feed.

/// Separates one buoy entry from the next.
pub const ENTRY_DELIMITER: &str = "^|";

/// Separates fields within an entry (pipe followed by a tab).
pub const FIELD_DELIMITER: &str = "|\t";

/// Entries whose flag field is anything but this are not live buoys.
pub const VALID_FLAG: &str = "Y";

/// An entry must carry at least this many fields to be considered.
pub const MIN_FIELDS: usize = 10;

// Field positions within an entry.
pub const FIELD_LAKE_NAME: usize = 0;
pub const FIELD_WEATHER_TIME: usize = 1;
pub const FIELD_AIR_TEMP: usize = 2;
pub const FIELD_WIND_SPEED: usize = 3;
pub const FIELD_WIND_DIRECTION: usize = 4;
pub const FIELD_WATER_TEMP: usize = 5;
pub const FIELD_WATER_TIME: usize = 6;
pub const FIELD_LATITUDE: usize = 7;
pub const FIELD_LONGITUDE: usize = 8;
pub const FIELD_VALID_FLAG: usize = 9;

/// The wind direction field reads "from NNE"; the first 5 characters are
/// the "from " prefix.
pub const WIND_DIRECTION_PREFIX_LEN: usize = 5;

/// Snapshot keys are display names: this prefix plus the raw lake name.
pub const LAKE_NAME_PREFIX: &str = "Lake ";

/// Buoy timestamps carry no zone marker; the feed reports Pacific local time.
pub const BUOY_TIME_ZONE: Tz = chrono_tz::America::Los_Angeles;

/// Timestamp layouts observed in the feed, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// ============================================================================
// Fetch
// ============================================================================

/// Fetch the raw map-data payload from the feed.
///
/// # Parameters
/// - `client`: HTTP client (shared; the timeout is applied per request)
/// - `url`: feed URL, normally `API_URL`
/// - `timeout`: upper bound on the whole request
///
/// # Returns
/// The raw payload text, or a classified `FeedError`. One call is one
/// attempt — retry policy belongs to the caller's cycle schedule.
pub fn fetch_map_data(
    client: &reqwest::blocking::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, FeedError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .map_err(classify_request_error)?;

    if !response.status().is_success() {
        return Err(FeedError::HttpStatus(response.status().as_u16()));
    }

    response.text().map_err(classify_request_error)
}

/// Map a reqwest failure onto the feed error taxonomy.
fn classify_request_error(err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout
    } else if err.is_connect() || err.is_request() {
        FeedError::Transport(err.to_string())
    } else {
        FeedError::Unexpected(err.to_string())
    }
}

// ============================================================================
// Parse
// ============================================================================

/// Parse a raw map-data payload into per-lake observations.
///
/// Total: malformed input can only shrink the result, never fail it.
/// Entries are dropped when they are short, not flagged live, or carry an
/// unparseable field; each drop is independent of every other entry. An
/// entry appearing twice under the same name keeps the later occurrence.
pub fn parse_map_data(raw: &str) -> LakeSnapshot {
    let mut snapshot = LakeSnapshot::new();

    for entry in raw.split(ENTRY_DELIMITER) {
        let fields: Vec<&str> = entry.split(FIELD_DELIMITER).collect();
        if fields.len() < MIN_FIELDS || fields[FIELD_VALID_FLAG] != VALID_FLAG {
            continue;
        }

        let lake_name = format!("{}{}", LAKE_NAME_PREFIX, fields[FIELD_LAKE_NAME]);

        match parse_entry(&fields) {
            Ok(observation) => {
                snapshot.insert(lake_name, observation);
            }
            Err(reason) => {
                logging::debug(
                    DataSource::Feed,
                    Some(&lake_name),
                    &format!("Skipping entry: {}", reason),
                );
            }
        }
    }

    snapshot
}

/// Parse one entry's fields. The caller has already checked the length and
/// validity flag.
fn parse_entry(fields: &[&str]) -> Result<BuoyObservation, String> {
    Ok(BuoyObservation {
        weather_last_update: parse_timestamp(fields[FIELD_WEATHER_TIME])?,
        air_temperature_c: parse_number(fields[FIELD_AIR_TEMP], "air temperature")?,
        wind_speed_ms: parse_number(fields[FIELD_WIND_SPEED], "wind speed")?,
        wind_direction: strip_wind_prefix(fields[FIELD_WIND_DIRECTION]),
        water_temperature_c: parse_number(fields[FIELD_WATER_TEMP], "water temperature")?,
        water_last_update: parse_timestamp(fields[FIELD_WATER_TIME])?,
        buoy_latitude: parse_number(fields[FIELD_LATITUDE], "latitude")?,
        buoy_longitude: parse_number(fields[FIELD_LONGITUDE], "longitude")?,
    })
}

fn parse_number(raw: &str, label: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("unparseable {}: '{}'", label, raw))
}

/// Drop the leading "from " from a wind direction field. A field shorter
/// than the prefix yields the empty string rather than an error.
fn strip_wind_prefix(raw: &str) -> String {
    raw.get(WIND_DIRECTION_PREFIX_LEN..).unwrap_or("").to_string()
}

/// Parse a free-text buoy timestamp and pin it to Pacific local time.
///
/// An ambiguous local time (the fall-back DST hour) resolves to the earlier
/// offset; a nonexistent one (the spring-forward gap) is an error and drops
/// the entry.
fn parse_timestamp(raw: &str) -> Result<DateTime<Tz>, String> {
    let trimmed = raw.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return BUOY_TIME_ZONE
                .from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| {
                    format!("timestamp '{}' does not exist in {}", trimmed, BUOY_TIME_ZONE)
                });
        }
    }

    Err(format!("unrecognized timestamp format: '{}'", trimmed))
}

// ============================================================================
// Tests
// ============================================================================
