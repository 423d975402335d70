/// field catalog, the "every observation field is described" test lives here
/// a map of data keys to presentation metadata (label, unit, icon).
/// Field registry for the lake buoy monitoring service.
///
/// Defines the canonical list of per-lake data fields exposed by this
/// service, along with their display metadata. This is the single source of
/// truth for field keys — the endpoint and any other consumer should
/// reference fields from here rather than hardcoding key strings.

use crate::model::BuoyObservation;
use chrono::DateTime;
use chrono_tz::Tz;

// ---------------------------------------------------------------------------
// Attribution (re-exported here for use in consumer-facing responses)
// ---------------------------------------------------------------------------

pub use crate::model::ATTRIBUTION;

// ---------------------------------------------------------------------------
// Field metadata
// ---------------------------------------------------------------------------

/// Identifies one field of a `BuoyObservation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    WeatherLastUpdate,
    AirTemperature,
    WindSpeed,
    WindDirection,
    WaterTemperature,
    WaterLastUpdate,
    BuoyLatitude,
    BuoyLongitude,
}

/// Presentation metadata for a single observation field.
pub struct FieldSpec {
    pub kind: FieldKind,
    /// Stable key used in endpoint responses.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Unit of measurement, if the field has one.
    pub unit: Option<&'static str>,
    /// Material Design icon name, as rendered by downstream dashboards.
    pub icon: &'static str,
}

/// All observation fields, in upstream column order.
///
/// Units follow the feed itself: temperatures in Celsius, wind speed in
/// meters per second, coordinates in decimal degrees.
pub static FIELD_CATALOG: &[FieldSpec] = &[
    FieldSpec {
        kind: FieldKind::WeatherLastUpdate,
        key: "weather_last_update",
        label: "Weather Last Update",
        unit: None,
        icon: "mdi:clock-outline",
    },
    FieldSpec {
        kind: FieldKind::AirTemperature,
        key: "air_temperature",
        label: "Air Temperature",
        unit: Some("°C"),
        icon: "mdi:thermometer",
    },
    FieldSpec {
        kind: FieldKind::WindSpeed,
        key: "wind_speed",
        label: "Wind Speed",
        unit: Some("m/s"),
        icon: "mdi:weather-windy",
    },
    FieldSpec {
        kind: FieldKind::WindDirection,
        key: "wind_direction",
        label: "Wind Direction",
        unit: None,
        icon: "mdi:compass-outline",
    },
    FieldSpec {
        kind: FieldKind::WaterTemperature,
        key: "water_temperature",
        label: "Water Temperature",
        unit: Some("°C"),
        icon: "mdi:water-thermometer",
    },
    FieldSpec {
        kind: FieldKind::WaterLastUpdate,
        key: "water_last_update",
        label: "Water Last Update",
        unit: None,
        icon: "mdi:clock-outline",
    },
    FieldSpec {
        kind: FieldKind::BuoyLatitude,
        key: "buoy_latitude",
        label: "Buoy Latitude",
        unit: Some("°"),
        icon: "mdi:latitude",
    },
    FieldSpec {
        kind: FieldKind::BuoyLongitude,
        key: "buoy_longitude",
        label: "Buoy Longitude",
        unit: Some("°"),
        icon: "mdi:longitude",
    },
];

/// Looks up a field by its response key. Returns `None` if not found.
pub fn find_field(key: &str) -> Option<&'static FieldSpec> {
    FIELD_CATALOG.iter().find(|f| f.key == key)
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

/// A single field's value, typed for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Timestamp(DateTime<Tz>),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Extracts one field from an observation.
pub fn field_value(observation: &BuoyObservation, kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::WeatherLastUpdate => FieldValue::Timestamp(observation.weather_last_update),
        FieldKind::AirTemperature => FieldValue::Number(observation.air_temperature_c),
        FieldKind::WindSpeed => FieldValue::Number(observation.wind_speed_ms),
        FieldKind::WindDirection => FieldValue::Text(observation.wind_direction.clone()),
        FieldKind::WaterTemperature => FieldValue::Number(observation.water_temperature_c),
        FieldKind::WaterLastUpdate => FieldValue::Timestamp(observation.water_last_update),
        FieldKind::BuoyLatitude => FieldValue::Number(observation.buoy_latitude),
        FieldKind::BuoyLongitude => FieldValue::Number(observation.buoy_longitude),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn sample_observation() -> BuoyObservation {
        let ts = Los_Angeles.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        BuoyObservation {
            weather_last_update: ts,
            air_temperature_c: 15.2,
            wind_speed_ms: 3.1,
            wind_direction: "NNE".to_string(),
            water_temperature_c: 12.5,
            water_last_update: ts,
            buoy_latitude: 47.5,
            buoy_longitude: -122.2,
        }
    }

    #[test]
    fn test_no_duplicate_field_keys() {
        let mut seen = std::collections::HashSet::new();
        for field in FIELD_CATALOG {
            assert!(
                seen.insert(field.key),
                "duplicate field key '{}' found in FIELD_CATALOG",
                field.key
            );
        }
    }

    #[test]
    fn test_catalog_covers_every_observation_field_exactly_once() {
        // One catalog entry per BuoyObservation field; a missing entry means
        // the endpoint silently stops reporting that reading.
        let expected = [
            FieldKind::WeatherLastUpdate,
            FieldKind::AirTemperature,
            FieldKind::WindSpeed,
            FieldKind::WindDirection,
            FieldKind::WaterTemperature,
            FieldKind::WaterLastUpdate,
            FieldKind::BuoyLatitude,
            FieldKind::BuoyLongitude,
        ];
        assert_eq!(FIELD_CATALOG.len(), expected.len());
        for kind in expected {
            assert!(
                FIELD_CATALOG.iter().any(|f| f.kind == kind),
                "FIELD_CATALOG missing entry for {:?}",
                kind
            );
        }
    }

    #[test]
    fn test_labels_and_icons_are_populated() {
        for field in FIELD_CATALOG {
            assert!(!field.label.is_empty(), "label must not be empty for '{}'", field.key);
            assert!(
                field.icon.starts_with("mdi:"),
                "icon for '{}' should be an mdi name, got '{}'",
                field.key,
                field.icon
            );
        }
    }

    #[test]
    fn test_units_match_feed_contract() {
        assert_eq!(find_field("air_temperature").unwrap().unit, Some("°C"));
        assert_eq!(find_field("water_temperature").unwrap().unit, Some("°C"));
        assert_eq!(find_field("wind_speed").unwrap().unit, Some("m/s"));
        assert_eq!(find_field("buoy_latitude").unwrap().unit, Some("°"));
        assert_eq!(find_field("buoy_longitude").unwrap().unit, Some("°"));
        assert_eq!(find_field("wind_direction").unwrap().unit, None);
    }

    #[test]
    fn test_find_field_returns_none_for_unknown_key() {
        assert!(find_field("barometric_pressure").is_none());
    }

    #[test]
    fn test_field_value_returns_typed_variants() {
        let obs = sample_observation();

        assert_eq!(
            field_value(&obs, FieldKind::AirTemperature),
            FieldValue::Number(15.2)
        );
        assert_eq!(
            field_value(&obs, FieldKind::WindDirection),
            FieldValue::Text("NNE".to_string())
        );
        match field_value(&obs, FieldKind::WaterLastUpdate) {
            FieldValue::Timestamp(ts) => assert_eq!(ts, obs.water_last_update),
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_timestamp_values_render_as_rfc3339() {
        let obs = sample_observation();
        let rendered = field_value(&obs, FieldKind::WeatherLastUpdate).to_string();
        assert!(
            rendered.starts_with("2024-01-01T10:00:00"),
            "timestamp should render as RFC 3339, got '{}'",
            rendered
        );
        assert!(
            rendered.ends_with("-08:00"),
            "January timestamp should carry the PST offset, got '{}'",
            rendered
        );
    }
}
