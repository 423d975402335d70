///the delimited payload strings, cfg(test) gated
///
/// Test fixtures: representative payloads from the King County map-data feed.
///
/// These fixtures are small but structurally faithful to the real feed: one
/// line of text, entries separated by "^|", fields separated by "|" plus a
/// tab, ten fields per entry.
///
/// Entry shape:
///   name | weather time | air temp | wind speed | wind direction |
///   water temp | water time | latitude | longitude | flag
///
/// The wind direction field carries a literal "from " prefix, and the flag
/// field is "Y" only for live buoys. Timestamps are Pacific local time with
/// no zone marker.

/// Two live buoys, both flagged "Y".
#[cfg(test)]
pub(crate) fn fixture_two_valid_lakes() -> &'static str {
    concat!(
        "Washington|\t2024-01-01T10:00:00|\t15.2|\t3.1|\tfrom NNE|\t12.5|\t",
        "2024-01-01T10:00:00|\t47.5|\t-122.2|\tY",
        "^|",
        "Sammamish|\t2024-01-01T10:05:00|\t14.8|\t2.2|\tfrom SSW|\t11.9|\t",
        "2024-01-01T10:05:00|\t47.61|\t-122.09|\tY"
    )
}

/// One live buoy and one that is flagged "N" and reporting a junk air
/// temperature (buoy pulled for the season). Only Washington should
/// survive parsing.
#[cfg(test)]
pub(crate) fn fixture_mixed_validity() -> &'static str {
    concat!(
        "Washington|\t2024-01-01T10:00:00|\t15.2|\t3.1|\tfrom NNE|\t12.5|\t",
        "2024-01-01T10:00:00|\t47.5|\t-122.2|\tY",
        "^|",
        "Sammamish|\t2024-01-01T10:05:00|\tbad|\t2.0|\tfrom S|\t13.0|\t",
        "2024-01-01T10:05:00|\t47.6|\t-122.0|\tN"
    )
}

/// A valid entry followed by a truncated one (feed cut off mid-entry).
#[cfg(test)]
pub(crate) fn fixture_short_entry() -> &'static str {
    concat!(
        "Washington|\t2024-01-01T10:00:00|\t15.2|\t3.1|\tfrom NNE|\t12.5|\t",
        "2024-01-01T10:00:00|\t47.5|\t-122.2|\tY",
        "^|",
        "Sammamish|\t2024-01-01T10:05:00|\t14.8"
    )
}

/// Sammamish is flagged live but reports a non-numeric air temperature.
/// Washington must still parse.
#[cfg(test)]
pub(crate) fn fixture_corrupt_air_temp() -> &'static str {
    concat!(
        "Washington|\t2024-01-01T10:00:00|\t15.2|\t3.1|\tfrom NNE|\t12.5|\t",
        "2024-01-01T10:00:00|\t47.5|\t-122.2|\tY",
        "^|",
        "Sammamish|\t2024-01-01T10:05:00|\tn/a|\t2.2|\tfrom SSW|\t11.9|\t",
        "2024-01-01T10:05:00|\t47.61|\t-122.09|\tY"
    )
}

/// Washington carries a mangled weather timestamp; Sammamish is clean.
#[cfg(test)]
pub(crate) fn fixture_corrupt_timestamp() -> &'static str {
    concat!(
        "Washington|\tyesterday-ish|\t15.2|\t3.1|\tfrom NNE|\t12.5|\t",
        "2024-01-01T10:00:00|\t47.5|\t-122.2|\tY",
        "^|",
        "Sammamish|\t2024-01-01T10:05:00|\t14.8|\t2.2|\tfrom SSW|\t11.9|\t",
        "2024-01-01T10:05:00|\t47.61|\t-122.09|\tY"
    )
}

/// The same lake twice with different readings; the later entry wins.
#[cfg(test)]
pub(crate) fn fixture_duplicate_lake() -> &'static str {
    concat!(
        "Washington|\t2024-01-01T10:00:00|\t15.2|\t3.1|\tfrom NNE|\t12.5|\t",
        "2024-01-01T10:00:00|\t47.5|\t-122.2|\tY",
        "^|",
        "Washington|\t2024-01-01T10:10:00|\t16.0|\t3.4|\tfrom NNE|\t12.6|\t",
        "2024-01-01T10:10:00|\t47.5|\t-122.2|\tY"
    )
}

/// Timestamps in the feed's US date layout rather than ISO 8601.
#[cfg(test)]
pub(crate) fn fixture_us_timestamps() -> &'static str {
    concat!(
        "Washington|\t07/04/2024 02:30:00 PM|\t22.7|\t4.0|\tfrom WSW|\t19.3|\t",
        "07/04/2024 02:30:00 PM|\t47.5|\t-122.2|\tY"
    )
}
