/// Data ingestion for the lake buoy monitoring service.
///
/// Submodules:
/// - `kingcounty` — King County buoy feed: HTTP fetch + map-data parsing.
/// - `fixtures` (test only) — representative feed payloads.

pub mod fixtures;
pub mod kingcounty;
