/// buoymon_service: King County lake buoy telemetry monitoring service.
///
/// # Module structure
///
/// ```text
/// buoymon_service
/// ├── model       — shared data types (BuoyObservation, LakeSnapshot, FeedError)
/// ├── config      — service configuration loader (buoymon.toml)
/// ├── logging     — leveled console/file logging with failure classification
/// ├── fields      — observation field catalog (labels, units, icons)
/// ├── coordinator — refresh cycle, snapshot cache, subscriber notification
/// ├── subscribers — data-changed callback registry
/// ├── daemon      — poll scheduling loop (one cycle per tick, drop missed ticks)
/// ├── endpoint    — HTTP API over the current snapshot
/// └── ingest
///     ├── kingcounty — King County feed: HTTP fetch + map-data parsing
///     └── fixtures (test only) — representative feed payloads
/// ```

/// Public modules
pub mod config;
pub mod coordinator;
pub mod daemon;
pub mod endpoint;
pub mod fields;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod subscribers;
