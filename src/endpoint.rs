/// HTTP endpoint for querying the current snapshot
///
/// Provides a simple REST API for external tools (dashboards, scripts) to
/// read the coordinator's last known good data.
///
/// Endpoints:
/// - GET /health - Service health check and cycle status
/// - GET /lakes - Names of all lakes in the current snapshot
/// - GET /lakes/{name} - All fields for one lake, rendered via the catalog
///
/// Handlers only ever read coordinator state; requests run on a small worker
/// pool and an in-flight refresh never blocks them.

use crate::coordinator::BuoyCoordinator;
use crate::fields::{self, FieldValue, ATTRIBUTION, FIELD_CATALOG};
use crate::logging::{self, DataSource};
use crate::model::BuoyObservation;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use threadpool::ThreadPool;

/// Upper bound on concurrently handled requests.
const ENDPOINT_WORKERS: usize = 4;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Service status summary for monitoring probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" while cycles succeed, "degraded" when serving a stale snapshot,
    /// "down" before any data exists.
    pub status: String,
    pub service: String,
    pub last_cycle_successful: bool,
    pub lake_count: usize,
    pub snapshot_age_minutes: Option<i64>,
    pub last_error: Option<String>,
}

/// Lake name listing.
#[derive(Debug, Serialize)]
pub struct LakeListResponse {
    pub lakes: Vec<String>,
    pub attribution: String,
}

/// One lake's full set of readings.
#[derive(Debug, Serialize)]
pub struct LakeDetailResponse {
    pub lake: String,
    pub attribution: String,
    pub fields: Vec<FieldData>,
}

/// A single rendered field for JSON response.
#[derive(Debug, Serialize)]
pub struct FieldData {
    pub key: String,
    pub label: String,
    pub value: serde_json::Value,
    pub unit: Option<String>,
    pub icon: String,
}

// ---------------------------------------------------------------------------
// Response Building
// ---------------------------------------------------------------------------

/// Assemble the health summary from coordinator state.
fn build_health(coordinator: &BuoyCoordinator) -> HealthResponse {
    let snapshot = coordinator.snapshot();
    let last_cycle_successful = coordinator.last_cycle_successful();

    let status = if last_cycle_successful {
        "ok"
    } else if snapshot.is_some() {
        "degraded"
    } else {
        "down"
    };

    HealthResponse {
        status: status.to_string(),
        service: "buoymon_service".to_string(),
        last_cycle_successful,
        lake_count: snapshot.map(|s| s.len()).unwrap_or(0),
        snapshot_age_minutes: coordinator
            .snapshot_age_at(Utc::now())
            .map(|age| age.num_minutes()),
        last_error: coordinator.last_error().map(|e| e.to_string()),
    }
}

/// Assemble the per-lake detail by walking the field catalog.
fn build_lake_detail(lake_name: &str, observation: &BuoyObservation) -> LakeDetailResponse {
    let rendered = FIELD_CATALOG
        .iter()
        .map(|spec| FieldData {
            key: spec.key.to_string(),
            label: spec.label.to_string(),
            value: field_value_to_json(&fields::field_value(observation, spec.kind)),
            unit: spec.unit.map(String::from),
            icon: spec.icon.to_string(),
        })
        .collect();

    LakeDetailResponse {
        lake: lake_name.to_string(),
        attribution: ATTRIBUTION.to_string(),
        fields: rendered,
    }
}

/// Numbers stay JSON numbers; timestamps render as RFC 3339 strings.
fn field_value_to_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Number(n) => serde_json::json!(n),
        FieldValue::Text(s) => serde_json::json!(s),
        FieldValue::Timestamp(ts) => serde_json::json!(ts.to_rfc3339()),
    }
}

// ---------------------------------------------------------------------------
// Request Handling
// ---------------------------------------------------------------------------

/// Route a request URL to its handler.
fn route_request(
    url: &str,
    coordinator: &BuoyCoordinator,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    if url == "/health" {
        handle_health(coordinator)
    } else if url == "/lakes" {
        handle_lake_list(coordinator)
    } else if let Some(encoded_name) = url.strip_prefix("/lakes/") {
        handle_lake_query(coordinator, encoded_name)
    } else {
        create_response(
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/lakes", "/lakes/{name}"]
            }),
        )
    }
}

/// Handle /health endpoint
fn handle_health(coordinator: &BuoyCoordinator) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let health = build_health(coordinator);
    create_response(200, serde_json::to_value(&health).unwrap())
}

/// Handle /lakes endpoint
fn handle_lake_list(
    coordinator: &BuoyCoordinator,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut lakes: Vec<String> = coordinator
        .snapshot()
        .map(|snapshot| snapshot.keys().cloned().collect())
        .unwrap_or_default();
    lakes.sort();

    let body = LakeListResponse {
        lakes,
        attribution: ATTRIBUTION.to_string(),
    };
    create_response(200, serde_json::to_value(&body).unwrap())
}

/// Handle /lakes/{name} endpoint. Lake names contain spaces, so the path
/// segment arrives percent-encoded.
fn handle_lake_query(
    coordinator: &BuoyCoordinator,
    encoded_name: &str,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let name = match urlencoding::decode(encoded_name) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => {
            return create_response(
                400,
                serde_json::json!({ "error": "Invalid percent-encoding in lake name" }),
            );
        }
    };

    let snapshot = match coordinator.snapshot() {
        Some(snapshot) => snapshot,
        None => {
            return create_response(
                503,
                serde_json::json!({ "error": "No snapshot available yet" }),
            );
        }
    };

    match snapshot.get(&name) {
        Some(observation) => {
            let detail = build_lake_detail(&name, observation);
            create_response(200, serde_json::to_value(&detail).unwrap())
        }
        None => {
            let mut known: Vec<&String> = snapshot.keys().collect();
            known.sort();
            create_response(
                404,
                serde_json::json!({
                    "error": format!("Lake '{}' not in current snapshot", name),
                    "known_lakes": known
                }),
            )
        }
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap();
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
        )
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start the endpoint server on the specified port and serve forever.
pub fn start_endpoint_server(port: u16, coordinator: Arc<BuoyCoordinator>) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    logging::info(
        DataSource::Endpoint,
        None,
        &format!("Endpoint listening on http://0.0.0.0:{}", port),
    );

    run_server(server, coordinator);
    Ok(())
}

/// Serve requests on an already-bound server. Split out from
/// `start_endpoint_server` so tests can bind an ephemeral port.
pub fn run_server(server: tiny_http::Server, coordinator: Arc<BuoyCoordinator>) {
    let pool = ThreadPool::new(ENDPOINT_WORKERS);

    for request in server.incoming_requests() {
        let coordinator = Arc::clone(&coordinator);
        pool.execute(move || {
            let response = route_request(request.url(), &coordinator);
            if let Err(e) = request.respond(response) {
                logging::warn(
                    DataSource::Endpoint,
                    None,
                    &format!("Failed to send response: {}", e),
                );
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
