/// Integration tests for coordinator lifecycle behavior
///
/// These tests run the full fetch/parse/cache/notify pipeline against a
/// scripted in-process HTTP stub standing in for the upstream feed:
/// 1. Initial refresh success and failure
/// 2. Snapshot preservation across feed outages
/// 3. Empty payload handling
/// 4. Subscriber notification over real cycles
/// 5. Concurrent readers during a snapshot swap
/// 6. HTTP query endpoint responses
///
/// Every test binds its own ephemeral port, so they are safe to run in
/// parallel with the default test harness.
///
/// Run with: cargo test --test coordinator_lifecycle

use buoymon_service::coordinator::BuoyCoordinator;
use buoymon_service::endpoint;
use buoymon_service::model::FeedError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Two valid buoy entries, Washington and Sammamish.
const TWO_LAKES: &str = concat!(
    "Washington|\t2024-01-15T08:30:00|\t7.2|\t3.4|\tfrom NW|\t9.1|\t",
    "2024-01-15T08:25:00|\t47.62|\t-122.26|\tY^|",
    "Sammamish|\t2024-01-15T08:30:00|\t6.8|\t2.1|\tfrom SSE|\t8.4|\t",
    "2024-01-15T08:20:00|\t47.60|\t-122.09|\tY",
);

/// A later reading for Washington only, with different values.
const ONE_LAKE_LATER: &str = concat!(
    "Washington|\t2024-01-15T08:40:00|\t7.9|\t4.0|\tfrom NNW|\t9.3|\t",
    "2024-01-15T08:35:00|\t47.62|\t-122.26|\tY",
);

/// One scripted reply from the stub feed.
enum ScriptedReply {
    Payload(&'static str),
    Status(u16),
    /// Sleep before answering, to trip the client timeout.
    Stall(Duration),
}

/// Start a stub feed on an ephemeral port that answers each request with
/// the next scripted reply, then exits. Returns the feed URL and the
/// server thread handle.
fn spawn_stub_feed(script: Vec<ScriptedReply>) -> (String, thread::JoinHandle<()>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("stub feed should bind");
    let port = server
        .server_addr()
        .to_ip()
        .expect("stub feed listens on an IP socket")
        .port();

    let handle = thread::spawn(move || {
        for reply in script {
            let request = match server.recv() {
                Ok(r) => r,
                Err(_) => return,
            };
            match reply {
                ScriptedReply::Payload(body) => {
                    let _ = request.respond(tiny_http::Response::from_string(body));
                }
                ScriptedReply::Status(code) => {
                    let response = tiny_http::Response::from_string("upstream error")
                        .with_status_code(tiny_http::StatusCode(code));
                    let _ = request.respond(response);
                }
                ScriptedReply::Stall(delay) => {
                    thread::sleep(delay);
                    let _ = request.respond(tiny_http::Response::from_string(""));
                }
            }
        }
    });

    (
        format!("http://127.0.0.1:{}/GenerateMapData.aspx", port),
        handle,
    )
}

fn coordinator_for(feed_url: String) -> BuoyCoordinator {
    BuoyCoordinator::new(
        reqwest::blocking::Client::new(),
        feed_url,
        Duration::from_secs(5),
    )
}

// ---------------------------------------------------------------------------
// 1. Initial Refresh
// ---------------------------------------------------------------------------

#[test]
fn test_initial_refresh_populates_snapshot_from_feed() {
    let (url, feed) = spawn_stub_feed(vec![ScriptedReply::Payload(TWO_LAKES)]);
    let coordinator = coordinator_for(url);

    let result = coordinator.initial_refresh();
    assert!(result.is_ok(), "initial refresh should succeed: {:?}", result);

    let snapshot = coordinator
        .snapshot()
        .expect("successful initial refresh should install a snapshot");
    assert_eq!(snapshot.len(), 2, "both buoy entries should parse");

    let washington = snapshot
        .get("Lake Washington")
        .expect("keys carry the Lake prefix");
    assert_eq!(washington.air_temperature_c, 7.2);
    assert_eq!(washington.wind_direction, "NW");

    assert!(coordinator.last_cycle_successful());
    assert!(coordinator.last_error().is_none());

    feed.join().expect("stub feed thread should exit");
}

#[test]
fn test_initial_refresh_failure_leaves_no_snapshot() {
    let (url, feed) = spawn_stub_feed(vec![ScriptedReply::Status(500)]);
    let coordinator = coordinator_for(url);

    let result = coordinator.initial_refresh();
    assert!(
        matches!(result, Err(FeedError::HttpStatus(500))),
        "a 500 from the feed should fail setup, got {:?}",
        result
    );

    assert!(
        coordinator.snapshot().is_none(),
        "no snapshot may exist until a cycle succeeds"
    );
    assert!(!coordinator.last_cycle_successful());

    feed.join().expect("stub feed thread should exit");
}

// ---------------------------------------------------------------------------
// 2. Snapshot Preservation Across Outages
// ---------------------------------------------------------------------------

#[test]
fn test_feed_outage_preserves_last_known_good_snapshot() {
    let (url, feed) = spawn_stub_feed(vec![
        ScriptedReply::Payload(TWO_LAKES),
        ScriptedReply::Status(500),
    ]);
    let coordinator = coordinator_for(url);

    coordinator.refresh().expect("first cycle should succeed");
    let before = coordinator.snapshot().expect("snapshot after first cycle");

    let result = coordinator.refresh();
    assert!(result.is_err(), "second cycle should fail on the 500");

    let after = coordinator
        .snapshot()
        .expect("snapshot must survive a failed cycle");
    assert!(
        Arc::ptr_eq(&before, &after),
        "failed cycle must leave the cached snapshot untouched"
    );
    assert_eq!(after.len(), 2, "stale data still has both lakes");

    assert!(!coordinator.last_cycle_successful());
    assert!(
        matches!(coordinator.last_error(), Some(FeedError::HttpStatus(500))),
        "error status should be recorded, got {:?}",
        coordinator.last_error()
    );

    feed.join().expect("stub feed thread should exit");
}

#[test]
fn test_timeout_classifies_and_preserves_snapshot() {
    let (url, feed) = spawn_stub_feed(vec![
        ScriptedReply::Payload(TWO_LAKES),
        ScriptedReply::Stall(Duration::from_secs(2)),
    ]);
    // Short client timeout so the stalled reply trips it quickly.
    let coordinator = BuoyCoordinator::new(
        reqwest::blocking::Client::new(),
        url,
        Duration::from_millis(200),
    );

    coordinator.refresh().expect("first cycle should succeed");

    let result = coordinator.refresh();
    assert!(
        matches!(result, Err(FeedError::Timeout)),
        "stalled feed should classify as timeout, got {:?}",
        result
    );

    let snapshot = coordinator
        .snapshot()
        .expect("snapshot must survive the timeout");
    assert_eq!(snapshot.len(), 2);

    feed.join().expect("stub feed thread should exit");
}

#[test]
fn test_connection_refused_classifies_as_transport() {
    // Port 1 on loopback has no listener, so connects are refused at once.
    let coordinator = BuoyCoordinator::new(
        reqwest::blocking::Client::new(),
        "http://127.0.0.1:1/GenerateMapData.aspx".to_string(),
        Duration::from_secs(2),
    );

    let result = coordinator.refresh();
    assert!(
        matches!(result, Err(FeedError::Transport(_))),
        "refused connection should classify as transport, got {:?}",
        result
    );
}

// ---------------------------------------------------------------------------
// 3. Empty Payload Handling
// ---------------------------------------------------------------------------

#[test]
fn test_empty_feed_response_is_success_not_failure() {
    let (url, feed) = spawn_stub_feed(vec![
        ScriptedReply::Payload(TWO_LAKES),
        ScriptedReply::Payload(""),
    ]);
    let coordinator = coordinator_for(url);

    coordinator.refresh().expect("first cycle should succeed");
    assert_eq!(coordinator.snapshot().expect("snapshot").len(), 2);

    // A 200 with no buoy entries is a truthful answer, not an outage. The
    // cached snapshot is replaced by the empty one.
    coordinator
        .refresh()
        .expect("empty payload should still be a successful cycle");

    let snapshot = coordinator.snapshot().expect("empty snapshot is installed");
    assert!(snapshot.is_empty(), "empty payload replaces the old data");
    assert!(coordinator.last_cycle_successful());
    assert!(coordinator.last_error().is_none());

    feed.join().expect("stub feed thread should exit");
}

// ---------------------------------------------------------------------------
// 4. Subscriber Notification Over Real Cycles
// ---------------------------------------------------------------------------

#[test]
fn test_subscribers_notified_once_per_cycle_either_outcome() {
    let (url, feed) = spawn_stub_feed(vec![
        ScriptedReply::Payload(TWO_LAKES),
        ScriptedReply::Status(503),
    ]);
    let coordinator = coordinator_for(url);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    coordinator.subscribe(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(
        calls.load(Ordering::SeqCst),
        0,
        "no catch-up before the first snapshot exists"
    );

    coordinator.refresh().expect("first cycle should succeed");
    assert_eq!(calls.load(Ordering::SeqCst), 1, "one notification per cycle");

    let _ = coordinator.refresh();
    assert_eq!(
        calls.load(Ordering::SeqCst),
        2,
        "failed cycles notify subscribers too"
    );

    feed.join().expect("stub feed thread should exit");
}

#[test]
fn test_late_subscriber_catches_up_after_first_cycle() {
    let (url, feed) = spawn_stub_feed(vec![ScriptedReply::Payload(TWO_LAKES)]);
    let coordinator = coordinator_for(url);

    coordinator.refresh().expect("cycle should succeed");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    coordinator.subscribe(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(
        calls.load(Ordering::SeqCst),
        1,
        "subscriber registered after data arrived should be told immediately"
    );

    feed.join().expect("stub feed thread should exit");
}

// ---------------------------------------------------------------------------
// 5. Concurrent Readers During a Swap
// ---------------------------------------------------------------------------

#[test]
fn test_reader_holding_snapshot_keeps_consistent_view_across_refresh() {
    let (url, feed) = spawn_stub_feed(vec![
        ScriptedReply::Payload(TWO_LAKES),
        ScriptedReply::Payload(ONE_LAKE_LATER),
    ]);
    let coordinator = coordinator_for(url);

    coordinator.refresh().expect("first cycle should succeed");
    let held = coordinator.snapshot().expect("reader takes the snapshot");

    coordinator.refresh().expect("second cycle should succeed");
    let current = coordinator.snapshot().expect("snapshot after swap");

    assert!(
        !Arc::ptr_eq(&held, &current),
        "a successful cycle installs a fresh snapshot"
    );

    // The held snapshot is exactly what the reader saw at acquisition time.
    assert_eq!(held.len(), 2);
    assert_eq!(held["Lake Washington"].air_temperature_c, 7.2);

    // The current snapshot reflects the newer payload.
    assert_eq!(current.len(), 1);
    assert_eq!(current["Lake Washington"].air_temperature_c, 7.9);
    assert_eq!(current["Lake Washington"].wind_direction, "NNW");

    feed.join().expect("stub feed thread should exit");
}

// ---------------------------------------------------------------------------
// 6. HTTP Query Endpoint
// ---------------------------------------------------------------------------

/// Bind the query endpoint on an ephemeral port against the given
/// coordinator. The server thread runs until the process exits.
fn spawn_endpoint(coordinator: Arc<BuoyCoordinator>) -> u16 {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("endpoint should bind");
    let port = server
        .server_addr()
        .to_ip()
        .expect("endpoint listens on an IP socket")
        .port();
    thread::spawn(move || endpoint::run_server(server, coordinator));
    port
}

fn get_json(url: &str) -> (reqwest::StatusCode, serde_json::Value) {
    let response = reqwest::blocking::get(url).expect("endpoint request should succeed");
    let status = response.status();
    let body = response.json().expect("endpoint responses are JSON");
    (status, body)
}

#[test]
fn test_endpoint_serves_health_listing_and_detail() {
    let (url, feed) = spawn_stub_feed(vec![ScriptedReply::Payload(TWO_LAKES)]);
    let coordinator = Arc::new(coordinator_for(url));
    coordinator.refresh().expect("cycle should succeed");

    let port = spawn_endpoint(Arc::clone(&coordinator));

    // Health reflects a healthy coordinator.
    let (status, health) = get_json(&format!("http://127.0.0.1:{}/health", port));
    assert_eq!(status.as_u16(), 200);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["lake_count"], 2);
    assert_eq!(health["last_cycle_successful"], true);

    // Listing returns sorted lake names plus attribution.
    let (status, listing) = get_json(&format!("http://127.0.0.1:{}/lakes", port));
    assert_eq!(status.as_u16(), 200);
    let lakes = listing["lakes"].as_array().expect("lakes is an array");
    assert_eq!(lakes.len(), 2);
    assert_eq!(lakes[0], "Lake Sammamish");
    assert_eq!(lakes[1], "Lake Washington");
    assert!(listing["attribution"]
        .as_str()
        .expect("attribution is a string")
        .contains("King County"));

    // Detail renders every catalog field, with spaces percent-encoded in
    // the request path.
    let (status, detail) = get_json(&format!("http://127.0.0.1:{}/lakes/Lake%20Washington", port));
    assert_eq!(status.as_u16(), 200);
    assert_eq!(detail["lake"], "Lake Washington");
    let fields = detail["fields"].as_array().expect("fields is an array");
    assert_eq!(fields.len(), 8);
    let air = fields
        .iter()
        .find(|f| f["key"] == "air_temperature")
        .expect("air temperature field present");
    assert_eq!(air["value"], 7.2);
    assert_eq!(air["unit"], "°C");

    feed.join().expect("stub feed thread should exit");
}

#[test]
fn test_endpoint_unknown_lake_returns_404_with_known_names() {
    let (url, feed) = spawn_stub_feed(vec![ScriptedReply::Payload(TWO_LAKES)]);
    let coordinator = Arc::new(coordinator_for(url));
    coordinator.refresh().expect("cycle should succeed");

    let port = spawn_endpoint(Arc::clone(&coordinator));

    let (status, body) = get_json(&format!("http://127.0.0.1:{}/lakes/Lake%20Nowhere", port));
    assert_eq!(status.as_u16(), 404);
    let known = body["known_lakes"].as_array().expect("known_lakes listed");
    assert_eq!(known.len(), 2);

    feed.join().expect("stub feed thread should exit");
}

#[test]
fn test_endpoint_reports_down_before_any_data() {
    // Coordinator that has never completed a cycle.
    let coordinator = Arc::new(BuoyCoordinator::new(
        reqwest::blocking::Client::new(),
        "http://127.0.0.1:1/GenerateMapData.aspx".to_string(),
        Duration::from_secs(2),
    ));
    let port = spawn_endpoint(Arc::clone(&coordinator));

    let (status, health) = get_json(&format!("http://127.0.0.1:{}/health", port));
    assert_eq!(status.as_u16(), 200);
    assert_eq!(health["status"], "down");
    assert_eq!(health["lake_count"], 0);

    let (status, _) = get_json(&format!("http://127.0.0.1:{}/lakes/Lake%20Washington", port));
    assert_eq!(
        status.as_u16(),
        503,
        "lake queries before the first snapshot should say unavailable"
    );
}
