/// Polling coordinator for the lake buoy feed
///
/// This module owns the refresh cycle that:
/// 1. Fetches the raw map-data payload (single attempt, timeout-bounded)
/// 2. Parses it into a per-lake snapshot
/// 3. Atomically replaces the cached "last known good" snapshot on success
/// 4. Records the failure and keeps the previous snapshot on any error
/// 5. Notifies every subscriber exactly once per cycle, either way
///
/// The snapshot lives behind a mutex that is held only for the pointer swap,
/// never across the network call. The stored value is an `Arc`, so a reader
/// holding the previous snapshot keeps a fully consistent view while a
/// refresh replaces it underneath.

use crate::ingest::kingcounty;
use crate::model::{FeedError, LakeSnapshot};
use crate::subscribers::{SubscriberCallback, SubscriberHandle, SubscriberRegistry};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Cycle state
// ---------------------------------------------------------------------------

/// Everything a refresh cycle is allowed to change, under one lock.
struct CycleState {
    /// Last successfully parsed snapshot. None until the first success.
    snapshot: Option<Arc<LakeSnapshot>>,
    /// Whether the most recent cycle succeeded.
    last_cycle_ok: bool,
    /// Error from the most recent failed cycle, for logs and the endpoint.
    last_error: Option<FeedError>,
    /// When the snapshot was last replaced.
    last_success_time: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Single-instance coordinator between the feed and all consumers.
///
/// The daemon drives `refresh` on its schedule; consumers read through
/// `snapshot` and friends and register callbacks with `subscribe`. The
/// coordinator is the sole writer of the snapshot.
pub struct BuoyCoordinator {
    client: reqwest::blocking::Client,
    feed_url: String,
    fetch_timeout: std::time::Duration,
    state: Mutex<CycleState>,
    subscribers: Mutex<SubscriberRegistry>,
}

impl BuoyCoordinator {
    /// The client is built by the caller and may be shared; every request
    /// applies `fetch_timeout` individually.
    pub fn new(
        client: reqwest::blocking::Client,
        feed_url: String,
        fetch_timeout: std::time::Duration,
    ) -> Self {
        Self {
            client,
            feed_url,
            fetch_timeout,
            state: Mutex::new(CycleState {
                snapshot: None,
                last_cycle_ok: false,
                last_error: None,
                last_success_time: None,
            }),
            subscribers: Mutex::new(SubscriberRegistry::new()),
        }
    }

    // -----------------------------------------------------------------------
    // Refresh cycle
    // -----------------------------------------------------------------------

    /// Run one complete refresh cycle.
    ///
    /// On success the snapshot is replaced, even by an empty one — a feed
    /// that answers with no valid buoys is telling the truth, not failing.
    /// On failure the previous snapshot stays untouched and the error is
    /// recorded. Subscribers are notified exactly once in both cases, after
    /// the cycle's state is committed.
    pub fn refresh(&self) -> Result<(), FeedError> {
        let fetched = kingcounty::fetch_map_data(&self.client, &self.feed_url, self.fetch_timeout);

        let outcome = match fetched {
            Ok(raw) => {
                let parsed = kingcounty::parse_map_data(&raw);
                let mut state = self.state.lock().unwrap();
                state.snapshot = Some(Arc::new(parsed));
                state.last_cycle_ok = true;
                state.last_error = None;
                state.last_success_time = Some(Utc::now());
                Ok(())
            }
            Err(err) => {
                let mut state = self.state.lock().unwrap();
                state.last_cycle_ok = false;
                state.last_error = Some(err.clone());
                Err(err)
            }
        };

        self.notify_all();
        outcome
    }

    /// The mandatory first cycle, run synchronously during setup.
    ///
    /// Unlike scheduled cycles, a failure here propagates to the caller:
    /// a service that cannot reach the feed once should not come up.
    pub fn initial_refresh(&self) -> Result<(), FeedError> {
        self.refresh()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The last known good snapshot, or None before the first success.
    ///
    /// The returned `Arc` stays valid and internally consistent no matter
    /// how many refreshes happen after this call.
    pub fn snapshot(&self) -> Option<Arc<LakeSnapshot>> {
        self.state.lock().unwrap().snapshot.clone()
    }

    /// Whether the most recent completed cycle succeeded.
    pub fn last_cycle_successful(&self) -> bool {
        self.state.lock().unwrap().last_cycle_ok
    }

    /// The most recent cycle's error, if it failed.
    pub fn last_error(&self) -> Option<FeedError> {
        self.state.lock().unwrap().last_error.clone()
    }

    pub fn last_success_time(&self) -> Option<DateTime<Utc>> {
        self.state.lock().unwrap().last_success_time
    }

    /// Age of the current snapshot as of `now`. None before the first
    /// success.
    pub fn snapshot_age_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_success_time().map(|t| now - t)
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register for cycle notifications.
    ///
    /// If a snapshot already exists the callback is invoked once right away,
    /// so a consumer created after data arrived does not sit dark until the
    /// next cycle. The catch-up call happens with no locks held.
    pub fn subscribe(&self, callback: SubscriberCallback) -> SubscriberHandle {
        let handle = {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.register(Arc::clone(&callback))
        };

        if self.snapshot().is_some() {
            callback();
        }

        handle
    }

    /// Remove a subscription. Safe to call twice, and safe from inside a
    /// callback during delivery.
    pub fn unsubscribe(&self, handle: SubscriberHandle) {
        self.subscribers.lock().unwrap().remove(handle);
    }

    /// Invoke every subscriber, in registration order.
    ///
    /// The callback list is copied out under the lock and invoked after it
    /// is released, so callbacks may subscribe or unsubscribe re-entrantly.
    pub fn notify_all(&self) {
        let callbacks = {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers.callbacks()
        };

        for callback in callbacks {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Drop all subscriptions. The snapshot is left in place for any reader
    /// still holding it.
    pub fn teardown(&self) {
        self.subscribers.lock().unwrap().clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
