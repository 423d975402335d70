/// Core daemon implementation for the buoy monitoring service
///
/// This module implements the main daemon loop that:
/// 1. Runs one refresh cycle per tick through the coordinator
/// 2. Logs cycle failures without ever aborting the loop
/// 3. Sleeps out the remainder of the poll interval
/// 4. Stops promptly when the shutdown signal fires
///
/// Cycles never overlap: a cycle that outlives its interval simply eats the
/// missed tick, and the next cycle starts immediately. There is no queue of
/// pending ticks to drain.

use crate::coordinator::BuoyCoordinator;
use crate::logging::{self, DataSource};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Stop signal
// ---------------------------------------------------------------------------

/// Condvar-backed shutdown flag.
///
/// The daemon parks on this between cycles instead of a plain sleep, so a
/// stop request cuts the wait short instead of letting the process linger
/// for up to a full poll interval.
pub struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            stopped: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Request shutdown. Safe from any thread, idempotent.
    pub fn stop(&self) {
        *self.stopped.lock().unwrap() = true;
        self.condvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap()
    }

    /// Park for up to `timeout`. Returns true if shutdown was requested,
    /// false if the timeout ran out first.
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self.stopped.lock().unwrap();

        while !*stopped {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) => remaining,
                None => return false,
            };
            let (guard, _) = self.condvar.wait_timeout(stopped, remaining).unwrap();
            stopped = guard;
        }

        true
    }
}

// ---------------------------------------------------------------------------
// Daemon
// ---------------------------------------------------------------------------

/// Cloneable handle for stopping a running daemon from another thread.
#[derive(Clone)]
pub struct DaemonHandle {
    stop: Arc<StopSignal>,
}

impl DaemonHandle {
    pub fn stop(&self) {
        self.stop.stop();
    }
}

/// Drives the coordinator on a fixed schedule.
pub struct Daemon {
    coordinator: Arc<BuoyCoordinator>,
    poll_interval: Duration,
    stop: Arc<StopSignal>,
}

impl Daemon {
    pub fn new(coordinator: Arc<BuoyCoordinator>, poll_interval: Duration) -> Self {
        Self {
            coordinator,
            poll_interval,
            stop: Arc::new(StopSignal::new()),
        }
    }

    /// Handle for requesting shutdown; grab it before calling `run`.
    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Main daemon loop. Runs until the stop signal fires.
    ///
    /// The setup path has already run the initial refresh, so every cycle
    /// here is a scheduled one: failures are logged and the previous
    /// snapshot keeps serving until the next tick.
    pub fn run(&self) {
        logging::info(
            DataSource::System,
            None,
            &format!(
                "Daemon loop started, polling every {} seconds",
                self.poll_interval.as_secs()
            ),
        );

        while !self.stop.is_stopped() {
            let cycle_start = Instant::now();

            match self.coordinator.refresh() {
                Ok(()) => {
                    let lake_count = self.coordinator.snapshot().map(|s| s.len()).unwrap_or(0);
                    logging::debug(
                        DataSource::Feed,
                        None,
                        &format!("Cycle complete: {} lakes", lake_count),
                    );
                }
                Err(e) => {
                    logging::log_feed_failure("Refresh cycle", &e);
                }
            }

            // Sleep out the rest of the interval; an over-long cycle gets
            // no make-up tick.
            let elapsed = cycle_start.elapsed();
            let sleep_for = self.poll_interval.saturating_sub(elapsed);

            if self.stop.wait(sleep_for) {
                break;
            }
        }

        logging::info(DataSource::System, None, "Daemon loop stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
