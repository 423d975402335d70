//! Lake Buoy Monitoring Service - Main Daemon
//!
//! A server-side daemon that continuously:
//! 1. Polls the King County lake buoy feed on a fixed interval
//! 2. Parses the delimited payload into per-lake observations
//! 3. Caches the last known good snapshot across feed failures
//! 4. Notifies subscribers once per cycle
//! 5. Provides an HTTP endpoint for querying the current snapshot
//!
//! The initial refresh runs synchronously: if the feed cannot be reached
//! once at startup, the service refuses to come up.
//!
//! Usage:
//!   cargo run --release                    # Start daemon without HTTP endpoint
//!   cargo run --release -- --endpoint 8080 # Start with HTTP endpoint on port 8080
//!   cargo run --release -- --once          # Single fetch/parse cycle, then exit
//!
//! Environment:
//!   BUOYMON_FEED_URL - Override the feed URL (also honored from .env)

use buoymon_service::config;
use buoymon_service::coordinator::BuoyCoordinator;
use buoymon_service::daemon::Daemon;
use buoymon_service::endpoint;
use buoymon_service::logging::{self, LogLevel};
use std::env;
use std::sync::Arc;

fn main() {
    println!("🌊 Lake Buoy Monitoring Service");
    println!("================================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;
    let mut config_path = config::DEFAULT_CONFIG_PATH.to_string();
    let mut run_once = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                if i + 1 < args.len() {
                    endpoint_port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --endpoint requires a port number");
                    std::process::exit(1);
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
            }
            "--once" => {
                run_once = true;
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--config PATH] [--endpoint PORT] [--once]", args[0]);
                std::process::exit(1);
            }
        }
    }

    dotenv::dotenv().ok();
    logging::init_logger(LogLevel::Info, None, false);

    // Load configuration
    println!("📊 Loading configuration from {}...", config_path);
    let service_config = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ Polling {} every {} seconds\n", service_config.feed_url, service_config.poll_interval_secs);

    // Build the coordinator around a shared HTTP client
    let client = reqwest::blocking::Client::new();
    let coordinator = Arc::new(BuoyCoordinator::new(
        client,
        service_config.feed_url.clone(),
        service_config.fetch_timeout(),
    ));

    // The mandatory first cycle: a service that cannot reach the feed once
    // should not come up at all.
    println!("📡 Running initial refresh...");
    if let Err(e) = coordinator.initial_refresh() {
        eprintln!("\n❌ Initial refresh failed: {}\n", e);
        std::process::exit(1);
    }
    let lake_count = coordinator.snapshot().map(|s| s.len()).unwrap_or(0);
    println!("✓ Initial snapshot holds {} lakes\n", lake_count);

    // Console consumer: one summary line per cycle. Registered after data
    // exists, so the catch-up notification prints the first summary.
    let console_coordinator = Arc::clone(&coordinator);
    coordinator.subscribe(Arc::new(move || {
        if console_coordinator.last_cycle_successful() {
            let lakes = console_coordinator.snapshot().map(|s| s.len()).unwrap_or(0);
            println!("✓ Cycle complete: {} lakes", lakes);
        } else if let Some(err) = console_coordinator.last_error() {
            eprintln!("✗ Cycle failed: {} (serving previous snapshot)", err);
        }
    }));

    if run_once {
        println!("\n--once: single cycle finished, exiting");
        return;
    }

    // Start HTTP endpoint if requested (in background thread)
    let endpoint_port = endpoint_port.or(service_config.endpoint_port);
    if let Some(port) = endpoint_port {
        println!("🚀 Starting HTTP endpoint server...");
        let endpoint_coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || {
            if let Err(e) = endpoint::start_endpoint_server(port, endpoint_coordinator) {
                eprintln!("❌ Endpoint server error: {}", e);
            }
        });
        println!("   Endpoint running on http://0.0.0.0:{}\n", port);
    }

    // Run the main monitoring loop
    println!("🔄 Starting continuous monitoring loop...");
    println!("   Poll interval: {} seconds", service_config.poll_interval_secs);
    println!("   Press Ctrl+C to stop\n");

    let daemon = Daemon::new(coordinator, service_config.poll_interval());
    daemon.run();
}
