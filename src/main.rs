//! SmartBin controller: host entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  MemoryStore        SimTransport        LogEventSink          │
//! │  (Persistence)      (ActuatorTransport) (EventSink)           │
//! │                                                               │
//! │  ─────────────── Port Trait Boundary ───────────────────      │
//! │                                                               │
//! │  ┌───────────────────────────────────────────────────────┐    │
//! │  │           AppService (pure logic)                     │    │
//! │  │  ThresholdRegistry · ActuatorStateCache · ControlCycle│    │
//! │  └───────────────────────────────────────────────────────┘    │
//! │                                                               │
//! │  IngestWorker (queue → store) · Scheduler (timer → cycle)     │
//! │  Console (stdin)                                              │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `smartbin [config.json]`.  Without an argument the built-in
//! defaults are used.  `RUST_LOG` controls verbosity (default `info`).

#![deny(unused_must_use)]

use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use smartbin::adapters::log_sink::LogEventSink;
use smartbin::adapters::memory_store::MemoryStore;
use smartbin::adapters::sim_transport::SimTransport;
use smartbin::adapters::time::unix_secs;
use smartbin::app::service::AppService;
use smartbin::config::{SystemConfig, TopicRoutes};
use smartbin::console::{Console, ConsoleOutput, HELP};
use smartbin::error::Error;
use smartbin::scheduler::Scheduler;
use smartbin::sensors::ingest::{Delivery, IngestQueue, IngestWorker, decode_payload};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== SmartBin controller v{} ===", env!("CARGO_PKG_VERSION"));

    // ── Configuration ─────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => SystemConfig::load(&path)
            .map_err(Error::from)
            .with_context(|| format!("loading {path}"))?,
        None => {
            info!("No configuration file given, using defaults");
            SystemConfig::default()
        }
    };
    config
        .validate()
        .map_err(Error::from)
        .context("invalid configuration")?;

    let period = Duration::from_millis(config.control_period_ms);
    let initial_delay = Duration::from_millis(config.initial_delay_ms);
    let topics = config.device.topic_routes();

    // ── Adapters ──────────────────────────────────────────────
    let store = Arc::new(MemoryStore::new());
    let transport = SimTransport::new(config.device.actuator_routes());
    let sink = Arc::new(LogEventSink::new());

    // ── Core ──────────────────────────────────────────────────
    let app = AppService::new(config, Arc::clone(&store), transport, sink);
    app.register_device().context("registering actuators")?;

    // ── Ingest worker ─────────────────────────────────────────
    let queue = Arc::new(IngestQueue::new());
    let ingest = IngestWorker::spawn(Arc::clone(&queue), Arc::clone(&store))
        .context("spawning ingest worker")?;

    // ── Scheduler ─────────────────────────────────────────────
    let cycle = app.cycle();
    let scheduler = Scheduler::start(period, initial_delay, move || {
        cycle.run();
    })
    .context("starting scheduler")?;

    // ── Console ───────────────────────────────────────────────
    println!("Welcome to the SmartBin management console\n{HELP}");
    let mut console = Console::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", console.prompt());
        std::io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            info!("stdin closed");
            break;
        };
        let line = line.context("reading stdin")?;

        match console.feed(&line, |cmd| app.handle_command(cmd)) {
            ConsoleOutput::Reply(text) if text.is_empty() => {}
            ConsoleOutput::Reply(text) => println!("{}", text.trim_end()),
            ConsoleOutput::Publish { topic, payload } => {
                println!("{}", publish(&queue, &topics, &topic, &payload));
            }
            ConsoleOutput::Quit => break,
        }
    }

    // ── Shutdown ──────────────────────────────────────────────
    let stats = scheduler.shutdown();
    info!(
        "Scheduler stopped: {} fired, {} executed, {} dropped",
        stats.fired, stats.executed, stats.dropped
    );
    queue.close();
    match ingest.join() {
        Ok(s) => info!("Ingest stopped: {} stored, {} failed", s.stored, s.failed),
        Err(_) => warn!("Ingest worker panicked"),
    }
    Ok(())
}

/// Feed one message through the same decode path a broker delivery takes.
fn publish(queue: &IngestQueue, topics: &TopicRoutes, topic: &str, payload: &str) -> String {
    match decode_payload(topic, payload.as_bytes(), topics, unix_secs()) {
        Ok(Delivery::Reading(reading)) => {
            let summary = format!("queued {}={}", reading.kind, reading.value);
            match queue.try_push(reading) {
                Ok(()) => summary,
                Err(e) => format!("dropped: {e}"),
            }
        }
        Ok(Delivery::ButtonPress) => {
            info!("Button pressed on bin");
            "button press logged".to_owned()
        }
        Err(e) => format!("rejected: {e}"),
    }
}
