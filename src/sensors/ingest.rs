//! Sensor ingest: payload decoding and the bounded hand-off to storage.
//!
//! The message client delivers raw `(topic, payload)` pairs on its own
//! thread.  Each is decoded into a [`SensorReading`] and pushed into an
//! [`IngestQueue`]; the [`IngestWorker`] drains the queue on a dedicated
//! thread and writes readings into persistence.  Delivery cadence is
//! therefore decoupled from the control cycle's polling cadence.
//!
//! ```text
//! ┌─────────────┐  try_push  ┌──────────────┐  record   ┌─────────────┐
//! │ MQTT client │──────────▶│ IngestQueue  │─────────▶│ Persistence │
//! │  callback   │            │ (bounded)    │  worker   │             │
//! └─────────────┘            └──────────────┘           └─────────────┘
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};
use serde::Deserialize;

use super::SensorReading;
use crate::app::ports::PersistencePort;
use crate::config::{TopicRoute, TopicRoutes};
use crate::error::IngestError;

/// Channel depth for pending readings.
pub const INGEST_QUEUE_DEPTH: usize = 32;

// ── Decoding ──────────────────────────────────────────────────

/// A decoded sensor message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Reading(SensorReading),
    /// The bin's button was pressed.  Logged, never evaluated.
    ButtonPress,
}

#[derive(Deserialize)]
struct MeasurementBody {
    value: Option<serde_json::Number>,
    sensor_ip: Option<String>,
}

#[derive(Deserialize)]
struct ButtonBody {
    button: Option<String>,
}

/// Decode one message body received on `topic`.
///
/// Measurements look like `{"value": 42, "sensor_ip": "fd00::2"}`; a
/// fractional value is truncated toward zero.  Button topics carry
/// `{"button": "pressed"}`.
pub fn decode_payload(
    topic: &str,
    payload: &[u8],
    routes: &TopicRoutes,
    now: u64,
) -> Result<Delivery, IngestError> {
    let route = routes.get(topic).ok_or(IngestError::UnknownTopic)?;
    match *route {
        TopicRoute::Button => {
            let body: ButtonBody =
                serde_json::from_slice(payload).map_err(|_| IngestError::MalformedPayload)?;
            match body.button.as_deref() {
                Some(s) if s.eq_ignore_ascii_case("pressed") => Ok(Delivery::ButtonPress),
                _ => Err(IngestError::MalformedPayload),
            }
        }
        TopicRoute::Sensor(kind) => {
            let body: MeasurementBody =
                serde_json::from_slice(payload).map_err(|_| IngestError::MalformedPayload)?;
            let number = body.value.ok_or(IngestError::MalformedPayload)?;
            let value = number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64))
                .ok_or(IngestError::MalformedPayload)?;
            let mut reading = SensorReading::new(kind, value, now);
            if let Some(ip) = body.sensor_ip.as_deref().filter(|ip| !ip.is_empty()) {
                reading = reading.with_source(ip);
            }
            Ok(Delivery::Reading(reading))
        }
    }
}

// ── Queue ─────────────────────────────────────────────────────

enum IngestMsg {
    Reading(SensorReading),
    Shutdown,
}

/// Bounded hand-off from the delivery thread to the ingest worker.
pub struct IngestQueue {
    channel: Channel<CriticalSectionRawMutex, IngestMsg, INGEST_QUEUE_DEPTH>,
}

impl IngestQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking.  A full queue drops the reading.
    pub fn try_push(&self, reading: SensorReading) -> Result<(), IngestError> {
        self.channel
            .try_send(IngestMsg::Reading(reading))
            .map_err(|_| {
                warn!("Ingest: queue full, dropping reading");
                IngestError::QueueFull
            })
    }

    /// Number of readings waiting.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Ask the worker to stop once it has drained what is already queued.
    /// Blocks while the queue is full.
    pub fn close(&self) {
        futures_lite::future::block_on(self.channel.send(IngestMsg::Shutdown));
    }

    fn receive(&self) -> IngestMsg {
        futures_lite::future::block_on(self.channel.receive())
    }
}

impl Default for IngestQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ── Worker ────────────────────────────────────────────────────

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub stored: u64,
    pub failed: u64,
}

pub struct IngestWorker;

impl IngestWorker {
    /// Spawn the consumer thread.  It runs until [`IngestQueue::close`].
    pub fn spawn<P>(
        queue: Arc<IngestQueue>,
        store: Arc<P>,
    ) -> std::io::Result<JoinHandle<IngestStats>>
    where
        P: PersistencePort + 'static,
    {
        info!("Spawning 'ingest' worker (depth {})", INGEST_QUEUE_DEPTH);
        std::thread::Builder::new()
            .name("ingest".into())
            .spawn(move || Self::run(&queue, store.as_ref()))
    }

    /// Drain `queue` into `store` until a shutdown marker arrives.
    pub fn run<P: PersistencePort + ?Sized>(queue: &IngestQueue, store: &P) -> IngestStats {
        let mut stats = IngestStats::default();
        loop {
            match queue.receive() {
                IngestMsg::Reading(reading) => match store.record_reading(&reading) {
                    Ok(()) => {
                        stats.stored += 1;
                        debug!(
                            "Ingest: stored {}={} from {:?}",
                            reading.kind, reading.value, reading.source_address
                        );
                    }
                    Err(e) => {
                        stats.failed += 1;
                        warn!("Ingest: {} reading not stored, {}", reading.kind, e);
                    }
                },
                IngestMsg::Shutdown => break,
            }
        }
        info!(
            "Ingest: worker stopped ({} stored, {} failed)",
            stats.stored, stats.failed
        );
        stats
    }
}
