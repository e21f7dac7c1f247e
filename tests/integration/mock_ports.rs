//! Mock ports for integration tests.
//!
//! Records every transport call and emitted event so tests can assert on
//! the full command history without a CoAP node or a database.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use smartbin::actuators::ActuatorKind;
use smartbin::app::events::AppEvent;
use smartbin::app::ports::{
    ActuatorCommand, ActuatorRecord, ActuatorTransport, EventSink, PersistencePort,
    TransportOutcome,
};
use smartbin::error::StoreError;
use smartbin::sensors::{SensorKind, SensorReading};

// ── Transport ─────────────────────────────────────────────────

/// Transport that records each command and answers from a script.
/// An exhausted script answers `Success`.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<ActuatorCommand>>>,
    replies: Arc<Mutex<VecDeque<TransportOutcome>>>,
}

/// Test-side view of a [`MockTransport`] after it moved into the cycle.
#[derive(Clone)]
pub struct TransportProbe {
    sent: Arc<Mutex<Vec<ActuatorCommand>>>,
    replies: Arc<Mutex<VecDeque<TransportOutcome>>>,
}

#[allow(dead_code)]
impl TransportProbe {
    pub fn sent(&self) -> Vec<ActuatorCommand> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Queue the outcomes of the next calls.
    pub fn script(&self, outcomes: &[TransportOutcome]) {
        self.replies.lock().unwrap().extend(outcomes.iter().copied());
    }
}

pub fn mock_transport() -> (MockTransport, TransportProbe) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let replies = Arc::new(Mutex::new(VecDeque::new()));
    (
        MockTransport {
            sent: Arc::clone(&sent),
            replies: Arc::clone(&replies),
        },
        TransportProbe { sent, replies },
    )
}

impl ActuatorTransport for MockTransport {
    fn send(&mut self, command: &ActuatorCommand) -> TransportOutcome {
        self.sent.lock().unwrap().push(*command);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TransportOutcome::Success)
    }
}

// ── Persistence ───────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    values: [Option<i64>; 3],
    down: [bool; 3],
    rows: [Option<ActuatorRecord>; 3],
}

/// Persistence with per-sensor outage switches.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<StoreState>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, sensor: SensorKind, value: i64) {
        self.state.lock().unwrap().values[sensor.index()] = Some(value);
    }

    pub fn set_down(&self, sensor: SensorKind, down: bool) {
        self.state.lock().unwrap().down[sensor.index()] = down;
    }

    pub fn row(&self, kind: ActuatorKind) -> Option<ActuatorRecord> {
        self.state.lock().unwrap().rows[kind.index()].clone()
    }
}

impl PersistencePort for MockStore {
    fn latest_value(&self, kind: SensorKind) -> Result<Option<i64>, StoreError> {
        let s = self.state.lock().unwrap();
        if s.down[kind.index()] {
            return Err(StoreError::Unavailable);
        }
        Ok(s.values[kind.index()])
    }

    fn record_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        self.set(reading.kind, reading.value);
        Ok(())
    }

    fn actuator_record(&self, kind: ActuatorKind) -> Result<Option<ActuatorRecord>, StoreError> {
        Ok(self.row(kind))
    }

    fn set_actuator_state(
        &self,
        address: &str,
        kind: ActuatorKind,
        active: bool,
    ) -> Result<u64, StoreError> {
        let mut s = self.state.lock().unwrap();
        match s.rows[kind.index()].as_mut() {
            Some(row) if row.address == address => {
                row.active = active;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn register_actuator(&self, address: &str, kind: ActuatorKind) -> Result<u64, StoreError> {
        self.state.lock().unwrap().rows[kind.index()] = Some(ActuatorRecord {
            address: address.to_owned(),
            active: false,
        });
        Ok(1)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AppEvent>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
