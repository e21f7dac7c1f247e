//! Control cycle: one evaluation pass over every monitored sensor.
//!
//! ```text
//!  PersistencePort ──▶ latest value ─┐
//!  ThresholdRegistry ─▶ band ────────┼─▶ evaluate ─▶ Decision
//!  ActuatorStateCache ▶ committed ───┘                 │
//!                                                      ▼
//!                     ActuatorTransport ◀── Activate / Deactivate
//!                            │ Success
//!                            ▼
//!              cache.commit ─▶ persistence (best effort)
//! ```
//!
//! Failures are isolated per key: nothing that happens while evaluating
//! one sensor stops the pass for the others.
//!
//! All actuation (periodic and manual) goes through one lane guarded by
//! a mutex, so two commands are never in flight at the same time and an
//! activate is always sent before a later deactivate for the same key.

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error, info, warn};

use crate::actuators::{ActuatorKind, ActuatorStateCache};
use crate::adapters::time::unix_secs;
use crate::app::events::{AppEvent, Origin};
use crate::app::ports::{ActuatorCommand, ActuatorTransport, EventSink, PersistencePort};
use crate::control::hysteresis::{self, Decision};
use crate::control::thresholds::ThresholdRegistry;
use crate::error::{ActuationError, ConfigError, Error, StoreError};
use crate::sensors::SensorKind;

// ───────────────────────────────────────────────────────────────
// Report
// ───────────────────────────────────────────────────────────────

/// What happened to one key during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No reading yet.
    NoData,
    /// Persistence could not be read.
    StoreUnavailable,
    /// Decision was `NoChange`.
    Unchanged,
    /// A change was due but the device already refused this request and
    /// the band has not changed since.
    Suppressed,
    /// Transport succeeded and the state was committed.
    Committed { active: bool },
    /// Transport failed; nothing committed.
    Failed,
    /// Device refused the request.
    Rejected,
}

/// Per-key outcomes of one pass, in evaluation order.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    entries: heapless::Vec<(SensorKind, KeyOutcome), 3>,
}

impl CycleReport {
    pub fn outcome(&self, sensor: SensorKind) -> Option<KeyOutcome> {
        self.entries
            .iter()
            .find(|(k, _)| *k == sensor)
            .map(|(_, o)| *o)
    }

    pub fn entries(&self) -> &[(SensorKind, KeyOutcome)] {
        &self.entries
    }

    /// Number of transport calls made during the pass.
    pub fn commands_sent(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    KeyOutcome::Committed { .. } | KeyOutcome::Failed | KeyOutcome::Rejected
                )
            })
            .count()
    }
}

// ───────────────────────────────────────────────────────────────
// ControlCycle
// ───────────────────────────────────────────────────────────────

/// Actuation lane: the transport plus the memory of rejected requests.
struct Lane<T> {
    transport: T,
    /// Threshold revision at which the device last rejected a command
    /// for each sensor's actuator.
    rejected_at: [Option<u64>; 3],
}

pub struct ControlCycle<P, T, S> {
    thresholds: Arc<ThresholdRegistry>,
    actuators: Arc<ActuatorStateCache>,
    store: Arc<P>,
    sink: Arc<S>,
    lane: Mutex<Lane<T>>,
}

impl<P, T, S> ControlCycle<P, T, S>
where
    P: PersistencePort,
    T: ActuatorTransport,
    S: EventSink,
{
    pub fn new(
        thresholds: Arc<ThresholdRegistry>,
        actuators: Arc<ActuatorStateCache>,
        store: Arc<P>,
        transport: T,
        sink: Arc<S>,
    ) -> Self {
        Self {
            thresholds,
            actuators,
            store,
            sink,
            lane: Mutex::new(Lane {
                transport,
                rejected_at: [None; 3],
            }),
        }
    }

    /// Run one pass over fill level, temperature and humidity, in that order.
    pub fn run(&self) -> CycleReport {
        let mut lane = self.lock_lane();
        let mut report = CycleReport::default();

        for sensor in SensorKind::ALL {
            let outcome = self.evaluate_key(&mut lane, sensor);
            // Capacity equals SensorKind::ALL.len().
            let _ = report.entries.push((sensor, outcome));
        }

        let commands_sent = report.commands_sent();
        debug!("Cycle: done ({} command(s) sent)", commands_sent);
        self.sink.emit(&AppEvent::CycleCompleted { commands_sent });
        report
    }

    /// Drive `actuator` straight to `active`, skipping evaluation.
    ///
    /// Uses the same transport-and-commit path as the cycle, so the
    /// committed state only changes on a successful response.  Waits for
    /// an in-flight cycle's transport call to return before sending.
    pub fn trigger(&self, actuator: ActuatorKind, active: bool) -> Result<(), ActuationError> {
        let mut lane = self.lock_lane();
        info!("Manual trigger: {} -> {}", actuator, on_off(active));
        let outcome = self.actuate(&mut lane, actuator, active, None, Origin::Manual);
        match outcome {
            KeyOutcome::Committed { .. } => {
                // A successful manual command proves the request shape is
                // fine again for every sensor driving this actuator.
                for sensor in SensorKind::ALL {
                    if sensor.actuator() == actuator {
                        lane.rejected_at[sensor.index()] = None;
                    }
                }
                Ok(())
            }
            KeyOutcome::Rejected => Err(ActuationError::TransportRejected),
            _ => Err(ActuationError::TransportFailure),
        }
    }

    /// An actuator node announced itself at `address`.
    ///
    /// Nodes boot with their actuators off, so the committed state is
    /// reset to inactive once the row is stored.
    pub fn register(&self, actuator: ActuatorKind, address: &str) -> Result<(), Error> {
        if address.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("actuator address must not be empty").into());
        }
        let _lane = self.lock_lane();
        let rows = self.store.register_actuator(address, actuator)?;
        if rows == 0 {
            warn!("Registration: {} at {} stored no row", actuator, address);
        }
        self.actuators.commit(actuator, false, unix_secs());
        info!("Registration: {} at {} (inactive)", actuator, address);
        self.sink.emit(&AppEvent::ActuatorRegistered {
            kind: actuator,
            address: address.to_owned(),
        });
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────

    fn evaluate_key(&self, lane: &mut Lane<T>, sensor: SensorKind) -> KeyOutcome {
        let value = match self.store.latest_value(sensor) {
            Ok(Some(v)) => v,
            Ok(None) => {
                debug!("Cycle: {} has no reading yet", sensor);
                return KeyOutcome::NoData;
            }
            Err(e) => {
                warn!("Cycle: {} skipped, {}", sensor, e);
                self.sink.emit(&AppEvent::KeySkipped { sensor });
                return KeyOutcome::StoreUnavailable;
            }
        };

        let bounds = self.thresholds.get(sensor);
        let actuator = sensor.actuator();
        let active = self.actuators.current(actuator);

        let decision = hysteresis::evaluate(actuator, Some(value), &bounds, active);
        let Some((actuator, target)) = decision.target() else {
            return KeyOutcome::Unchanged;
        };

        let revision = self.thresholds.revision(sensor);
        if lane.rejected_at[sensor.index()] == Some(revision) {
            debug!(
                "Cycle: {} change suppressed, device rejected it at revision {}",
                sensor, revision
            );
            return KeyOutcome::Suppressed;
        }

        info!(
            "Cycle: {}={} band=[{:?}, {:?}] -> {} {}",
            sensor,
            value,
            bounds.min,
            bounds.max,
            if matches!(decision, Decision::Activate(_)) { "activate" } else { "deactivate" },
            actuator
        );
        let threshold = target.then_some(value);
        let outcome = self.actuate(lane, actuator, target, threshold, Origin::Threshold);
        if outcome == KeyOutcome::Rejected {
            lane.rejected_at[sensor.index()] = Some(revision);
        }
        outcome
    }

    fn actuate(
        &self,
        lane: &mut Lane<T>,
        kind: ActuatorKind,
        active: bool,
        threshold: Option<i64>,
        origin: Origin,
    ) -> KeyOutcome {
        let command = ActuatorCommand {
            kind,
            action: active,
            threshold,
        };
        let outcome = lane.transport.send(&command);
        match outcome.into_result() {
            Ok(()) => {
                self.actuators.commit(kind, active, unix_secs());
                info!("Actuator {} committed {}", kind, on_off(active));
                self.sink.emit(&AppEvent::ActuatorCommitted {
                    kind,
                    active,
                    origin,
                });
                self.persist(kind, active);
                KeyOutcome::Committed { active }
            }
            Err(ActuationError::TransportRejected) => {
                error!(
                    "Actuator {} REJECTED request {}, check payload or configuration",
                    kind,
                    command.payload()
                );
                self.sink.emit(&AppEvent::ActuationRejected { kind, active });
                KeyOutcome::Rejected
            }
            Err(ActuationError::TransportFailure) => {
                warn!(
                    "Actuator {} {} failed ({:?}), will retry next cycle",
                    kind,
                    on_off(active),
                    outcome
                );
                self.sink.emit(&AppEvent::ActuationFailed {
                    kind,
                    active,
                    outcome,
                });
                KeyOutcome::Failed
            }
        }
    }

    /// Best effort: the device already changed state, so a storage
    /// failure here never undoes the in-memory commit.
    fn persist(&self, kind: ActuatorKind, active: bool) {
        let result = self.store.actuator_record(kind).and_then(|record| {
            let record = record.ok_or(StoreError::NotFound)?;
            self.store.set_actuator_state(&record.address, kind, active)
        });
        match result {
            Ok(0) => warn!("Persist: {} update affected no row", kind),
            Ok(_) => return,
            Err(e) => warn!("Persist: {} state not stored, {}", kind, e),
        }
        self.sink.emit(&AppEvent::PersistSkipped { kind });
    }

    fn lock_lane(&self) -> std::sync::MutexGuard<'_, Lane<T>> {
        self.lane.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn on_off(active: bool) -> &'static str {
    if active { "ON" } else { "OFF" }
}
