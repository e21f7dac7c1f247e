//! Outbound application events.
//!
//! The control cycle and the [`AppService`](super::service::AppService)
//! emit these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them.

use crate::actuators::ActuatorKind;
use crate::app::ports::TransportOutcome;
use crate::control::thresholds::Bound;
use crate::error::ThresholdError;
use crate::sensors::SensorKind;

/// Who asked for an actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A band crossing detected by the control cycle.
    Threshold,
    /// An operator trigger from the command surface.
    Manual,
}

/// Structured events emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The device acknowledged and the new state was committed.
    ActuatorCommitted {
        kind: ActuatorKind,
        active: bool,
        origin: Origin,
    },

    /// Transport failed; state left uncommitted, retried next cycle.
    ActuationFailed {
        kind: ActuatorKind,
        active: bool,
        outcome: TransportOutcome,
    },

    /// Device refused the request as malformed; not retried.
    ActuationRejected { kind: ActuatorKind, active: bool },

    /// Persisting a committed state had no effect (row missing or
    /// backend failure).  The in-memory commit stands.
    PersistSkipped { kind: ActuatorKind },

    /// Persistence could not be read; this key was skipped for the cycle.
    KeySkipped { sensor: SensorKind },

    /// An actuator node registered; its state was reset to inactive.
    ActuatorRegistered { kind: ActuatorKind, address: String },

    /// An operator changed a threshold.
    ThresholdChanged {
        sensor: SensorKind,
        bound: Bound,
        value: i64,
    },

    /// An operator threshold change was refused.
    ThresholdRejected {
        sensor: SensorKind,
        bound: Bound,
        value: i64,
        reason: ThresholdError,
    },

    /// One evaluation pass finished.
    CycleCompleted { commands_sent: usize },
}
