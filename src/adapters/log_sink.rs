//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, one tagged line per event.  A telemetry publisher
//! would implement the same trait.

use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, Origin};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::ActuatorCommitted {
                kind,
                active,
                origin,
            } => {
                let origin = match origin {
                    Origin::Threshold => "threshold",
                    Origin::Manual => "manual",
                };
                info!(
                    "ACT | {} -> {} ({})",
                    kind,
                    if *active { "ON" } else { "OFF" },
                    origin
                );
            }
            AppEvent::ActuationFailed {
                kind,
                active,
                outcome,
            } => {
                warn!("ACT | {} -> {} failed: {:?}", kind, active, outcome);
            }
            AppEvent::ActuationRejected { kind, active } => {
                error!("ACT | {} -> {} rejected by device", kind, active);
            }
            AppEvent::PersistSkipped { kind } => {
                warn!("ACT | {} state not persisted", kind);
            }
            AppEvent::KeySkipped { sensor } => {
                warn!("CYCLE | {} skipped, persistence unavailable", sensor);
            }
            AppEvent::ActuatorRegistered { kind, address } => {
                info!("ACT | {} registered at {}", kind, address);
            }
            AppEvent::ThresholdChanged {
                sensor,
                bound,
                value,
            } => {
                info!("THRESH | {} {:?} = {}", sensor, bound, value);
            }
            AppEvent::ThresholdRejected {
                sensor,
                bound,
                value,
                reason,
            } => {
                warn!("THRESH | {} {:?} = {} rejected: {}", sensor, bound, value, reason);
            }
            AppEvent::CycleCompleted { commands_sent } => {
                debug!("CYCLE | done, {} command(s)", commands_sent);
            }
        }
    }
}
