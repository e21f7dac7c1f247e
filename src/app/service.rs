//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the threshold registry, the actuator state cache
//! and the control cycle, and interprets [`AppCommand`]s from the command
//! surface.  All I/O flows through port traits injected at construction,
//! making the entire service testable with mock adapters.
//!
//! ```text
//!  PersistencePort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                      │          AppService          │
//! ActuatorTransport ◀──│ Thresholds · Cache · Cycle   │
//!                      └─────────────────────────────┘
//! ```

use core::fmt;
use std::sync::Arc;

use log::warn;

use crate::actuators::{ActuatorKind, ActuatorState, ActuatorStateCache};
use crate::adapters::time::Uptime;
use crate::config::SystemConfig;
use crate::control::cycle::ControlCycle;
use crate::control::thresholds::{Bound, Threshold, ThresholdRegistry};
use crate::error::{ActuationError, Error, ThresholdError};
use crate::sensors::SensorKind;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorTransport, EventSink, PersistencePort};

// ───────────────────────────────────────────────────────────────
// Replies
// ───────────────────────────────────────────────────────────────

/// Result of one [`AppCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppReply {
    ThresholdUpdated {
        sensor: SensorKind,
        bound: Bound,
        value: i64,
    },
    ThresholdRejected {
        sensor: SensorKind,
        bound: Bound,
        value: i64,
        reason: ThresholdError,
    },
    Triggered {
        actuator: ActuatorKind,
        active: bool,
    },
    TriggerFailed {
        actuator: ActuatorKind,
        active: bool,
        reason: ActuationError,
    },
    Status(StatusReport),
    Configuration(ConfigurationReport),
}

/// One sensor line of a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorStatus {
    pub sensor: SensorKind,
    /// Latest stored value; `None` if there is none or storage is down.
    pub latest: Option<i64>,
    pub threshold: Threshold,
    pub actuator: ActuatorState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub sensors: [SensorStatus; 3],
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationReport {
    pub thresholds: [Threshold; 3],
    pub control_period_ms: u64,
    pub initial_delay_ms: u64,
    pub device_address: String,
}

fn bound_str(bound: Option<i64>) -> String {
    bound.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "uptime {}s", self.uptime_secs)?;
        for s in &self.sensors {
            writeln!(
                f,
                "  {:<12} value={:<5} band=[{}, {}] {}={}",
                s.sensor.key(),
                s.latest.map_or_else(|| "n/a".to_owned(), |v| v.to_string()),
                bound_str(s.threshold.min),
                bound_str(s.threshold.max),
                s.actuator.kind,
                if s.actuator.active { "ON" } else { "OFF" },
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfigurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "control period {} ms (first cycle after {} ms)",
            self.control_period_ms, self.initial_delay_ms
        )?;
        writeln!(f, "device {}", self.device_address)?;
        for t in &self.thresholds {
            writeln!(
                f,
                "  {:<12} MIN={} MAX={}",
                t.kind.key(),
                bound_str(t.min),
                bound_str(t.max)
            )?;
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<P, T, S> {
    config: SystemConfig,
    thresholds: Arc<ThresholdRegistry>,
    actuators: Arc<ActuatorStateCache>,
    store: Arc<P>,
    sink: Arc<S>,
    cycle: Arc<ControlCycle<P, T, S>>,
    uptime: Uptime,
}

impl<P, T, S> AppService<P, T, S>
where
    P: PersistencePort,
    T: ActuatorTransport,
    S: EventSink,
{
    /// Construct the service from validated configuration.
    ///
    /// Does **not** register the device; call [`register_device`] next.
    ///
    /// [`register_device`]: Self::register_device
    pub fn new(config: SystemConfig, store: Arc<P>, transport: T, sink: Arc<S>) -> Self {
        let thresholds = Arc::new(ThresholdRegistry::new(&config.thresholds));
        let actuators = Arc::new(ActuatorStateCache::new());
        let cycle = Arc::new(ControlCycle::new(
            Arc::clone(&thresholds),
            Arc::clone(&actuators),
            Arc::clone(&store),
            transport,
            Arc::clone(&sink),
        ));
        Self {
            config,
            thresholds,
            actuators,
            store,
            sink,
            cycle,
            uptime: Uptime::new(),
        }
    }

    /// Register every actuator of the configured node.
    pub fn register_device(&self) -> Result<(), Error> {
        for kind in ActuatorKind::ALL {
            self.cycle.register(kind, &self.config.device.ipv6)?;
        }
        Ok(())
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a command from the console (or any other command adapter).
    pub fn handle_command(&self, cmd: AppCommand) -> AppReply {
        match cmd {
            AppCommand::SetThreshold {
                sensor,
                bound,
                value,
            } => match self.thresholds.set(sensor, bound, value) {
                Ok(()) => {
                    self.sink.emit(&AppEvent::ThresholdChanged {
                        sensor,
                        bound,
                        value,
                    });
                    AppReply::ThresholdUpdated {
                        sensor,
                        bound,
                        value,
                    }
                }
                Err(reason) => {
                    self.sink.emit(&AppEvent::ThresholdRejected {
                        sensor,
                        bound,
                        value,
                        reason,
                    });
                    AppReply::ThresholdRejected {
                        sensor,
                        bound,
                        value,
                        reason,
                    }
                }
            },
            AppCommand::Trigger { actuator, active } => {
                match self.cycle.trigger(actuator, active) {
                    Ok(()) => AppReply::Triggered { actuator, active },
                    Err(reason) => {
                        warn!("Trigger {} failed: {}", actuator, reason);
                        AppReply::TriggerFailed {
                            actuator,
                            active,
                            reason,
                        }
                    }
                }
            }
            AppCommand::GetStatus => AppReply::Status(self.status()),
            AppCommand::GetConfiguration => AppReply::Configuration(self.configuration()),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> StatusReport {
        let line = |sensor: SensorKind| SensorStatus {
            sensor,
            latest: self.store.latest_value(sensor).ok().flatten(),
            threshold: self.thresholds.get(sensor),
            actuator: self.actuators.snapshot(sensor.actuator()),
        };
        StatusReport {
            sensors: SensorKind::ALL.map(line),
            uptime_secs: self.uptime.secs(),
        }
    }

    pub fn configuration(&self) -> ConfigurationReport {
        ConfigurationReport {
            thresholds: SensorKind::ALL.map(|k| self.thresholds.get(k)),
            control_period_ms: self.config.control_period_ms,
            initial_delay_ms: self.config.initial_delay_ms,
            device_address: self.config.device.ipv6.clone(),
        }
    }

    /// Shared handle to the control cycle, for the scheduler.
    pub fn cycle(&self) -> Arc<ControlCycle<P, T, S>> {
        Arc::clone(&self.cycle)
    }

    pub fn thresholds(&self) -> &ThresholdRegistry {
        &self.thresholds
    }

    pub fn actuators(&self) -> &ActuatorStateCache {
        &self.actuators
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}
