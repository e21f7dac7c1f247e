//! Inbound commands to the application service.
//!
//! These represent actions requested by the command surface that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::actuators::ActuatorKind;
use crate::control::thresholds::Bound;
use crate::sensors::SensorKind;

/// Commands that external adapters can send into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Replace one bound of a sensor's band.
    SetThreshold {
        sensor: SensorKind,
        bound: Bound,
        value: i64,
    },

    /// Drive an actuator directly, bypassing evaluation.
    Trigger { actuator: ActuatorKind, active: bool },

    /// Latest values, bands and committed actuator states.
    GetStatus,

    /// Current thresholds and control timing.
    GetConfiguration,
}
