//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlCycle / AppService (domain)
//! ```
//!
//! Driven adapters (persistence, actuator transport, event sinks)
//! implement these traits.  The core consumes them via generics, so it
//! never touches a socket or a database directly.
//!
//! Every port returns a tagged outcome instead of panicking; callers
//! branch on the variant.

use serde::Serialize;

use crate::actuators::ActuatorKind;
use crate::error::{ActuationError, StoreError};
use crate::sensors::{SensorKind, SensorReading};

// ───────────────────────────────────────────────────────────────
// Persistence port (driven adapter: domain ↔ reading/actuator storage)
// ───────────────────────────────────────────────────────────────

/// A stored actuator row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorRecord {
    /// Network address of the node hosting the actuator.
    pub address: String,
    pub active: bool,
}

/// Reading and actuator storage shared by the ingest worker, the control
/// cycle and the command surface.
///
/// Implementations synchronise internally; every method takes `&self`.
pub trait PersistencePort: Send + Sync {
    /// Newest value of `kind` by observation time, `None` if never seen.
    fn latest_value(&self, kind: SensorKind) -> Result<Option<i64>, StoreError>;

    /// Store an ingested reading.
    fn record_reading(&self, reading: &SensorReading) -> Result<(), StoreError>;

    /// Stored row for `kind`, `None` if the actuator never registered.
    fn actuator_record(&self, kind: ActuatorKind) -> Result<Option<ActuatorRecord>, StoreError>;

    /// Update the stored state.  Returns the number of affected rows;
    /// `0` means the row did not exist.
    fn set_actuator_state(
        &self,
        address: &str,
        kind: ActuatorKind,
        active: bool,
    ) -> Result<u64, StoreError>;

    /// Create or replace the row for `kind` at `address`, inactive.
    fn register_actuator(&self, address: &str, kind: ActuatorKind) -> Result<u64, StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator transport port (driven adapter: domain → device)
// ───────────────────────────────────────────────────────────────

/// One actuator request.
///
/// `threshold` is present only for value-triggered activations and carries
/// the observed value that crossed the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuatorCommand {
    #[serde(skip)]
    pub kind: ActuatorKind,
    pub action: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,
}

impl ActuatorCommand {
    /// JSON body as understood by the actuator nodes,
    /// e.g. `{"action":true,"threshold":85}`.
    pub fn payload(&self) -> String {
        // Serialising a flat struct of a bool and an integer cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Response class of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    /// 2.xx: the device changed state.
    Success,
    /// 4.xx: the request itself was wrong.
    ClientError,
    /// 5.xx.
    ServerError,
    /// No response at all.
    Unreachable,
}

impl TransportOutcome {
    pub fn into_result(self) -> Result<(), ActuationError> {
        match self {
            Self::Success => Ok(()),
            Self::ClientError => Err(ActuationError::TransportRejected),
            Self::ServerError | Self::Unreachable => Err(ActuationError::TransportFailure),
        }
    }
}

/// Blocking request/response primitive towards the actuator nodes.
///
/// Any timeout is the implementation's business; the core treats a call
/// that never returns as a stalled cycle.
pub trait ActuatorTransport: Send {
    fn send(&mut self, command: &ActuatorCommand) -> TransportOutcome;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  It is shared by the scheduler worker and the
/// command surface, hence `&self`.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}
