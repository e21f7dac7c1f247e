//! Threshold evaluation and edge-triggered actuation.
//!
//! - [`thresholds`]: per-sensor band with validated, linearizable writes.
//! - [`hysteresis`]: pure decision function.
//! - [`cycle`]: one evaluation pass plus the shared transport-and-commit
//!   path used by manual triggers.

pub mod cycle;
pub mod hysteresis;
pub mod thresholds;

pub use cycle::{ControlCycle, CycleReport, KeyOutcome};
pub use hysteresis::{Decision, evaluate};
pub use thresholds::{Bound, Threshold, ThresholdRegistry};
