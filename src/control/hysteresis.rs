//! Edge-triggered band evaluator.
//!
//! Pure decision function: given the latest value, the band and the
//! committed actuator state, decide whether the actuator must change.
//! Repeated polls while a value stays outside (or inside) the band yield
//! [`Decision::NoChange`] once the transition has been committed, so a
//! steady but noisy sensor never floods the device with commands.
//!
//! ```text
//!                 outside && !active
//!   ┌──────────┐ ───────────────────▶ ┌──────────┐
//!   │ inactive │                      │  active  │
//!   └──────────┘ ◀─────────────────── └──────────┘
//!                 !outside && active
//! ```

use crate::actuators::ActuatorKind;
use crate::control::thresholds::Threshold;

/// Transient outcome of one evaluation.  Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    NoChange,
    Activate(ActuatorKind),
    Deactivate(ActuatorKind),
}

impl Decision {
    /// The state the actuator should be driven to, if any.
    pub fn target(self) -> Option<(ActuatorKind, bool)> {
        match self {
            Self::NoChange => None,
            Self::Activate(k) => Some((k, true)),
            Self::Deactivate(k) => Some((k, false)),
        }
    }
}

/// Decide whether `actuator` must change state.
///
/// An absent `value` (no reading yet) always yields `NoChange`.
pub fn evaluate(
    actuator: ActuatorKind,
    value: Option<i64>,
    bounds: &Threshold,
    currently_active: bool,
) -> Decision {
    let Some(value) = value else {
        return Decision::NoChange;
    };
    let outside = bounds.is_outside(value);
    match (outside, currently_active) {
        (true, false) => Decision::Activate(actuator),
        (false, true) => Decision::Deactivate(actuator),
        _ => Decision::NoChange,
    }
}
