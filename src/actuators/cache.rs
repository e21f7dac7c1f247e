//! In-memory cache of committed actuator state.
//!
//! One guarded slot per actuator, so a commit on `fire` never contends
//! with a read of `full`.  There is no rollback: a failed
//! transport call simply never reaches [`ActuatorStateCache::commit`],
//! and the next cycle re-evaluates from the same baseline.

use std::sync::{Mutex, PoisonError};

use super::{ActuatorKind, ActuatorState};

pub struct ActuatorStateCache {
    slots: [Mutex<ActuatorState>; 3],
}

impl ActuatorStateCache {
    /// Every actuator starts inactive.
    pub fn new() -> Self {
        Self {
            slots: ActuatorKind::ALL.map(|k| Mutex::new(ActuatorState::inactive(k))),
        }
    }

    /// Last committed state; `false` if never committed.
    pub fn current(&self, kind: ActuatorKind) -> bool {
        self.snapshot(kind).active
    }

    /// Full committed record, including the commit timestamp.
    pub fn snapshot(&self, kind: ActuatorKind) -> ActuatorState {
        *self.slots[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the committed state.  Last confirmation wins.
    ///
    /// Only the control cycle's commit path calls this.
    pub(crate) fn commit(&self, kind: ActuatorKind, active: bool, at: u64) {
        let mut slot = self.slots[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.active = active;
        slot.committed_at = at;
    }
}

impl Default for ActuatorStateCache {
    fn default() -> Self {
        Self::new()
    }
}
