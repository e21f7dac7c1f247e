//! Actuator kinds and committed actuator state.
//!
//! An [`ActuatorState`] records what the controller last told a device
//! *and the device acknowledged*.  It is never a wish: only the control
//! cycle's commit path writes it, after a successful transport call.

pub mod cache;

use core::fmt;

use serde::{Deserialize, Serialize};

pub use cache::ActuatorStateCache;

/// The remote actuators of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Full-bin indicator, driven by fill level.
    Full,
    /// Fire anomaly, driven by temperature.
    Fire,
    /// Leak anomaly, driven by humidity.
    Leak,
}

impl ActuatorKind {
    pub const ALL: [ActuatorKind; 3] = [Self::Full, Self::Fire, Self::Leak];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Fire => "fire",
            Self::Leak => "leak",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(key.trim()))
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Full => 0,
            Self::Fire => 1,
            Self::Leak => 2,
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Last committed on/off state of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub kind: ActuatorKind,
    pub active: bool,
    /// Unix seconds of the commit; `0` until the first commit.
    pub committed_at: u64,
}

impl ActuatorState {
    pub const fn inactive(kind: ActuatorKind) -> Self {
        Self {
            kind,
            active: false,
            committed_at: 0,
        }
    }
}
