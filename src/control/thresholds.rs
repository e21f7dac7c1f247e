//! Threshold registry: current `[min, max]` band per sensor.
//!
//! Each sensor owns one guarded slot holding both bounds, so a reader
//! never sees half of an update, and the `min < max` check in
//! [`ThresholdRegistry::set_min`] / [`ThresholdRegistry::set_max`] runs
//! against the value in effect at commit time (check and write happen
//! under the same guard).
//!
//! Every accepted write bumps a per-sensor revision.  The control cycle
//! uses it to notice that an operator changed a band since the device
//! last rejected a command.

use std::sync::{Mutex, PoisonError};

use log::{info, warn};

use crate::config::ThresholdConfig;
use crate::error::ThresholdError;
use crate::sensors::SensorKind;

/// Which side of the band a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    /// Parse `MIN` / `MAX` (any case).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_uppercase().as_str() {
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            _ => None,
        }
    }
}

/// Current bounds for one sensor.  An absent bound means "no limit on
/// that side".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub kind: SensorKind,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Threshold {
    /// `true` if `value` lies outside the band.
    pub fn is_outside(&self, value: i64) -> bool {
        self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    threshold: Threshold,
    revision: u64,
}

pub struct ThresholdRegistry {
    slots: [Mutex<Slot>; 3],
}

impl ThresholdRegistry {
    /// Build the registry from startup configuration.
    ///
    /// The configuration is assumed validated
    /// ([`SystemConfig::validate`](crate::config::SystemConfig::validate)).
    pub fn new(config: &ThresholdConfig) -> Self {
        let initial = |kind, min, max| {
            Mutex::new(Slot {
                threshold: Threshold { kind, min, max },
                revision: 0,
            })
        };
        Self {
            slots: [
                initial(SensorKind::FillLevel, None, Some(config.fill_level_max)),
                initial(
                    SensorKind::Temperature,
                    Some(config.temperature_min),
                    Some(config.temperature_max),
                ),
                initial(
                    SensorKind::Humidity,
                    Some(config.humidity_min),
                    Some(config.humidity_max),
                ),
            ],
        }
    }

    /// Current bounds for `kind`.
    pub fn get(&self, kind: SensorKind) -> Threshold {
        self.slot(kind).threshold
    }

    /// Number of accepted writes to `kind` since startup.
    pub fn revision(&self, kind: SensorKind) -> u64 {
        self.slot(kind).revision
    }

    /// Replace the lower bound.  Rejected if `value >= max`.
    /// Fill level has no lower bound (its floor is implicitly 0).
    pub fn set_min(&self, kind: SensorKind, value: i64) -> Result<(), ThresholdError> {
        if kind == SensorKind::FillLevel {
            return Err(ThresholdError::UnknownBound);
        }
        let mut slot = self.lock(kind);
        if slot.threshold.max.is_some_and(|max| value >= max) {
            warn!(
                "Thresholds: {} min {} rejected (max is {:?})",
                kind, value, slot.threshold.max
            );
            return Err(ThresholdError::InvalidBound);
        }
        slot.threshold.min = Some(value);
        slot.revision += 1;
        info!("Thresholds: {} min set to {}", kind, value);
        Ok(())
    }

    /// Replace the upper bound.  Rejected if `value <= min`, and for fill
    /// level if `value <= 0`.
    pub fn set_max(&self, kind: SensorKind, value: i64) -> Result<(), ThresholdError> {
        let mut slot = self.lock(kind);
        let floor_violated = kind == SensorKind::FillLevel && value <= 0;
        if floor_violated || slot.threshold.min.is_some_and(|min| value <= min) {
            warn!(
                "Thresholds: {} max {} rejected (min is {:?})",
                kind, value, slot.threshold.min
            );
            return Err(ThresholdError::InvalidBound);
        }
        slot.threshold.max = Some(value);
        slot.revision += 1;
        info!("Thresholds: {} max set to {}", kind, value);
        Ok(())
    }

    /// Dispatch on [`Bound`]; used by the command surface.
    pub fn set(&self, kind: SensorKind, bound: Bound, value: i64) -> Result<(), ThresholdError> {
        match bound {
            Bound::Min => self.set_min(kind, value),
            Bound::Max => self.set_max(kind, value),
        }
    }

    fn slot(&self, kind: SensorKind) -> Slot {
        *self.lock(kind)
    }

    fn lock(&self, kind: SensorKind) -> std::sync::MutexGuard<'_, Slot> {
        self.slots[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
