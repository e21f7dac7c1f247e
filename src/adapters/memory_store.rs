//! In-memory persistence adapter.
//!
//! Keeps the newest reading per sensor (by observation time) and one
//! actuator row per kind.  Used by the host binary and by tests; a SQL
//! adapter would implement the same [`PersistencePort`].

use std::sync::{Mutex, PoisonError};

use crate::actuators::ActuatorKind;
use crate::app::ports::{ActuatorRecord, PersistencePort};
use crate::error::StoreError;
use crate::sensors::{SensorKind, SensorReading};

#[derive(Default)]
struct Tables {
    latest: [Option<SensorReading>; 3],
    actuators: [Option<ActuatorRecord>; 3],
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest stored reading for `kind`, with its metadata.
    pub fn latest_reading(&self, kind: SensorKind) -> Option<SensorReading> {
        self.lock().latest[kind.index()].clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistencePort for MemoryStore {
    fn latest_value(&self, kind: SensorKind) -> Result<Option<i64>, StoreError> {
        Ok(self.lock().latest[kind.index()].as_ref().map(|r| r.value))
    }

    fn record_reading(&self, reading: &SensorReading) -> Result<(), StoreError> {
        let mut t = self.lock();
        let slot = &mut t.latest[reading.kind.index()];
        // Late deliveries never overwrite a newer observation.
        if slot
            .as_ref()
            .is_none_or(|current| reading.observed_at >= current.observed_at)
        {
            *slot = Some(reading.clone());
        }
        Ok(())
    }

    fn actuator_record(&self, kind: ActuatorKind) -> Result<Option<ActuatorRecord>, StoreError> {
        Ok(self.lock().actuators[kind.index()].clone())
    }

    fn set_actuator_state(
        &self,
        address: &str,
        kind: ActuatorKind,
        active: bool,
    ) -> Result<u64, StoreError> {
        let mut t = self.lock();
        match t.actuators[kind.index()].as_mut() {
            Some(row) if row.address == address => {
                row.active = active;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn register_actuator(&self, address: &str, kind: ActuatorKind) -> Result<u64, StoreError> {
        self.lock().actuators[kind.index()] = Some(ActuatorRecord {
            address: address.to_owned(),
            active: false,
        });
        Ok(1)
    }
}
