//! Sensor kinds and readings, plus the ingest pipeline that feeds them
//! into persistence.
//!
//! A [`SensorReading`] is immutable once produced.  Only the newest reading
//! per [`SensorKind`] is ever consulted by the control cycle.

pub mod ingest;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Longest textual IPv6 address (`ffff:...:255.255.255.255`).
pub const MAX_ADDRESS_LEN: usize = 45;

/// Bounded source address carried with a reading.
pub type SourceAddress = heapless::String<MAX_ADDRESS_LEN>;

/// The monitored quantities of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    FillLevel,
    Temperature,
    Humidity,
}

impl SensorKind {
    /// Evaluation order used by every control cycle.
    pub const ALL: [SensorKind; 3] = [Self::FillLevel, Self::Temperature, Self::Humidity];

    /// Stable key used in configuration, persistence and the console.
    pub const fn key(self) -> &'static str {
        match self {
            Self::FillLevel => "fill_level",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }

    /// Parse a key as typed on the console or stored in a row.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Dense index, used for per-key storage slots.
    pub const fn index(self) -> usize {
        match self {
            Self::FillLevel => 0,
            Self::Temperature => 1,
            Self::Humidity => 2,
        }
    }

    /// The actuator this sensor drives.
    pub const fn actuator(self) -> crate::actuators::ActuatorKind {
        use crate::actuators::ActuatorKind;
        match self {
            Self::FillLevel => ActuatorKind::Full,
            Self::Temperature => ActuatorKind::Fire,
            Self::Humidity => ActuatorKind::Leak,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One observation delivered by ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub value: i64,
    /// Unix seconds at which the reading was observed.
    pub observed_at: u64,
    pub source_address: Option<SourceAddress>,
}

impl SensorReading {
    pub fn new(kind: SensorKind, value: i64, observed_at: u64) -> Self {
        Self {
            kind,
            value,
            observed_at,
            source_address: None,
        }
    }

    /// Attach the address of the node that produced the reading.
    /// Addresses longer than [`MAX_ADDRESS_LEN`] are dropped.
    #[must_use]
    pub fn with_source(mut self, address: &str) -> Self {
        let mut s = SourceAddress::new();
        self.source_address = s.push_str(address).ok().map(|()| s);
        self
    }
}
