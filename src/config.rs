//! System configuration parameters
//!
//! Loaded once at startup from a JSON document.  Every field has a
//! default, so a partial document (or none at all) still yields a usable
//! configuration.  The core never reads the raw document: it only
//! consumes the resolved maps from [`DeviceConfig::actuator_routes`] and
//! [`DeviceConfig::topic_routes`].

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actuators::ActuatorKind;
use crate::error::ConfigError;
use crate::sensors::SensorKind;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control cycle period (milliseconds)
    pub control_period_ms: u64,
    /// Delay before the first control cycle (milliseconds)
    pub initial_delay_ms: u64,

    // --- Thresholds ---
    /// Initial bands, changeable at runtime from the console
    pub thresholds: ThresholdConfig,

    // --- Device ---
    pub device: DeviceConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            control_period_ms: 10_000, // 0.1 Hz
            initial_delay_ms: 30_000,  // let registrations settle
            thresholds: ThresholdConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Read and parse a configuration document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Range checks.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("control_period_ms must be > 0"));
        }
        let t = &self.thresholds;
        if t.fill_level_max <= 0 {
            return Err(ConfigError::ValidationFailed("fill_level_max must be > 0"));
        }
        if t.temperature_min >= t.temperature_max {
            return Err(ConfigError::ValidationFailed(
                "temperature_min must be below temperature_max",
            ));
        }
        if t.humidity_min >= t.humidity_max {
            return Err(ConfigError::ValidationFailed(
                "humidity_min must be below humidity_max",
            ));
        }
        if self.device.ipv6.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("device.ipv6 must not be empty"));
        }
        Ok(())
    }
}

/// Initial threshold bands.  Fill level has no lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fill level (%) above which the bin is reported full
    pub fill_level_max: i64,
    /// Temperature band (°C)
    pub temperature_min: i64,
    pub temperature_max: i64,
    /// Humidity band (%)
    pub humidity_min: i64,
    pub humidity_max: i64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fill_level_max: 80,
            temperature_min: -10,
            temperature_max: 50,
            humidity_min: 0,
            humidity_max: 90,
        }
    }
}

/// One bin's network identity and resource names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Address of the actuator node
    pub ipv6: String,
    pub coap_resources: CoapResources,
    pub mqtt_topics: MqttTopics,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            ipv6: "fd00::202:2:2:2".into(),
            coap_resources: CoapResources::default(),
            mqtt_topics: MqttTopics::default(),
        }
    }
}

/// CoAP resource paths on the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoapResources {
    pub temperature: String,
    pub humidity: String,
    pub distance: String,
    pub button: String,
    pub full_bin: String,
    pub anomaly_fire: String,
    pub anomaly_leakage: String,
}

impl Default for CoapResources {
    fn default() -> Self {
        Self {
            temperature: "temperature".into(),
            humidity: "humidity".into(),
            distance: "distance".into(),
            button: "button".into(),
            full_bin: "actuator/full".into(),
            anomaly_fire: "actuator/fire".into(),
            anomaly_leakage: "actuator/leak".into(),
        }
    }
}

/// MQTT topics the sensor nodes publish on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttTopics {
    pub temperature: String,
    pub humidity: String,
    /// Ultrasonic distance, reported as fill level.
    pub distance: String,
    pub button: String,
}

impl Default for MqttTopics {
    fn default() -> Self {
        Self {
            temperature: "temperature".into(),
            humidity: "humidity".into(),
            distance: "distance".into(),
            button: "button".into(),
        }
    }
}

// ── Resolved routes ───────────────────────────────────────────

/// `ActuatorKind -> resource path` on the node at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorRoutes {
    pub address: String,
    resources: [String; 3],
}

impl ActuatorRoutes {
    pub fn resource(&self, kind: ActuatorKind) -> &str {
        &self.resources[kind.index()]
    }

    /// `coap://[addr]/resource`
    pub fn uri(&self, kind: ActuatorKind) -> String {
        format!("coap://[{}]/{}", self.address, self.resource(kind))
    }
}

/// What a topic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicRoute {
    Sensor(SensorKind),
    Button,
}

/// `topic -> TopicRoute`.
pub type TopicRoutes = HashMap<String, TopicRoute>;

impl DeviceConfig {
    pub fn actuator_routes(&self) -> ActuatorRoutes {
        let r = &self.coap_resources;
        ActuatorRoutes {
            address: self.ipv6.clone(),
            resources: [
                r.full_bin.clone(),
                r.anomaly_fire.clone(),
                r.anomaly_leakage.clone(),
            ],
        }
    }

    pub fn topic_routes(&self) -> TopicRoutes {
        let t = &self.mqtt_topics;
        HashMap::from([
            (t.distance.clone(), TopicRoute::Sensor(SensorKind::FillLevel)),
            (t.temperature.clone(), TopicRoute::Sensor(SensorKind::Temperature)),
            (t.humidity.clone(), TopicRoute::Sensor(SensorKind::Humidity)),
            (t.button.clone(), TopicRoute::Button),
        ])
    }
}
