//! Unified error types for the SmartBin controller.
//!
//! A single [`Error`] enum that every subsystem converts into, keeping the
//! top-level wiring's error handling uniform.  Subsystem enums stay small
//! and `Copy` where they carry no data, so they can be returned from the
//! hot control path without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible library operation funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A threshold write was rejected.
    Threshold(ThresholdError),
    /// The persistence collaborator failed.
    Store(StoreError),
    /// An actuator command did not complete.
    Actuation(ActuationError),
    /// A sensor message could not be ingested.
    Ingest(IngestError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Threshold(e) => write!(f, "threshold: {e}"),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Ingest(e) => write!(f, "ingest: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Threshold errors
// ---------------------------------------------------------------------------

/// Why a threshold write was refused.  The registry keeps its previous
/// value in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdError {
    /// The new bound would break `min < max`, or a fill-level max is not
    /// positive.
    InvalidBound,
    /// The sensor has no such bound (fill level has no minimum).
    UnknownBound,
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBound => write!(f, "invalid bound"),
            Self::UnknownBound => write!(f, "bound not supported for this sensor"),
        }
    }
}

impl From<ThresholdError> for Error {
    fn from(e: ThresholdError) -> Self {
        Self::Threshold(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached; nothing is known about current values.
    Unavailable,
    /// The row addressed by the call does not exist.
    NotFound,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "persistence unavailable"),
            Self::NotFound => write!(f, "row not found"),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// Device unreachable or server-side failure.  Retried next cycle.
    TransportFailure,
    /// Device refused the request as malformed.  Not retried.
    TransportRejected,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportFailure => write!(f, "transport failure"),
            Self::TransportRejected => write!(f, "request rejected by device"),
        }
    }
}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Ingest errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    /// Topic is not routed to any sensor.
    UnknownTopic,
    /// Payload is not JSON or lacks a numeric `value`.
    MalformedPayload,
    /// Ingest queue is full; the reading was dropped.
    QueueFull,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic => write!(f, "unknown topic"),
            Self::MalformedPayload => write!(f, "malformed payload"),
            Self::QueueFull => write!(f, "ingest queue full"),
        }
    }
}

impl From<IngestError> for Error {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(String),
    /// The document is not valid JSON for [`SystemConfig`](crate::config::SystemConfig).
    Parse(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
