//! Smart-bin controller library.
//!
//! Threshold evaluation and edge-triggered actuation for a waste bin's
//! fill-level, temperature and humidity sensors.  Exposes the core
//! modules for the host binary and for integration testing.  Everything
//! that touches the outside world sits behind the port traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod actuators;
pub mod adapters;
pub mod app;
pub mod config;
pub mod console;
pub mod control;
pub mod error;
pub mod scheduler;
pub mod sensors;

pub use error::{Error, Result};
