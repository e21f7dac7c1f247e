//! Application core: command handling and the port boundary.
//!
//! Business rules for the bin controller live in [`crate::control`];
//! this module wires them behind [`service::AppService`] and defines the
//! **port traits** in [`ports`] through which all persistence, actuator
//! and event I/O flows, keeping the core testable without a database or
//! a CoAP node.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
