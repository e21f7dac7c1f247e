//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements         | Connects to              |
//! |-----------------|--------------------|--------------------------|
//! | `log_sink`      | EventSink          | `log` facade             |
//! | `memory_store`  | PersistencePort    | In-process tables        |
//! | `sim_transport` | ActuatorTransport  | Logged CoAP requests     |
//! | `time`          | n/a                | System clock             |

pub mod log_sink;
pub mod memory_store;
pub mod sim_transport;
pub mod time;
