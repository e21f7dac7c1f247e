//! Simulated actuator transport.
//!
//! Logs the request that a CoAP client would send
//! (`PUT coap://[addr]/resource` with a JSON body) and acknowledges it.
//! Stands in for the real client on hosts without a border router.

use log::info;

use crate::app::ports::{ActuatorCommand, ActuatorTransport, TransportOutcome};
use crate::config::ActuatorRoutes;

pub struct SimTransport {
    routes: ActuatorRoutes,
    sent: u64,
}

impl SimTransport {
    pub fn new(routes: ActuatorRoutes) -> Self {
        Self { routes, sent: 0 }
    }

    /// Requests sent so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl ActuatorTransport for SimTransport {
    fn send(&mut self, command: &ActuatorCommand) -> TransportOutcome {
        self.sent += 1;
        info!(
            "SIM PUT {} {}",
            self.routes.uri(command.kind),
            command.payload()
        );
        TransportOutcome::Success
    }
}
