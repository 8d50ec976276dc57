//! Shared state for the HTTP server.
//!
//! Wraps the broker plus the configuration the handlers need to resolve
//! session keys and bound submitter waits.

use courier_core::{Broker, BrokerConfig, SessionSelector};
use std::sync::Arc;
use std::time::Duration;

/// Shared state available to all HTTP handlers.
#[derive(Clone)]
pub struct SharedState {
    /// The rendezvous engine.
    pub broker: Arc<Broker>,

    /// Shared secret addressing the default/anonymous session.
    pub privileged_key: String,

    /// How long a submitter blocks before a 408.
    pub wait_timeout: Duration,
}

impl SharedState {
    /// Create shared state from the broker and its configuration.
    pub fn new(broker: Arc<Broker>, config: &BrokerConfig) -> Self {
        Self {
            broker,
            privileged_key: config.privileged_key.clone(),
            wait_timeout: config.wait_timeout,
        }
    }

    /// Map a session key from the wire to the session it addresses.
    ///
    /// The privileged key is the sole mechanism selecting the default
    /// session; every other key addresses its own isolated session.
    pub fn selector_for_key(&self, key: &str) -> SessionSelector {
        if key == self.privileged_key {
            SessionSelector::Default
        } else {
            SessionSelector::keyed(key)
        }
    }
}
