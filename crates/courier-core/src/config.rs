//! Broker configuration.
//!
//! The privileged session key is the one value with no sane default: it
//! is the shared secret that maps to the default/anonymous session, so a
//! missing or empty key is a startup-fatal misconfiguration.

use std::time::Duration;
use thiserror::Error;

/// Environment variable carrying the privileged session key.
pub const PRIVILEGED_KEY_ENV: &str = "COURIER_PRIVILEGED_KEY";

/// How long a submitter waits for a result before getting a timeout.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Idle time after which a keyed session becomes eligible for eviction.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(3600);

/// Period of the background reaper loop.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{PRIVILEGED_KEY_ENV} is not set or empty")]
    MissingPrivilegedKey,
}

/// Runtime configuration for the broker and its surroundings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Shared secret addressing the default/anonymous session.
    pub privileged_key: String,

    /// Submitter-side wait bound for [`crate::wait::await_result`].
    pub wait_timeout: Duration,

    /// Idle threshold used by the reaper.
    pub idle_threshold: Duration,

    /// How often the reaper sweeps.
    pub reap_interval: Duration,
}

impl BrokerConfig {
    /// Build a config with default timings. Fails on an empty key.
    pub fn new(privileged_key: impl Into<String>) -> Result<Self, ConfigError> {
        let privileged_key = privileged_key.into();
        if privileged_key.is_empty() {
            return Err(ConfigError::MissingPrivilegedKey);
        }
        Ok(Self {
            privileged_key,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            idle_threshold: DEFAULT_IDLE_THRESHOLD,
            reap_interval: DEFAULT_REAP_INTERVAL,
        })
    }

    /// Load the privileged key from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = std::env::var(PRIVILEGED_KEY_ENV)
            .map_err(|_| ConfigError::MissingPrivilegedKey)?;
        Self::new(key)
    }
}
