//! Runtime configuration.
//!
//! Sane defaults for local operation with environment overrides; the
//! webhook server key MUST be overridden outside development.

use admission_gate::GateProfile;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::fmt;
use tracing::info;

/// Development-only webhook signing secret.
pub const DEV_SERVER_KEY: &str = "dev-server-key";

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Shared secret the gateway signs webhook payloads with.
    pub server_key: String,
    /// Per-subscriber event-bus buffer capacity.
    pub bus_capacity: usize,
    /// Admission profile applied at the entry gate.
    pub gate_profile: GateProfile,
    /// Whether the gate admits on bucket-store outage.
    pub gate_fail_open: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            server_key: DEV_SERVER_KEY.to_string(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            gate_profile: GateProfile::default_profile(),
            gate_fail_open: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The webhook server key is still the development default.
    InsecureServerKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InsecureServerKey => write!(
                f,
                "webhook server key is the development default; \
                 set COMMERCE_SERVER_KEY"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RuntimeConfig {
    /// Defaults overridden from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("COMMERCE_SERVER_KEY") {
            if !key.is_empty() {
                config.server_key = key;
                info!("Loaded webhook server key from environment");
            }
        }
        if let Ok(capacity) = std::env::var("COMMERCE_BUS_CAPACITY") {
            if let Ok(c) = capacity.parse() {
                config.bus_capacity = c;
            }
        }

        config
    }

    /// Validate configuration for production readiness.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.server_key == DEV_SERVER_KEY {
            return Err(ConfigError::InsecureServerKey);
        }
        Ok(())
    }
}
