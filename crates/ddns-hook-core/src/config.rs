//! Configuration types for the DDNS hook
//!
//! This module defines the settings shared by every request the hook serves.
//! Nothing here is request-scoped: tokens and zones arrive with each request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main hook configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Deadline for a single update request (in seconds)
    ///
    /// When the deadline passes the caller receives a 500 response and the
    /// in-flight reconciliation is cancelled.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Enable the provider's traffic proxying on newly created records
    ///
    /// Existing records keep whatever proxy setting they already have.
    #[serde(default = "default_proxied")]
    pub proxied: bool,
}

impl HookConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            proxied: default_proxied(),
        }
    }

    /// Set the request deadline
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Set the proxy flag used for created records
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Request deadline as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.request_timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }

        Ok(())
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_proxied() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HookConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.proxied);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: HookConfig = serde_json::from_str(r#"{"proxied": false}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.proxied);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = HookConfig::new().with_request_timeout_secs(0);
        assert!(config.validate().is_err());
    }
}
