//! Engine configuration.
//!
//! Supports configuration via environment variables:
//!
//! ```bash
//! # Buffered notifications per live feed subscriber (default 100)
//! ROLECALL_FEED_CAPACITY=100
//!
//! # Optional cap on invitations sent for a single role
//! ROLECALL_MAX_INVITATIONS_PER_ROLE=25
//! ```

use std::env;

use rolecall_notify::{NotificationStore, DEFAULT_FEED_CAPACITY};
use thiserror::Error;

pub const FEED_CAPACITY_VAR: &str = "ROLECALL_FEED_CAPACITY";
pub const MAX_INVITATIONS_VAR: &str = "ROLECALL_MAX_INVITATIONS_PER_ROLE";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Live feed buffer per notification subscriber
    pub feed_capacity: usize,
    /// Invitations allowed per role; `None` means unlimited
    pub max_invitations_per_role: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            feed_capacity: DEFAULT_FEED_CAPACITY,
            max_invitations_per_role: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value} (expected a positive integer)")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from any key lookup (environment, file, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(FEED_CAPACITY_VAR) {
            config.feed_capacity = parse_positive(FEED_CAPACITY_VAR, &raw)?;
        }

        if let Some(raw) = lookup(MAX_INVITATIONS_VAR) {
            config.max_invitations_per_role = Some(parse_positive(MAX_INVITATIONS_VAR, &raw)?);
        }

        Ok(config)
    }

    /// Empty notification store with this configuration's feed capacity.
    pub fn notification_store(&self) -> NotificationStore {
        NotificationStore::with_feed_capacity(self.feed_capacity)
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: raw.to_string(),
        })?;
    if value == 0 {
        return Err(ConfigError::Zero(var));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.feed_capacity, 100);
        assert_eq!(config.max_invitations_per_role, None);
    }

    #[test]
    fn reads_both_values() {
        let config = EngineConfig::from_lookup(lookup(&[
            (FEED_CAPACITY_VAR, "16"),
            (MAX_INVITATIONS_VAR, " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.feed_capacity, 16);
        assert_eq!(config.max_invitations_per_role, Some(5));
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = EngineConfig::from_lookup(lookup(&[(FEED_CAPACITY_VAR, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                var: FEED_CAPACITY_VAR,
                value: "lots".to_string()
            }
        );

        let err = EngineConfig::from_lookup(lookup(&[(MAX_INVITATIONS_VAR, "0")])).unwrap_err();
        assert_eq!(err, ConfigError::Zero(MAX_INVITATIONS_VAR));
        assert!(err.to_string().contains("greater than zero"));
    }
}
