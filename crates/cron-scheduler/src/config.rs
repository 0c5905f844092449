//! Registry configuration.
//!
//! Covers the two knobs the registry needs from its host application:
//! the timezone applied to jobs that do not name one, and how long a
//! full shutdown waits for in-flight firings.

use serde::{Deserialize, Serialize};

use crate::schedule::parse_timezone;
use crate::SchedulerError;

/// Configuration for a [`crate::JobRegistry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Timezone applied to jobs added without an explicit timezone
    /// (IANA identifier, e.g. "America/New_York"). Defaults to "UTC".
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Grace period in seconds that a bulk close grants to in-flight
    /// job actions before the timer engine is shut down.
    /// Defaults to 10 seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_shutdown_timeout() -> u64 {
    10
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl RegistryConfig {
    /// Parse the configured default timezone.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidTimezone` if the configured value
    /// is not a valid IANA timezone identifier.
    pub fn parse_timezone(&self) -> Result<chrono_tz::Tz, SchedulerError> {
        parse_timezone(&self.default_timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.default_timezone, "UTC");
        assert_eq!(config.shutdown_timeout_secs, 10);
    }

    #[test]
    fn test_parse_default_timezone() {
        let config = RegistryConfig::default();
        assert_eq!(config.parse_timezone().unwrap().name(), "UTC");
    }

    #[test]
    fn test_parse_named_timezone() {
        let config = RegistryConfig {
            default_timezone: "Europe/London".to_string(),
            ..Default::default()
        };
        assert_eq!(config.parse_timezone().unwrap().name(), "Europe/London");
    }

    #[test]
    fn test_parse_invalid_timezone() {
        let config = RegistryConfig {
            default_timezone: "Nowhere/Special".to_string(),
            ..Default::default()
        };
        match config.parse_timezone() {
            Err(SchedulerError::InvalidTimezone(tz)) => assert_eq!(tz, "Nowhere/Special"),
            other => panic!("expected InvalidTimezone, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_defaults_apply() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.default_timezone, "UTC");
        assert_eq!(config.shutdown_timeout_secs, 10);
    }
}
