//! API configuration

use std::time::Duration;

use serde::Deserialize;

use core_kernel::{TemporalError, Timezone};
use domain_claims::{ClaimRules, ZeroPaidPolicy};
use infra_export::SchedulerConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Maximum database connections
    pub max_connections: u32,
    /// Log level
    pub log_level: String,
    /// Business timezone for "today" (reference dates, report titles)
    pub timezone: String,
    /// Directory holding `exports/{excel,csv,pdf}`
    pub backup_root: String,
    /// Seconds between weekly backup checks
    pub backup_check_interval_secs: u64,
    /// Seconds before retrying a failed weekly backup
    pub backup_retry_interval_secs: u64,
    /// Whether the weekly backup task runs
    pub weekly_backup_enabled: bool,
    /// Required leading text of a claim number
    pub claim_no_prefix: String,
    /// `retain` or `mark_not_settled`
    pub zero_paid_settlement: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/claims".to_string(),
            max_connections: 10,
            log_level: "info".to_string(),
            timezone: "UTC".to_string(),
            backup_root: ".".to_string(),
            backup_check_interval_secs: 3600,
            backup_retry_interval_secs: 300,
            weekly_backup_enabled: true,
            claim_no_prefix: "S".to_string(),
            zero_paid_settlement: "retain".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timezone(&self) -> Result<Timezone, TemporalError> {
        Timezone::parse(&self.timezone)
    }

    pub fn claim_rules(&self) -> ClaimRules {
        ClaimRules {
            claim_no_prefix: self.claim_no_prefix.clone(),
        }
    }

    /// Unknown values fall back to [`ZeroPaidPolicy::Retain`]
    pub fn zero_paid_policy(&self) -> ZeroPaidPolicy {
        self.zero_paid_settlement.parse().unwrap_or_default()
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            check_interval: Duration::from_secs(self.backup_check_interval_secs.max(1)),
            retry_interval: Duration::from_secs(self.backup_retry_interval_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.claim_rules().claim_no_prefix, "S");
        assert_eq!(config.zero_paid_policy(), ZeroPaidPolicy::Retain);
        assert_eq!(config.scheduler_config(), SchedulerConfig::default());
        assert!(config.timezone().is_ok());
    }

    #[test]
    fn test_zero_paid_policy_parsing() {
        let config = ApiConfig {
            zero_paid_settlement: "mark_not_settled".to_string(),
            ..Default::default()
        };
        assert_eq!(config.zero_paid_policy(), ZeroPaidPolicy::MarkNotSettled);

        let config = ApiConfig {
            zero_paid_settlement: "sometimes".to_string(),
            ..Default::default()
        };
        assert_eq!(config.zero_paid_policy(), ZeroPaidPolicy::Retain);
    }
}
