//! Accounting configuration.
//!
//! Every field has a default so a partial (or absent) TOML file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for payout, treasury and membership rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingConfig {
    /// Interest rate in basis points applied per normalization step (700 = 7%).
    #[serde(default = "default_interest_rate_bps")]
    pub interest_rate_bps: u32,

    /// Number of positions past the treasury window that earn one full rate step.
    #[serde(default = "default_interest_normalization")]
    pub interest_normalization: u32,

    /// Treasury window used when a group does not set its own.
    #[serde(default = "default_treasury_window")]
    pub default_treasury_window: u32,

    /// Smallest allowed group size.
    #[serde(default = "default_min_members")]
    pub min_members: u32,

    /// Largest allowed group size.
    #[serde(default = "default_max_members")]
    pub max_members: u32,

    /// Days before the due date at which a contribution reminder becomes due.
    #[serde(default = "default_reminder_lead_days")]
    pub reminder_lead_days: u32,

    /// Attempts at reserving a payout slot before a join gives up on contention.
    #[serde(default = "default_join_retry_limit")]
    pub join_retry_limit: u32,

    /// Refuse payouts the treasury balance cannot fund.
    #[serde(default)]
    pub enforce_treasury_solvency: bool,
}

fn default_interest_rate_bps() -> u32 {
    700
}

fn default_interest_normalization() -> u32 {
    10
}

fn default_treasury_window() -> u32 {
    2
}

fn default_min_members() -> u32 {
    3
}

fn default_max_members() -> u32 {
    50
}

fn default_reminder_lead_days() -> u32 {
    3
}

fn default_join_retry_limit() -> u32 {
    8
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            interest_rate_bps: default_interest_rate_bps(),
            interest_normalization: default_interest_normalization(),
            default_treasury_window: default_treasury_window(),
            min_members: default_min_members(),
            max_members: default_max_members(),
            reminder_lead_days: default_reminder_lead_days(),
            join_retry_limit: default_join_retry_limit(),
            enforce_treasury_solvency: false,
        }
    }
}

impl AccountingConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AccountingConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when no path
    /// is given or the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interest_normalization == 0 {
            return Err(ConfigError::Invalid(
                "interest_normalization must be at least 1".into(),
            ));
        }
        if self.min_members < 2 {
            return Err(ConfigError::Invalid("min_members must be at least 2".into()));
        }
        if self.min_members > self.max_members {
            return Err(ConfigError::Invalid(format!(
                "min_members {} exceeds max_members {}",
                self.min_members, self.max_members
            )));
        }
        if self.default_treasury_window > self.max_members {
            return Err(ConfigError::Invalid(format!(
                "default_treasury_window {} exceeds max_members {}",
                self.default_treasury_window, self.max_members
            )));
        }
        if self.join_retry_limit == 0 {
            return Err(ConfigError::Invalid(
                "join_retry_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AccountingConfig::default();
        assert_eq!(config.interest_rate_bps, 700);
        assert_eq!(config.interest_normalization, 10);
        assert_eq!(config.default_treasury_window, 2);
        assert_eq!((config.min_members, config.max_members), (3, 50));
        assert!(!config.enforce_treasury_solvency);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AccountingConfig::from_toml_str(
            "interest_rate_bps = 500\nenforce_treasury_solvency = true\n",
        )
        .unwrap();
        assert_eq!(config.interest_rate_bps, 500);
        assert!(config.enforce_treasury_solvency);
        assert_eq!(config.max_members, 50);
    }

    #[test]
    fn rejects_zero_normalization() {
        let err = AccountingConfig::from_toml_str("interest_normalization = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_member_bounds() {
        let err =
            AccountingConfig::from_toml_str("min_members = 10\nmax_members = 5").unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AccountingConfig::from_toml_str("interest_rate_bps = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_config() {
        let config =
            AccountingConfig::load(Some(Path::new("/nonexistent/circle/accounting.toml"))).unwrap();
        assert_eq!(config, AccountingConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reminder_lead_days = 5").unwrap();
        let config = AccountingConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.reminder_lead_days, 5);
    }
}
