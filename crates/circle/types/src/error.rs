use thiserror::Error;

/// Errors loading or validating [`crate::AccountingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors validating a group creation request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("group name must not be empty")]
    EmptyName,

    #[error("monthly amount must be positive")]
    NonPositiveAmount,

    #[error("max members {requested} outside allowed range {min}..={max}")]
    MemberLimit { requested: u32, min: u32, max: u32 },

    #[error("private groups require a non-empty secret code")]
    MissingSecretCode,

    #[error("community verification requires a group handle")]
    MissingCommunityHandle,

    #[error("treasury window {window} exceeds max members {max_members}")]
    TreasuryWindowTooLarge { window: u32, max_members: u32 },

    #[error("pot of {monthly_amount} x {max_members} overflows")]
    PotOverflow { monthly_amount: u64, max_members: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_limit_display() {
        let err = ValidationError::MemberLimit {
            requested: 80,
            min: 3,
            max: 50,
        };
        let s = err.to_string();
        assert!(s.contains("80"));
        assert!(s.contains("3..=50"));
    }
}
