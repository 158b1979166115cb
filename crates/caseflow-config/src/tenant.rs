//! Tenant isolation configuration.
//!
//! - `TENANT_COLUMN`: Column that partitions rows by center (default: `center_id`)
//! - `MISSING_CENTER_POLICY`: What to do when a center-restricted caller
//!   carries no usable center id. `allow` runs the query unscoped, `deny`
//!   rejects the request with 403. Default: `allow`.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_COLUMN: &str = "center_id";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TenantConfigError {
    #[error("TENANT_COLUMN must be a plain SQL identifier, got {0:?}")]
    InvalidColumn(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingCenterPolicy {
    /// Run the query without a center predicate.
    #[default]
    Allow,
    /// Refuse to run the query.
    Deny,
}

impl FromStr for MissingCenterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" | "open" => Ok(Self::Allow),
            "deny" | "closed" => Ok(Self::Deny),
            other => Err(format!("unknown missing-center policy: {}", other)),
        }
    }
}

impl fmt::Display for MissingCenterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Deny => f.write_str("deny"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantConfig {
    pub column: String,
    pub missing_center_policy: MissingCenterPolicy,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            column: DEFAULT_COLUMN.to_string(),
            missing_center_policy: MissingCenterPolicy::Allow,
        }
    }
}

impl TenantConfig {
    /// Reads `TENANT_COLUMN` and `MISSING_CENTER_POLICY`. A column name that
    /// is not a plain identifier stops startup, since every scoped statement
    /// would be built around it.
    pub fn from_env() -> Result<Self, TenantConfigError> {
        Self::from_values(
            env::var("TENANT_COLUMN").ok(),
            env::var("MISSING_CENTER_POLICY").ok(),
        )
    }

    pub fn from_values(
        column: Option<String>,
        missing_center_policy: Option<String>,
    ) -> Result<Self, TenantConfigError> {
        let column = column
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COLUMN.to_string());
        if !is_identifier(&column) {
            return Err(TenantConfigError::InvalidColumn(column));
        }

        let missing_center_policy = match missing_center_policy {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring MISSING_CENTER_POLICY, using allow");
                MissingCenterPolicy::Allow
            }),
            None => MissingCenterPolicy::default(),
        };

        Ok(Self {
            column,
            missing_center_policy,
        })
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the same rule the query builder enforces.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "allow".parse::<MissingCenterPolicy>(),
            Ok(MissingCenterPolicy::Allow)
        );
        assert_eq!(
            " DENY ".parse::<MissingCenterPolicy>(),
            Ok(MissingCenterPolicy::Deny)
        );
        assert_eq!(
            "closed".parse::<MissingCenterPolicy>(),
            Ok(MissingCenterPolicy::Deny)
        );
        assert!("maybe".parse::<MissingCenterPolicy>().is_err());
    }

    #[test]
    fn test_default_is_fail_open() {
        let config = TenantConfig::default();
        assert_eq!(config.column, "center_id");
        assert_eq!(config.missing_center_policy, MissingCenterPolicy::Allow);
    }

    #[test]
    fn test_column_from_values() {
        let config = TenantConfig::from_values(Some(" org_id ".to_string()), None).unwrap();
        assert_eq!(config.column, "org_id");

        let config = TenantConfig::from_values(Some(String::new()), Some("deny".to_string())).unwrap();
        assert_eq!(config.column, "center_id");
        assert_eq!(config.missing_center_policy, MissingCenterPolicy::Deny);
    }

    #[test]
    fn test_invalid_column_is_refused() {
        for column in ["center id", "t.center_id", "center_id; DROP TABLE users", "1st"] {
            assert_eq!(
                TenantConfig::from_values(Some(column.to_string()), None),
                Err(TenantConfigError::InvalidColumn(column.to_string())),
                "{}",
                column
            );
        }
    }
}
