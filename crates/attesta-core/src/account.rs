//! Normalized account identifiers.
//!
//! Every entity carries a wallet/account identifier that external systems
//! reference in webhook payloads. Identifiers are compared and stored in a
//! single normalized form: trimmed and lowercased. Normalization happens at
//! the boundary so two deliveries naming `0xAB..` and `0xab..` resolve to
//! the same entity.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted length of a raw account identifier.
pub const MAX_ACCOUNT_ID_LEN: usize = 128;

/// Error returned when an account identifier cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAccountIdError {
    #[error("account identifier is empty")]
    Empty,

    #[error("account identifier exceeds {MAX_ACCOUNT_ID_LEN} characters")]
    TooLong,

    #[error("account identifier contains whitespace or control characters")]
    InvalidCharacters,
}

/// A normalized (trimmed, lowercase) account identifier.
///
/// Construction via [`FromStr`] is the only way to obtain one, so any
/// `AccountId` in the system is already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = ParseAccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseAccountIdError::Empty);
        }
        if trimmed.chars().count() > MAX_ACCOUNT_ID_LEN {
            return Err(ParseAccountIdError::TooLong);
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ParseAccountIdError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let id: AccountId = "  0xDeadBeef01  ".parse().unwrap();
        assert_eq!(id.as_str(), "0xdeadbeef01");
    }

    #[test]
    fn test_already_normalized_is_unchanged() {
        let id: AccountId = "provider-7f3a".parse().unwrap();
        assert_eq!(id.as_str(), "provider-7f3a");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            "   ".parse::<AccountId>().unwrap_err(),
            ParseAccountIdError::Empty
        );
    }

    #[test]
    fn test_rejects_too_long() {
        let long = "a".repeat(MAX_ACCOUNT_ID_LEN + 1);
        assert_eq!(
            long.parse::<AccountId>().unwrap_err(),
            ParseAccountIdError::TooLong
        );
    }

    #[test]
    fn test_rejects_interior_whitespace() {
        assert_eq!(
            "wallet one".parse::<AccountId>().unwrap_err(),
            ParseAccountIdError::InvalidCharacters
        );
    }

    #[test]
    fn test_equal_after_normalization() {
        let a: AccountId = "0xABCD".parse().unwrap();
        let b: AccountId = "0xabcd".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id: AccountId = "treasury-main".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"treasury-main\"");
    }
}
