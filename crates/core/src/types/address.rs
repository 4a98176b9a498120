//! User-supplied contact address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ContactAddress`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Nothing was entered.
    #[error("email address cannot be empty")]
    Empty,
    /// The input does not contain an @ symbol.
    #[error("email address must contain an @ symbol")]
    MissingAtSymbol,
}

/// An email address typed into the support form.
///
/// The only structural rule is the presence of an `@`; the relay is the final
/// judge of deliverability. Surrounding whitespace is trimmed.
///
/// ```
/// use slack_mailbridge_core::ContactAddress;
///
/// assert!(ContactAddress::parse("jane@example.com").is_ok());
/// assert!(ContactAddress::parse("  jane@example.com\n").is_ok());
/// assert!(ContactAddress::parse("not-an-email").is_err());
/// assert!(ContactAddress::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ContactAddress(String);

impl ContactAddress {
    /// Parse a contact address.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or has no `@`.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        if !trimmed.contains('@') {
            return Err(AddressError::MissingAtSymbol);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ContactAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ContactAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(ContactAddress::parse("jane@example.com").is_ok());
        assert!(ContactAddress::parse("a@b").is_ok());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let address = ContactAddress::parse("  jane@example.com \n").expect("valid");
        assert_eq!(address.as_str(), "jane@example.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ContactAddress::parse(""), Err(AddressError::Empty));
        assert_eq!(ContactAddress::parse("   "), Err(AddressError::Empty));
    }

    #[test]
    fn test_parse_missing_at() {
        assert_eq!(
            ContactAddress::parse("not-an-email"),
            Err(AddressError::MissingAtSymbol)
        );
    }
}
