//! Validated sender and recipient addresses.
//!
//! Accepts both the bare `local@domain` form and the RFC 5322 display form
//! `Name <local@domain>`. Only the `local@domain` part is ever put on the wire.
//!
//! ```
//! use mail_hook::MailAddress;
//!
//! let addr: MailAddress = "Ops <ops@example.com>".parse().unwrap();
//! assert_eq!(addr.address(), "ops@example.com");
//! assert_eq!(addr.name(), Some("Ops"));
//!
//! assert!("not-an-email".parse::<MailAddress>().is_err());
//! ```

use crate::error::{Error, Result};
use lettre::message::Mailbox;
use lettre::Address;
use std::fmt;
use std::str::FromStr;

/// An email address that passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    name: Option<String>,
    email: Address,
}

impl MailAddress {
    /// Parses and validates an address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the input is not a valid mailbox.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidAddress {
            address: input.to_string(),
        };

        let input_trimmed = input.trim();

        // A bare addr-spec is kept verbatim, quoted local parts and domain literals included
        let mailbox = Address::from_str(input_trimmed)
            .map(|email| Mailbox::new(None, email))
            .or_else(|_| Mailbox::from_str(input_trimmed))
            .map_err(|_| invalid())?;

        Ok(Self {
            name: mailbox.name,
            email: mailbox.email,
        })
    }

    /// Returns the `local@domain` part.
    #[must_use]
    pub fn address(&self) -> &str {
        self.email.as_ref()
    }

    /// Returns the display name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn envelope_address(&self) -> &Address {
        &self.email
    }
}

impl FromStr for MailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_address() {
        let addr = MailAddress::parse("alerts@example.com").unwrap();
        assert_eq!(addr.address(), "alerts@example.com");
        assert_eq!(addr.name(), None);
        assert_eq!(addr.to_string(), "alerts@example.com");

        for input in [
            "root@localhost",
            "\"quoted local\"@example.com",
            "user@[127.0.0.1]",
        ] {
            let addr = MailAddress::parse(input).unwrap();
            assert_eq!(addr.address(), input);
            assert_eq!(addr.name(), None);
        }
    }

    #[test]
    fn test_display_name_form() {
        let addr = MailAddress::parse("On Call <oncall@example.com>").unwrap();
        assert_eq!(addr.address(), "oncall@example.com");
        assert_eq!(addr.name(), Some("On Call"));

        let addr = MailAddress::parse("\"John Doe\" <john@example.com>").unwrap();
        assert_eq!(addr.address(), "john@example.com");
        assert_eq!(addr.name(), Some("John Doe"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let addr = MailAddress::parse("  ops@example.com ").unwrap();
        assert_eq!(addr.address(), "ops@example.com");
    }

    #[test]
    fn test_malformed_addresses() {
        for input in ["", "not-an-email", "user@", "@example.com", "a b@example.com"] {
            let err = MailAddress::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::InvalidAddress { ref address } if address == input),
                "expected InvalidAddress for {input:?}, got {err:?}"
            );
        }
    }
}
