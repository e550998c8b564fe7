//! Configuration for mail hooks.
//!
//! Use [`HookConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use mail_hook::HookConfig;
//!
//! let config = HookConfig::builder()
//!     .app_name("billing")
//!     .host("smtp.example.com")
//!     .from("alerts@example.com")
//!     .to("oncall@example.com")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.server_address(), "smtp.example.com:25");
//! ```

use crate::address::MailAddress;
use crate::error::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Default SMTP port.
pub const DEFAULT_PORT: u16 = 25;

/// Default bound for the reachability probe of [`MailAuthHook`](crate::MailAuthHook).
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Configuration shared by both hook variants.
///
/// Create using [`HookConfig::builder()`]. Addresses are validated when the
/// configuration is built, so a `HookConfig` never holds a malformed address.
///
/// Note: the password is stored as a [`SecretString`] to prevent accidental logging.
#[derive(Clone)]
pub struct HookConfig {
    /// Application name, used as the subject prefix.
    pub app_name: String,
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port (default: 25).
    pub port: u16,
    from: MailAddress,
    to: MailAddress,
    credentials: Option<SmtpCredentials>,
    /// Bound for the construction-time reachability probe (default: 3 seconds).
    pub probe_timeout: Duration,
}

#[derive(Clone)]
struct SmtpCredentials {
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookConfig")
            .field("app_name", &self.app_name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from.address())
            .field("to", &self.to.address())
            .field("username", &self.username())
            .field(
                "password",
                &self.credentials.as_ref().map(|_| "[REDACTED]"),
            )
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}

impl HookConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> HookConfigBuilder {
        HookConfigBuilder::default()
    }

    /// Returns the validated sender.
    #[must_use]
    pub fn from(&self) -> &MailAddress {
        &self.from
    }

    /// Returns the validated recipient.
    #[must_use]
    pub fn to(&self) -> &MailAddress {
        &self.to
    }

    /// Returns the SMTP username, if credentials were configured.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    /// Returns the SMTP password, if credentials were configured.
    ///
    /// The password is intentionally not directly accessible to prevent accidental logging.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.credentials
            .as_ref()
            .map(|c| c.password.expose_secret())
    }

    /// Returns the full SMTP server address as "host:port".
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for [`HookConfig`].
#[derive(Debug, Default)]
pub struct HookConfigBuilder {
    app_name: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    from: Option<String>,
    to: Option<String>,
    username: Option<String>,
    password: Option<String>,
    probe_timeout: Option<Duration>,
}

impl HookConfigBuilder {
    /// Sets the application name used in the subject line.
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Sets the SMTP server hostname (required).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the SMTP server port.
    ///
    /// Default is 25.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the sender address (required).
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the recipient address (required).
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the `AUTH PLAIN` credentials.
    ///
    /// Required by [`MailAuthHook`](crate::MailAuthHook), ignored by [`MailHook`](crate::MailHook).
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the bound for the reachability probe.
    #[must_use]
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if a required field is missing and
    /// [`Error::InvalidAddress`] if an address is malformed.
    pub fn build(self) -> Result<HookConfig> {
        let host = self.host.ok_or_else(|| Error::InvalidConfig {
            message: "host is required".into(),
        })?;

        let from_raw = self.from.ok_or_else(|| Error::InvalidConfig {
            message: "sender address is required".into(),
        })?;
        let to_raw = self.to.ok_or_else(|| Error::InvalidConfig {
            message: "recipient address is required".into(),
        })?;

        let from = MailAddress::parse(&from_raw)?;
        let to = MailAddress::parse(&to_raw)?;

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(SmtpCredentials {
                username,
                password: SecretString::from(password),
            }),
            _ => None,
        };

        Ok(HookConfig {
            app_name: self.app_name.unwrap_or_default(),
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            from,
            to,
            credentials,
            probe_timeout: self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> HookConfigBuilder {
        HookConfig::builder()
            .host("smtp.example.com")
            .from("alerts@example.com")
            .to("oncall@example.com")
    }

    #[test]
    fn test_builder_minimal() {
        let config = minimal().build().unwrap();

        assert_eq!(config.app_name, "");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.probe_timeout, Duration::from_secs(3));
        assert_eq!(config.from().address(), "alerts@example.com");
        assert_eq!(config.to().address(), "oncall@example.com");
        assert!(config.username().is_none());
        assert!(config.password().is_none());
    }

    #[test]
    fn test_builder_full() {
        let config = minimal()
            .app_name("billing")
            .port(2525)
            .credentials("mailer", "secret")
            .probe_timeout(Duration::from_millis(500))
            .build()
            .unwrap();

        assert_eq!(config.app_name, "billing");
        assert_eq!(config.server_address(), "smtp.example.com:2525");
        assert_eq!(config.username(), Some("mailer"));
        assert_eq!(config.password(), Some("secret"));
        assert_eq!(config.probe_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_builder_missing_fields() {
        let result = HookConfig::builder()
            .from("alerts@example.com")
            .to("oncall@example.com")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));

        let result = HookConfig::builder()
            .host("smtp.example.com")
            .to("oncall@example.com")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_invalid_address() {
        let result = minimal().to("not-an-email").build();
        assert!(matches!(result, Err(Error::InvalidAddress { .. })));
    }

    #[test]
    fn test_password_not_in_debug() {
        let config = minimal()
            .credentials("mailer", "super-secret-password")
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("super-secret-password"));
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("mailer"));
    }
}
