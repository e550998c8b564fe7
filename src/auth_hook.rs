//! Hook delivering each alert over its own authenticated SMTP session.

use crate::address::MailAddress;
use crate::config::HookConfig;
use crate::connection;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::hook::Hook;
use crate::level::{Level, ALERT_LEVELS};
use crate::message::build_message;
use crate::session::Delivery;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

/// Mails log entries with `AUTH PLAIN`, one fire-and-forget session per alert.
///
/// Construction only checks that the server is reachable; nothing stays
/// connected between alerts. [`fire`](Hook::fire) renders the message on the
/// calling thread, hands delivery to a detached unit of work and returns
/// `Ok(())` right away. Delivery failures are dropped: an alert that cannot be
/// sent is lost.
///
/// The detached unit is a task on the current tokio runtime when there is one,
/// and a dedicated thread otherwise.
///
/// # Example
///
/// ```no_run
/// use mail_hook::{Entry, Hook, Level, MailAuthHook};
///
/// # fn example() -> mail_hook::Result<()> {
/// let mut hook = MailAuthHook::new(
///     "billing",
///     "smtp.example.com",
///     587,
///     "alerts@example.com",
///     "oncall@example.com",
///     "mailer",
///     "app-password",
/// )?;
///
/// hook.fire(&Entry::new(Level::Fatal, "ledger corrupted"))?;
/// # Ok(())
/// # }
/// ```
pub struct MailAuthHook {
    app_name: String,
    host: String,
    port: u16,
    from: MailAddress,
    to: MailAddress,
    username: String,
    password: SecretString,
    envelope: Envelope,
}

impl MailAuthHook {
    /// Validates the addresses and probes `host:port` (3 second bound).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either address is malformed ([`Error::InvalidAddress`])
    /// - The probe times out ([`Error::ConnectTimeout`]) or fails ([`Error::TcpConnect`])
    pub fn new(
        app_name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        from: &str,
        to: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let config = HookConfig::builder()
            .app_name(app_name)
            .host(host)
            .port(port)
            .from(from)
            .to(to)
            .credentials(username, password)
            .build()?;

        Self::with_config(config)
    }

    /// Same as [`new`](Self::new), from a prepared configuration.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new); additionally [`Error::InvalidConfig`] when the
    /// configuration carries no credentials.
    #[instrument(
        name = "MailAuthHook::new",
        skip_all,
        fields(
            app_name = %config.app_name,
            smtp_host = %config.host,
            port = config.port
        )
    )]
    pub fn with_config(config: HookConfig) -> Result<Self> {
        let (Some(username), Some(password)) = (config.username(), config.password()) else {
            return Err(Error::InvalidConfig {
                message: "credentials are required for an authenticated hook".into(),
            });
        };
        let username = username.to_string();
        let password = SecretString::from(password.to_string());

        connection::probe(&config.server_address(), config.probe_timeout)?;

        let envelope = Envelope::new(
            Some(config.from().envelope_address().clone()),
            vec![config.to().envelope_address().clone()],
        )
        .map_err(|e| Error::InvalidConfig {
            message: format!("cannot build envelope: {e}"),
        })?;

        debug!("Authenticated hook ready");

        Ok(Self {
            from: config.from().clone(),
            to: config.to().clone(),
            app_name: config.app_name,
            host: config.host,
            port: config.port,
            username,
            password,
            envelope,
        })
    }

    /// Returns the application name used in subjects.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the SMTP server address as "host:port".
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn delivery(&self, message: Vec<u8>) -> Delivery {
        Delivery {
            host: self.host.clone(),
            port: self.port,
            credentials: Credentials::new(
                self.username.clone(),
                self.password.expose_secret().to_owned(),
            ),
            envelope: self.envelope.clone(),
            message,
        }
    }
}

impl Hook for MailAuthHook {
    fn levels(&self) -> &[Level] {
        &ALERT_LEVELS
    }

    /// Renders the alert and dispatches its delivery. Always returns `Ok(())`.
    #[instrument(
        name = "MailAuthHook::fire",
        skip_all,
        fields(app_name = %self.app_name, level = %entry.level)
    )]
    fn fire(&mut self, entry: &Entry) -> Result<()> {
        // Rendered here so the trace shows the caller, not the delivery task
        let message = build_message(entry, &self.app_name, self.from.address(), self.to.address());

        dispatch(self.delivery(message));

        Ok(())
    }
}

/// Runs `delivery` detached from the caller; its outcome is never reported back.
fn dispatch(delivery: Delivery) {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(async move {
            if let Err(e) = delivery.send_async().await {
                debug!(error = %e, "Alert delivery failed, discarding");
            }
        });
        return;
    }

    let spawned = std::thread::Builder::new()
        .name("mail-hook-delivery".into())
        .spawn(move || {
            if let Err(e) = delivery.send_blocking() {
                debug!(error = %e, "Alert delivery failed, discarding");
            }
        });

    if let Err(e) = spawned {
        debug!(error = %e, "Could not start delivery thread, discarding alert");
    }
}

impl std::fmt::Debug for MailAuthHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailAuthHook")
            .field("app_name", &self.app_name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from.address())
            .field("to", &self.to.address())
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[test]
    fn test_levels() {
        let (_listener, port) = listener();
        let hook = MailAuthHook::new(
            "svc",
            "127.0.0.1",
            port,
            "alerts@example.com",
            "oncall@example.com",
            "user",
            "pass",
        )
        .unwrap();

        assert_eq!(hook.levels(), &[Level::Panic, Level::Fatal, Level::Error]);
        assert_eq!(hook.server_address(), format!("127.0.0.1:{port}"));
    }

    #[test]
    fn test_requires_credentials() {
        let (_listener, port) = listener();
        let config = HookConfig::builder()
            .host("127.0.0.1")
            .port(port)
            .from("alerts@example.com")
            .to("oncall@example.com")
            .build()
            .unwrap();

        let err = MailAuthHook::with_config(config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }), "got {err:?}");
    }

    #[test]
    fn test_password_not_in_debug() {
        let (_listener, port) = listener();
        let hook = MailAuthHook::new(
            "svc",
            "127.0.0.1",
            port,
            "alerts@example.com",
            "oncall@example.com",
            "user",
            "hunter2-password",
        )
        .unwrap();

        let debug_str = format!("{hook:?}");
        assert!(!debug_str.contains("hunter2-password"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_fire_with_unreachable_host_returns_ok() {
        let (listener, port) = listener();
        let mut hook = MailAuthHook::new(
            "svc",
            "127.0.0.1",
            port,
            "alerts@example.com",
            "oncall@example.com",
            "user",
            "pass",
        )
        .unwrap();
        drop(listener);

        let entry = Entry::new(Level::Error, "disk full");
        assert!(hook.fire(&entry).is_ok());
    }
}
