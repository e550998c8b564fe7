//! Hook delivering over a single, unauthenticated SMTP session.
//!
//! # Example
//!
//! ```no_run
//! use mail_hook::{Entry, Hook, Level, MailHook};
//!
//! # fn example() -> mail_hook::Result<()> {
//! let mut hook = MailHook::new("billing", "localhost", 25, "alerts@example.com", "oncall@example.com")?;
//!
//! hook.fire(&Entry::new(Level::Error, "payment provider unreachable"))?;
//! # Ok(())
//! # }
//! ```

use crate::address::MailAddress;
use crate::config::HookConfig;
use crate::connection;
use crate::entry::Entry;
use crate::error::Result;
use crate::hook::Hook;
use crate::level::{Level, ALERT_LEVELS};
use crate::message::build_message;
use crate::session;
use lettre::transport::smtp::client::SmtpConnection;
use tracing::{debug, instrument, warn};

/// Mails log entries through one SMTP session opened at construction.
///
/// The session is owned by the hook for its whole lifetime and is closed with
/// `QUIT` when the hook is dropped. Sender and recipient are pinned on the
/// session; after each message they are declared again on the same connection.
///
/// # Concurrency
///
/// [`fire`](Hook::fire) takes `&mut self` and blocks for the whole network
/// write. The session has no internal locking: sharing a hook between threads
/// means wrapping it in a lock of your own, as [`MailLayer`](crate::MailLayer) does.
///
/// A transaction refused midway (`RCPT` or `DATA` rejected) is cleared with
/// `RSET`, and the next fire declares the envelope again. A session closed by
/// the server is never reopened: later fires report the transport error, and
/// a new hook is needed to recover.
pub struct MailHook {
    app_name: String,
    from: MailAddress,
    to: MailAddress,
    connection: SmtpConnection,
    envelope_declared: bool,
}

impl MailHook {
    /// Connects to `host:port` and pins `from` and `to` on the session.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either address is malformed ([`Error::InvalidAddress`](crate::Error::InvalidAddress)),
    ///   in which case no connection is attempted
    /// - The server cannot be reached ([`Error::SmtpConnect`](crate::Error::SmtpConnect))
    /// - The server rejects sender or recipient ([`Error::SmtpCommand`](crate::Error::SmtpCommand))
    pub fn new(
        app_name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        from: &str,
        to: &str,
    ) -> Result<Self> {
        let config = HookConfig::builder()
            .app_name(app_name)
            .host(host)
            .port(port)
            .from(from)
            .to(to)
            .build()?;

        Self::with_config(config)
    }

    /// Same as [`new`](Self::new), from a prepared configuration.
    ///
    /// Credentials and probe timeout in the configuration are not used.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    #[instrument(
        name = "MailHook::connect",
        skip_all,
        fields(
            app_name = %config.app_name,
            smtp_host = %config.host,
            port = config.port
        )
    )]
    pub fn with_config(config: HookConfig) -> Result<Self> {
        let mut connection = connection::open_session(&config.host, config.port)?;

        session::declare_envelope(&mut connection, config.from(), config.to())?;

        debug!("Hook connected and ready");

        Ok(Self {
            from: config.from().clone(),
            to: config.to().clone(),
            app_name: config.app_name,
            connection,
            envelope_declared: true,
        })
    }

    /// Returns the application name used in subjects.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the pinned sender.
    #[must_use]
    pub fn from(&self) -> &MailAddress {
        &self.from
    }

    /// Returns the pinned recipient.
    #[must_use]
    pub fn to(&self) -> &MailAddress {
        &self.to
    }

    /// Declares the envelope if the previous message used it up, then opens `DATA`.
    fn open_transaction(&mut self) -> Result<()> {
        if !self.envelope_declared {
            session::declare_envelope(&mut self.connection, &self.from, &self.to)?;
            self.envelope_declared = true;
        }

        session::open_data(&mut self.connection)
    }
}

impl Hook for MailHook {
    fn levels(&self) -> &[Level] {
        &ALERT_LEVELS
    }

    /// Writes one alert on the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SmtpCommand`](crate::Error::SmtpCommand) if the server refuses
    /// the data channel (or the re-declared envelope) and
    /// [`Error::SmtpMessage`](crate::Error::SmtpMessage) if writing the message fails.
    #[instrument(
        name = "MailHook::fire",
        skip_all,
        fields(app_name = %self.app_name, level = %entry.level)
    )]
    fn fire(&mut self, entry: &Entry) -> Result<()> {
        if let Err(e) = self.open_transaction() {
            // Start over with MAIL FROM on the next fire
            session::reset(&mut self.connection);
            self.envelope_declared = false;
            return Err(e);
        }

        // Once DATA is accepted the transaction ends with this message, delivered or not
        self.envelope_declared = false;

        let message = build_message(entry, &self.app_name, self.from.address(), self.to.address());

        session::write_message(&mut self.connection, &message)
    }
}

impl Drop for MailHook {
    fn drop(&mut self) {
        if self.connection.has_broken() {
            return;
        }

        match self.connection.quit() {
            Ok(_) => debug!("SMTP session closed"),
            Err(e) => warn!(error = %e, "SMTP session did not close cleanly"),
        }
    }
}

impl std::fmt::Debug for MailHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailHook")
            .field("app_name", &self.app_name)
            .field("from", &self.from.address())
            .field("to", &self.to.address())
            .field("envelope_declared", &self.envelope_declared)
            .finish_non_exhaustive()
    }
}
