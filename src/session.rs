//! Internal SMTP session management.
//!
//! This module wraps the individual SMTP transaction steps with proper error handling.

use crate::address::MailAddress;
use crate::error::{Error, Result};
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::commands::{Data, Mail, Rcpt, Rset};
use lettre::{AsyncSmtpTransport, AsyncTransport, SmtpTransport, Tokio1Executor, Transport};
use tracing::{debug, instrument};

/// Declares sender and recipient for the next message (`MAIL FROM` / `RCPT TO`).
#[instrument(
    name = "session::declare_envelope",
    skip_all,
    fields(from = %from, to = %to)
)]
pub(crate) fn declare_envelope(
    connection: &mut SmtpConnection,
    from: &MailAddress,
    to: &MailAddress,
) -> Result<()> {
    connection
        .command(Mail::new(Some(from.envelope_address().clone()), vec![]))
        .map_err(|source| Error::SmtpCommand {
            command: "MAIL",
            source,
        })?;

    connection
        .command(Rcpt::new(to.envelope_address().clone(), vec![]))
        .map_err(|source| Error::SmtpCommand {
            command: "RCPT",
            source,
        })?;

    debug!("Envelope declared");

    Ok(())
}

/// Requests the data channel (`DATA`).
pub(crate) fn open_data(connection: &mut SmtpConnection) -> Result<()> {
    connection
        .command(Data)
        .map_err(|source| Error::SmtpCommand {
            command: "DATA",
            source,
        })?;

    Ok(())
}

/// Aborts a half-open transaction (`RSET`) so the next `MAIL FROM` is accepted.
///
/// Failures only get logged: the caller is already reporting a better error.
pub(crate) fn reset(connection: &mut SmtpConnection) {
    if connection.has_broken() {
        return;
    }

    if let Err(e) = connection.command(Rset) {
        debug!(error = %e, "RSET failed");
    }
}

/// Writes the message body; the transport terminates it with `<CRLF>.<CRLF>`.
#[instrument(name = "session::write_message", skip_all, fields(bytes = message.len()))]
pub(crate) fn write_message(connection: &mut SmtpConnection, message: &[u8]) -> Result<()> {
    connection
        .message(message)
        .map_err(|source| Error::SmtpMessage { source })?;

    debug!("Message accepted");

    Ok(())
}

/// Everything a detached delivery needs, owned so it can move to another thread.
pub(crate) struct Delivery {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
    pub envelope: Envelope,
    pub message: Vec<u8>,
}

impl Delivery {
    /// Connects, authenticates with `AUTH PLAIN`, sends and quits, all on a tokio runtime.
    #[instrument(
        name = "session::deliver_async",
        skip_all,
        fields(smtp_host = %self.host, port = self.port)
    )]
    pub(crate) async fn send_async(self) -> std::result::Result<(), lettre::transport::smtp::Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            .port(self.port)
            .credentials(self.credentials)
            .authentication(vec![Mechanism::Plain])
            .build();

        transport.send_raw(&self.envelope, &self.message).await?;
        Ok(())
    }

    /// Blocking counterpart of [`send_async`](Self::send_async).
    #[instrument(
        name = "session::deliver_blocking",
        skip_all,
        fields(smtp_host = %self.host, port = self.port)
    )]
    pub(crate) fn send_blocking(self) -> std::result::Result<(), lettre::transport::smtp::Error> {
        let transport = SmtpTransport::builder_dangerous(&self.host)
            .port(self.port)
            .credentials(self.credentials)
            .authentication(vec![Mechanism::Plain])
            .build();

        transport.send_raw(&self.envelope, &self.message)?;
        Ok(())
    }
}
