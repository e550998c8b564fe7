//! Internal module for reaching SMTP servers.
//!
//! Covers the bounded reachability probe used by the authenticated hook and the
//! long-lived session opened by the unauthenticated one.

use crate::error::{Error, Result};
use lettre::transport::smtp::client::SmtpConnection;
use lettre::transport::smtp::extension::ClientId;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, instrument};

/// Checks that something accepts TCP connections on `target_addr`.
///
/// The connection is closed again right away. Every resolved address is tried
/// in turn, each bounded by `timeout`.
#[instrument(
    name = "connection::probe",
    skip_all,
    fields(target_addr = %target_addr, timeout_ms = timeout.as_millis())
)]
pub(crate) fn probe(target_addr: &str, timeout: Duration) -> Result<()> {
    let addrs = target_addr
        .to_socket_addrs()
        .map_err(|source| Error::TcpConnect {
            target: target_addr.to_string(),
            source,
        })?;

    let mut last_error = None;

    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                debug!(peer = %addr, "Probe connected");
                drop(stream);
                return Ok(());
            }
            Err(e) => {
                debug!(peer = %addr, error = %e, "Probe attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(probe_error(target_addr, timeout, last_error))
}

/// Maps the last failed probe attempt; a timed-out attempt is a [`Error::ConnectTimeout`].
fn probe_error(target_addr: &str, timeout: Duration, last_error: Option<io::Error>) -> Error {
    match last_error {
        Some(e) if e.kind() == io::ErrorKind::TimedOut => Error::ConnectTimeout {
            target: target_addr.to_string(),
            timeout,
        },
        Some(source) => Error::TcpConnect {
            target: target_addr.to_string(),
            source,
        },
        None => Error::TcpConnect {
            target: target_addr.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing"),
        },
    }
}

/// Opens a plain SMTP session and performs the `EHLO` handshake.
#[instrument(
    name = "connection::open_session",
    skip_all,
    fields(smtp_host = %host, port = port)
)]
pub(crate) fn open_session(host: &str, port: u16) -> Result<SmtpConnection> {
    debug!("Opening SMTP session");

    SmtpConnection::connect((host, port), None, &ClientId::default(), None, None).map_err(
        |source| Error::SmtpConnect {
            target: format!("{host}:{port}"),
            source,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_probe_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        assert!(probe(&addr, Duration::from_secs(3)).is_ok());
    }

    #[test]
    fn test_probe_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = probe(&addr, Duration::from_secs(3)).unwrap_err();
        assert!(matches!(err, Error::TcpConnect { .. }), "got {err:?}");
    }

    #[test]
    fn test_probe_unresolvable() {
        let err = probe("not a host", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::TcpConnect { .. }), "got {err:?}");
    }

    #[test]
    fn test_timed_out_attempt_maps_to_timeout() {
        let timeout = Duration::from_millis(250);
        let err = probe_error(
            "smtp.example.com:587",
            timeout,
            Some(io::Error::from(io::ErrorKind::TimedOut)),
        );

        assert!(
            matches!(err, Error::ConnectTimeout { ref target, timeout: t }
                if target == "smtp.example.com:587" && t == timeout),
            "got {err:?}"
        );
        assert_eq!(err.category(), crate::error::ErrorCategory::Timeout);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_failures_map_to_tcp_connect() {
        let timeout = Duration::from_secs(3);

        let refused = probe_error(
            "127.0.0.1:25",
            timeout,
            Some(io::Error::from(io::ErrorKind::ConnectionRefused)),
        );
        assert!(matches!(refused, Error::TcpConnect { .. }), "got {refused:?}");

        let nothing = probe_error("127.0.0.1:25", timeout, None);
        assert!(matches!(nothing, Error::TcpConnect { .. }), "got {nothing:?}");
        assert_eq!(nothing.category(), crate::error::ErrorCategory::Network);
    }
}
