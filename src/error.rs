//! Error types for the mail-hook crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or firing a mail hook.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Malformed sender or recipient address.
    #[error("invalid email address: {address:?}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
    },

    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Network / connection errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to establish TCP connection.
    #[error("failed to connect to {target}")]
    TcpConnect {
        /// The target address that failed.
        target: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open an SMTP session.
    #[error("failed to open SMTP session with {target}")]
    SmtpConnect {
        /// The target address that failed.
        target: String,
        /// The underlying transport error.
        #[source]
        source: lettre::transport::smtp::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Timeout errors (RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// Reachability probe did not connect in time.
    #[error("connection timeout to {target} after {timeout:?}")]
    ConnectTimeout {
        /// The target address.
        target: String,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // SMTP protocol errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The server rejected a command.
    #[error("SMTP {command} command failed")]
    SmtpCommand {
        /// The command verb (`MAIL`, `RCPT`, `DATA`).
        command: &'static str,
        /// The underlying transport error.
        #[source]
        source: lettre::transport::smtp::Error,
    },

    /// Writing or finalizing the message body failed.
    #[error("failed to write message data")]
    SmtpMessage {
        /// The underlying transport error.
        #[source]
        source: lettre::transport::smtp::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering errors (NOT retryable, recovered inside the message builder)
    // ─────────────────────────────────────────────────────────────────────────
    /// Structured fields could not be rendered as JSON.
    #[error("failed to render structured fields")]
    Render {
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// Hooks never retry on their own; this is for the embedding application, which
    /// may want to rebuild a [`MailHook`](crate::MailHook) after its session broke.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::TcpConnect { .. } | Error::SmtpConnect { .. } | Error::ConnectTimeout { .. } => {
                true
            }

            // Transient (4xx) replies are worth another attempt, permanent (5xx) are not
            Error::SmtpCommand { source, .. } | Error::SmtpMessage { source } => {
                source.is_transient()
            }

            Error::InvalidAddress { .. } | Error::InvalidConfig { .. } | Error::Render { .. } => {
                false
            }
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidAddress { .. } => ErrorCategory::AddressFormat,
            Error::InvalidConfig { .. } => ErrorCategory::Configuration,
            Error::TcpConnect { .. } | Error::SmtpConnect { .. } => ErrorCategory::Network,
            Error::ConnectTimeout { .. } => ErrorCategory::Timeout,
            Error::SmtpCommand { .. } | Error::SmtpMessage { .. } => ErrorCategory::Protocol,
            Error::Render { .. } => ErrorCategory::Render,
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed sender or recipient address.
    AddressFormat,
    /// Missing or inconsistent configuration.
    Configuration,
    /// Network connectivity errors.
    Network,
    /// Timeout errors.
    Timeout,
    /// SMTP protocol errors.
    Protocol,
    /// Structured field rendering errors.
    Render,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::AddressFormat => write!(f, "address_format"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Protocol => write!(f, "protocol"),
            ErrorCategory::Render => write!(f, "render"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        // Address errors are not retryable
        let err = Error::InvalidAddress {
            address: "bad".into(),
        };
        assert!(!err.is_retryable());

        // Network errors are retryable
        let err = Error::TcpConnect {
            target: "smtp.example.com:25".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.is_retryable());

        let err = Error::ConnectTimeout {
            target: "smtp.example.com:25".into(),
            timeout: Duration::from_secs(3),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        let err = Error::InvalidAddress {
            address: "bad".into(),
        };
        assert_eq!(err.category(), ErrorCategory::AddressFormat);

        let err = Error::InvalidConfig {
            message: "host is required".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = Error::ConnectTimeout {
            target: "smtp.example.com:25".into(),
            timeout: Duration::from_secs(3),
        };
        assert_eq!(err.category(), ErrorCategory::Timeout);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::Render { source };
        assert_eq!(err.category(), ErrorCategory::Render);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::AddressFormat.to_string(), "address_format");
        assert_eq!(ErrorCategory::Protocol.to_string(), "protocol");
    }
}
