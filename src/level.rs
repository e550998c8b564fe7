//! Severity levels of log entries.

use std::fmt;
use std::str::FromStr;

/// Levels a mail hook reacts to.
///
/// Both [`MailHook`](crate::MailHook) and [`MailAuthHook`](crate::MailAuthHook)
/// report exactly this set.
pub const ALERT_LEVELS: [Level; 3] = [Level::Panic, Level::Fatal, Level::Error];

/// Severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Finest-grained diagnostics.
    Trace,
    /// Debugging information.
    Debug,
    /// Routine operational messages.
    Info,
    /// Something unexpected that the application recovered from.
    Warn,
    /// An operation failed.
    Error,
    /// The application is about to exit.
    Fatal,
    /// The application panicked.
    Panic,
}

impl Level {
    /// Returns the lowercase display name used in subjects.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
        }
    }

    /// Returns `true` if this level is one of [`ALERT_LEVELS`].
    #[must_use]
    pub fn is_alert(self) -> bool {
        ALERT_LEVELS.contains(&self)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown level: {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "panic" => Ok(Level::Panic),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
        assert!(Level::Fatal < Level::Panic);
    }

    #[test]
    fn test_alert_levels() {
        assert!(Level::Panic.is_alert());
        assert!(Level::Fatal.is_alert());
        assert!(Level::Error.is_alert());
        for level in [Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert!(!level.is_alert(), "{level} must not alert");
        }
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Level::Error.to_string(), "error");
        assert_eq!(Level::Warn.to_string(), "warning");
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("panic".parse::<Level>(), Ok(Level::Panic));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Trace);
    }
}
