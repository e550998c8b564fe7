//! Log entries handed to hooks.

use crate::level::Level;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A single log event as seen by a [`Hook`](crate::Hook).
///
/// Hooks only read entries; the logging side owns them.
///
/// # Example
///
/// ```
/// use mail_hook::{Entry, Level};
///
/// let entry = Entry::new(Level::Error, "disk full").with_field("volume", "/data");
/// assert_eq!(entry.data["volume"], "/data");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// When the event happened.
    pub time: DateTime<Utc>,
    /// Severity of the event.
    pub level: Level,
    /// Human readable message.
    pub message: String,
    /// Structured fields attached to the event.
    pub data: Map<String, Value>,
}

impl Entry {
    /// Creates an entry stamped with the current time and no fields.
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            level,
            message: message.into(),
            data: Map::new(),
        }
    }

    /// Replaces the timestamp.
    #[must_use]
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Adds (or replaces) a structured field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_methods() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entry = Entry::new(Level::Fatal, "boom")
            .at(time)
            .with_field("attempt", 3)
            .with_field("attempt", 4);

        assert_eq!(entry.time, time);
        assert_eq!(entry.level, Level::Fatal);
        assert_eq!(entry.message, "boom");
        assert_eq!(entry.data.len(), 1);
        assert_eq!(entry.data["attempt"], 4);
    }
}
