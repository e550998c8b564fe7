//! Alert message construction.
//!
//! The payload is a minimal CRLF-terminated email: optional `From:` and `To:`
//! headers, a `Subject:` header, a blank line and a free-form body:
//!
//! ```text
//! From: alerts@example.com
//! To: oncall@example.com
//! Subject: svc - error
//!
//! 20240101 00:00:00 - disk full
//!
//! Frame 00:
//!     File: src/main.rs
//!     ...
//!
//! Data:
//!
//! {
//!     "volume": "/data"
//! }
//! ```
//!
//! No MIME structure is declared; the body is plain text with raw JSON.

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::trace::StackTrace;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use tracing::debug;

/// Timestamp layout of the first body line.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// Builds the alert payload for `entry`, including a trace of the current call stack.
///
/// Empty `from` or `to` leave out the matching header.
#[must_use]
#[inline(never)]
pub fn build_message(entry: &Entry, app_name: &str, from: &str, to: &str) -> Vec<u8> {
    let trace = StackTrace::capture();
    render_message(entry, app_name, from, to, &trace)
}

/// Renders the alert payload with an already captured trace.
///
/// Deterministic: the same inputs always give byte-identical output.
#[must_use]
pub fn render_message(
    entry: &Entry,
    app_name: &str,
    from: &str,
    to: &str,
    trace: &StackTrace,
) -> Vec<u8> {
    let fields = render_fields(&entry.data).unwrap_or_else(|e| {
        debug!(error = %e, "Dropping structured fields from alert");
        String::new()
    });

    let mut message = String::new();

    if !from.is_empty() {
        message.push_str(&format!("From: {from}\r\n"));
    }
    if !to.is_empty() {
        message.push_str(&format!("To: {to}\r\n"));
    }
    message.push_str(&format!("Subject: {app_name} - {}\r\n\r\n", entry.level));

    message.push_str(&format!(
        "{} - {}\r\n\r\n",
        entry.time.format(TIMESTAMP_FORMAT),
        entry.message
    ));
    message.push_str(&trace.to_string());
    message.push_str("\r\n\r\nData:\r\n\r\n");
    message.push_str(&fields);
    message.push_str("\r\n\r\n");

    message.into_bytes()
}

/// Renders structured fields as tab-indented JSON with sorted keys.
///
/// # Errors
///
/// Returns [`Error::Render`] if serialization fails.
pub fn render_fields(data: &Map<String, Value>) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    data.serialize(&mut serializer)
        .map_err(|source| Error::Render { source })?;

    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::trace::{Frame, MAX_DEPTH};
    use chrono::{TimeZone, Utc};

    fn disk_full() -> Entry {
        Entry::new(Level::Error, "disk full")
            .at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_field("volume", "/data")
    }

    fn fixed_trace() -> StackTrace {
        StackTrace::from_frames(
            vec![Some(Frame {
                file: "src/main.rs".into(),
                function: "svc::main".into(),
                line: 12,
                pc: 0xabc,
                entry: 0xa00,
            })],
            MAX_DEPTH,
        )
    }

    fn render(from: &str, to: &str) -> String {
        let bytes = render_message(&disk_full(), "svc", from, to, &fixed_trace());
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_full_layout() {
        let expected = "From: alerts@example.com\r\n\
                        To: oncall@example.com\r\n\
                        Subject: svc - error\r\n\
                        \r\n\
                        20240101 00:00:00 - disk full\r\n\
                        \r\n\
                        Frame 00:\r\n\
                        \tFile: src/main.rs\r\n\
                        \tFunction: svc::main\r\n\
                        \tLine: 12\r\n\
                        \tPC/Entry: 0x00000abc/0x00000a00\r\n\
                        \r\n\
                        \r\n\
                        Data:\r\n\
                        \r\n\
                        {\n\t\"volume\": \"/data\"\n}\r\n\
                        \r\n";

        assert_eq!(render("alerts@example.com", "oncall@example.com"), expected);
    }

    #[test]
    fn test_headers_follow_address_presence() {
        let neither = render("", "");
        assert!(neither.starts_with("Subject: svc - error\r\n"));
        assert!(!neither.contains("From:"));
        assert!(!neither.contains("To:"));

        let only_from = render("alerts@example.com", "");
        assert_eq!(only_from.matches("From: alerts@example.com\r\n").count(), 1);
        assert!(!only_from.contains("To:"));

        let only_to = render("", "oncall@example.com");
        assert!(only_to.starts_with("To: oncall@example.com\r\nSubject:"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render("a@example.com", "b@example.com"), render("a@example.com", "b@example.com"));
    }

    #[test]
    fn test_fields_sorted_and_tab_indented() {
        let mut data = Map::new();
        data.insert("zone".into(), Value::from("eu-1"));
        data.insert("attempts".into(), Value::from(3));
        data.insert("nested".into(), serde_json::json!({ "ok": false }));

        let rendered = render_fields(&data).unwrap();
        assert_eq!(
            rendered,
            "{\n\t\"attempts\": 3,\n\t\"nested\": {\n\t\t\"ok\": false\n\t},\n\t\"zone\": \"eu-1\"\n}"
        );
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(render_fields(&Map::new()).unwrap(), "{}");
    }

    #[test]
    fn test_build_message_includes_trace() {
        let message = build_message(&disk_full(), "svc", "", "");
        let text = String::from_utf8(message).unwrap();

        assert!(text.starts_with("Subject: svc - error\r\n\r\n20240101 00:00:00 - disk full\r\n\r\n"));
        assert!(text.contains("\r\n\r\nData:\r\n\r\n{\n\t\"volume\": \"/data\"\n}\r\n\r\n"));
        assert!(text.matches("Frame ").count() <= MAX_DEPTH);
    }
}
