//! # mail-hook
//!
//! Logging hooks that mail panics, fatal errors and errors over SMTP.
//!
//! Each alert is a small plain-text email: the subject names the application
//! and the level, the body carries the timestamp, the message, a trace of the
//! call stack that raised it and the structured fields as JSON.
//!
//! Two hooks are provided:
//! - [`MailHook`] keeps one unauthenticated SMTP session open and writes every
//!   alert on it, blocking the caller until the server accepted the message.
//! - [`MailAuthHook`] authenticates with `AUTH PLAIN` on a fresh session per
//!   alert, delivered in the background. The caller never waits and never sees
//!   delivery errors.
//!
//! Both report [`ALERT_LEVELS`] (`Panic`, `Fatal`, `Error`) as the levels they
//! want to be fired for.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mail_hook::{Entry, Hook, Level, MailHook};
//!
//! # fn example() -> mail_hook::Result<()> {
//! let mut hook = MailHook::new("billing", "localhost", 25, "alerts@example.com", "oncall@example.com")?;
//!
//! let entry = Entry::new(Level::Error, "disk full").with_field("volume", "/data");
//! hook.fire(&entry)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using `tracing`
//!
//! [`MailLayer`] adapts any hook to a `tracing_subscriber` layer:
//!
//! ```no_run
//! use mail_hook::{MailAuthHook, MailLayer};
//! use tracing_subscriber::prelude::*;
//!
//! # fn example() -> mail_hook::Result<()> {
//! let hook = MailAuthHook::new(
//!     "billing",
//!     "smtp.example.com",
//!     587,
//!     "alerts@example.com",
//!     "oncall@example.com",
//!     "mailer",
//!     "app-password",
//! )?;
//!
//! tracing_subscriber::registry()
//!     .with(MailLayer::new(hook))
//!     .init();
//!
//! tracing::error!(invoice = 42, "charge failed");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Construction errors are returned to the caller. Use [`Error::category`] to
//! tell a malformed address from an unreachable server:
//!
//! ```
//! use mail_hook::{ErrorCategory, MailHook};
//!
//! let err = MailHook::new("svc", "localhost", 25, "not-an-email", "oncall@example.com")
//!     .unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::AddressFormat);
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for its own instrumentation and never emits
//! events above `WARN`, so its diagnostics cannot fire a hook.
//!
//! ### Span Naming Convention
//!
//! - `MailHook::connect` - Unauthenticated session setup
//! - `MailHook::fire` - Writing one alert
//! - `MailAuthHook::new` - Reachability probe
//! - `MailAuthHook::fire` - Rendering and dispatching one alert
//! - `session::deliver_async` / `session::deliver_blocking` - Detached delivery
//! - `connection::probe` / `connection::open_session` - Network setup
//!
//! ### Standard Fields
//!
//! - `app_name` - Application name of the hook
//! - `smtp_host` - SMTP server hostname
//! - `level` - Level of the alert being sent

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod error;
pub mod layer;
pub mod level;
pub mod message;
pub mod trace;

// Internal modules
mod address;
mod auth_hook;
mod connection;
mod entry;
mod hook;
mod mail_hook;
mod session;

// Re-exports for ergonomic API
pub use address::MailAddress;
pub use auth_hook::MailAuthHook;
pub use config::{HookConfig, HookConfigBuilder};
pub use entry::Entry;
pub use error::{Error, ErrorCategory, Result};
pub use hook::Hook;
pub use layer::MailLayer;
pub use level::{Level, ALERT_LEVELS};
pub use mail_hook::MailHook;
