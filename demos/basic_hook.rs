//! Example: Mailing error events from a `tracing` subscriber.
//!
//! Events at ERROR level are mailed through a single unauthenticated SMTP
//! session, everything else is only printed. Point it at a local relay or a
//! catch-all test server such as MailHog.
//!
//! # Usage
//!
//! ```bash
//! export SMTP_HOST="localhost"
//! export SMTP_PORT="1025"
//! export ALERT_FROM="alerts@example.com"
//! export ALERT_TO="oncall@example.com"
//! # Set log level (trace, debug, info, warn, error)
//! export RUST_LOG=mail_hook=debug,info
//!
//! cargo run --example basic_hook
//! ```

use mail_hook::{MailHook, MailLayer};
use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> mail_hook::Result<()> {
    dotenvy::dotenv().ok();

    let host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("SMTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(25);
    let from = env::var("ALERT_FROM").expect("ALERT_FROM environment variable required");
    let to = env::var("ALERT_TO").expect("ALERT_TO environment variable required");

    let hook = MailHook::new("basic-hook-demo", host, port, &from, &to)?;

    // Mail layer first, so it sees every event regardless of the fmt filter
    tracing_subscriber::registry()
        .with(MailLayer::new(hook))
        .with(
            tracing_subscriber::fmt::layer().with_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            ),
        )
        .init();

    tracing::info!(from = %from, to = %to, "Mail hook installed");
    tracing::warn!("This warning is not mailed");
    tracing::error!(volume = "/data", free_bytes = 0u64, "Disk full");

    tracing::info!("Done, check the inbox of {}", to);

    Ok(())
}
