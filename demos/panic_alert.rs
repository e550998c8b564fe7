//! Example: Mailing panics.
//!
//! Installs a panic hook that mails a `panic` alert before the default panic
//! message is printed, then panics on purpose.
//!
//! # Usage
//!
//! ```bash
//! export SMTP_HOST="localhost"
//! export SMTP_PORT="1025"
//! export ALERT_FROM="alerts@example.com"
//! export ALERT_TO="oncall@example.com"
//!
//! cargo run --example panic_alert
//! ```

use mail_hook::{MailHook, MailLayer};
use std::env;
use tracing_subscriber::prelude::*;

fn main() -> mail_hook::Result<()> {
    dotenvy::dotenv().ok();

    let host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("SMTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(25);
    let from = env::var("ALERT_FROM").expect("ALERT_FROM environment variable required");
    let to = env::var("ALERT_TO").expect("ALERT_TO environment variable required");

    let layer = MailLayer::new(MailHook::new("panic-demo", host, port, &from, &to)?);
    layer.install_panic_hook();

    tracing_subscriber::registry()
        .with(layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("About to panic");

    let config: Vec<u32> = Vec::new();
    let _first = config[0];

    Ok(())
}
