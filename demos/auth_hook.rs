//! Example: Authenticated, fire-and-forget alerts.
//!
//! Each alert opens its own SMTP session and authenticates with AUTH PLAIN.
//! `fire` returns immediately; the delivery runs as a tokio task.
//!
//! # Usage
//!
//! ```bash
//! export SMTP_HOST="smtp.example.com"
//! export SMTP_PORT="587"
//! export SMTP_USERNAME="mailer"
//! export SMTP_PASSWORD="app-password"
//! export ALERT_FROM="alerts@example.com"
//! export ALERT_TO="oncall@example.com"
//!
//! cargo run --example auth_hook
//! ```

use mail_hook::{Entry, ErrorCategory, Hook, HookConfig, Level, MailAuthHook};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> mail_hook::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("mail_hook=debug")
        .init();

    let config = HookConfig::builder()
        .app_name("auth-hook-demo")
        .host(env::var("SMTP_HOST").expect("SMTP_HOST environment variable required"))
        .port(
            env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
        )
        .from(env::var("ALERT_FROM").expect("ALERT_FROM environment variable required"))
        .to(env::var("ALERT_TO").expect("ALERT_TO environment variable required"))
        .credentials(
            env::var("SMTP_USERNAME").expect("SMTP_USERNAME environment variable required"),
            env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD environment variable required"),
        )
        .probe_timeout(Duration::from_secs(5))
        .build()?;

    println!("Using {config:?}");

    let mut hook = match MailAuthHook::with_config(config) {
        Ok(hook) => hook,
        Err(e) => {
            match e.category() {
                ErrorCategory::Network | ErrorCategory::Timeout => {
                    println!("SMTP server not reachable: {e}");
                }
                ErrorCategory::AddressFormat => println!("Bad address: {e}"),
                _ => println!("Cannot build hook: {e}"),
            }
            return Err(e);
        }
    };

    let entry = Entry::new(Level::Fatal, "Ledger checksum mismatch")
        .with_field("ledger", "eu-2024-01")
        .with_field("expected", "9f2c")
        .with_field("actual", "0000");

    hook.fire(&entry)?;
    println!("Alert dispatched; fire returned without waiting");

    // The delivery task dies with the runtime, give it a moment
    tokio::time::sleep(Duration::from_secs(5)).await;

    Ok(())
}
