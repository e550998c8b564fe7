//! `tracing` integration.
//!
//! [`MailLayer`] turns `tracing` events into [`Entry`] values and fires a
//! [`Hook`] for the levels it asks for. The `message` field becomes the entry
//! message; every other field lands in the entry's structured data.
//!
//! ```no_run
//! use mail_hook::{MailHook, MailLayer};
//! use tracing_subscriber::prelude::*;
//!
//! # fn example() -> mail_hook::Result<()> {
//! let hook = MailHook::new("billing", "localhost", 25, "alerts@example.com", "oncall@example.com")?;
//! let layer = MailLayer::new(hook);
//! layer.install_panic_hook();
//!
//! tracing_subscriber::registry().with(layer).init();
//!
//! tracing::error!(invoice = 42, "charge failed");
//! # Ok(())
//! # }
//! ```

use crate::entry::Entry;
use crate::hook::Hook;
use crate::level::Level;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{warn, Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// A [`Layer`] that fires a [`Hook`] for matching events.
///
/// The hook sits behind a mutex, so fires coming from different threads are
/// serialized. Errors returned by the hook are reported as `WARN` events,
/// which never fire the hook again.
pub struct MailLayer<H> {
    hook: Arc<Mutex<H>>,
    levels: Vec<Level>,
}

impl<H: Hook + 'static> MailLayer<H> {
    /// Wraps `hook`, remembering the levels it reports.
    #[must_use]
    pub fn new(hook: H) -> Self {
        let levels = hook.levels().to_vec();
        Self {
            hook: Arc::new(Mutex::new(hook)),
            levels,
        }
    }

    /// Returns `true` if entries at `level` reach the hook.
    #[must_use]
    pub fn fires_for(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// Fires the hook for `entry` if its level is one the hook asked for.
    ///
    /// Hook errors are reported with `warn!` and otherwise dropped.
    pub fn dispatch(&self, entry: &Entry) {
        if !self.fires_for(entry.level) {
            return;
        }
        fire(&self.hook, entry);
    }

    /// Chains a process-wide panic hook that mails a [`Level::Panic`] entry.
    ///
    /// The entry carries the panic payload as message and the source location
    /// as `location` field. The previously installed panic hook runs afterwards.
    /// Nothing is sent if the hook does not report [`Level::Panic`], or if any
    /// thread holds the hook at the moment of the panic (the panicking thread
    /// included).
    pub fn install_panic_hook(&self) {
        if !self.fires_for(Level::Panic) {
            return;
        }

        let hook = Arc::clone(&self.hook);
        let previous = std::panic::take_hook();

        std::panic::set_hook(Box::new(move |info| {
            let payload = info.payload();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Box<dyn Any>".to_string());

            let mut entry = Entry::new(Level::Panic, message);
            if let Some(location) = info.location() {
                entry = entry.with_field(
                    "location",
                    format!("{}:{}:{}", location.file(), location.line(), location.column()),
                );
            }

            // Skipped while any thread holds the hook, so a panic inside fire cannot deadlock
            if let Ok(mut hook) = hook.try_lock() {
                if let Err(e) = hook.fire(&entry) {
                    warn!(error = %e, "Failed to fire mail hook for panic");
                }
            }

            previous(info);
        }));
    }
}

impl<H> fmt::Debug for MailLayer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailLayer")
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

impl<S, H> Layer<S> for MailLayer<H>
where
    S: Subscriber,
    H: Hook + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = Level::from(*event.metadata().level());
        if !self.fires_for(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut entry = Entry::new(level, visitor.message.unwrap_or_default());
        entry.data = visitor.fields;

        fire(&self.hook, &entry);
    }
}

fn fire<H: Hook>(hook: &Mutex<H>, entry: &Entry) {
    let result = hook
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .fire(entry);

    // Reported after the lock is released; WARN never reaches the hook
    if let Err(e) = result {
        warn!(error = %e, category = %e.category(), "Failed to fire mail hook");
    }
}

/// Collects event fields into JSON values.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}
