//! The contract between a logging pipeline and a mail hook.

use crate::entry::Entry;
use crate::error::Result;
use crate::level::Level;

/// A listener that reacts to log entries.
///
/// The logging side must only call [`fire`](Hook::fire) for entries whose level
/// is in [`levels`](Hook::levels).
pub trait Hook: Send {
    /// Levels this hook wants to be fired for.
    fn levels(&self) -> &[Level];

    /// Handles one entry.
    ///
    /// # Errors
    ///
    /// Implementation specific; see [`MailHook`](crate::MailHook) and
    /// [`MailAuthHook`](crate::MailAuthHook).
    fn fire(&mut self, entry: &Entry) -> Result<()>;
}
