//! Session persistence port

use crate::domain::result::Result;
use crate::domain::PersistedSession;

/// Keeps the auth token and last known user across process restarts
pub trait SessionPersistence: Send + Sync {
    /// Store the session, replacing any previous one
    fn save(&self, session: &PersistedSession) -> Result<()>;

    /// Load the stored session, if any
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Forget the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}
