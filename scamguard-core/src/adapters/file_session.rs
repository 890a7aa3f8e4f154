//! JSON file session persistence
//!
//! Stores the session in `session.json` inside the data directory. Writes
//! go to a temp file that is renamed over the old one while an advisory
//! lock on `session.lock` is held, so concurrent processes never see a
//! half-written file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::PersistedSession;
use crate::ports::SessionPersistence;

const SESSION_FILE: &str = "session.json";
const DEMO_SESSION_FILE: &str = "demo-session.json";
const LOCK_FILE: &str = "session.lock";

/// File-backed [`SessionPersistence`]
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
    file_name: &'static str,
}

impl FileSessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.to_path_buf(),
            file_name: SESSION_FILE,
        }
    }

    /// Separate file so demo logins never leak into real sessions
    pub fn demo(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.to_path_buf(),
            file_name: DEMO_SESSION_FILE,
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(self.file_name)
    }

    /// Run `f` while holding the exclusive lock file
    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        fs::create_dir_all(&self.dir)?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        lock.lock_exclusive()
            .map_err(|e| Error::persistence(format!("Failed to lock session file: {}", e)))?;

        let result = f();
        let _ = lock.unlock();
        result
    }
}

impl SessionPersistence for FileSessionStore {
    fn save(&self, session: &PersistedSession) -> Result<()> {
        self.locked(|| {
            let content = serde_json::to_string_pretty(session)?;

            let mut tmp = NamedTempFile::new_in(&self.dir)?;
            tmp.write_all(content.as_bytes())?;
            tmp.as_file().sync_all()?;
            restrict_permissions(tmp.path())?;
            tmp.persist(self.path()).map_err(|e| Error::Io(e.error))?;

            debug!(token = %session.token.fingerprint(), "Session saved");
            Ok(())
        })
    }

    fn load(&self) -> Result<Option<PersistedSession>> {
        self.locked(|| {
            let content = match fs::read_to_string(self.path()) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            // A corrupt file means "not logged in", not a startup failure
            match serde_json::from_str(&content) {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable session file");
                    Ok(None)
                }
            }
        })
    }

    fn clear(&self) -> Result<()> {
        self.locked(|| match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthToken, User};
    use tempfile::TempDir;

    fn session() -> PersistedSession {
        PersistedSession::new(AuthToken::new("tok-1"), User::new(7, "Ana", true))
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.save(&session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user, User::new(7, "Ana", true));
        assert_eq!(loaded.token, AuthToken::new("tok-1"));
    }

    #[test]
    fn test_save_replaces_previous() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.save(&session()).unwrap();
        store
            .save(&PersistedSession::new(AuthToken::new("tok-2"), User::new(8, "Bao", false)))
            .unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user.id, 8);
        assert_eq!(loaded.token.as_str(), "tok-2");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        store.save(&session()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileSessionStore::new(&nested);

        store.save(&session()).unwrap();
        assert!(nested.join(SESSION_FILE).exists());
    }

    #[test]
    fn test_demo_sessions_are_separate() {
        let dir = TempDir::new().unwrap();
        let real = FileSessionStore::new(dir.path());
        let demo = FileSessionStore::demo(dir.path());

        demo.save(&session()).unwrap();
        assert!(real.load().unwrap().is_none());
        assert!(demo.load().unwrap().is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&session()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
