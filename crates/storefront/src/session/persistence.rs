//! Persistent slot holding the serialized [`Session`] snapshot.
//!
//! The store reads the slot once at startup, writes it on login success and
//! removes it on logout or failed login. Writes are best-effort: the remote
//! API is the source of truth, so a lost snapshot only means logging in again.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Session;

/// Name of the snapshot slot.
pub const SNAPSHOT_SLOT: &str = "user";

/// Errors raised by a [`SessionPersistence`] backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading, writing or removing the slot failed.
    #[error("session storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// The session could not be serialized.
    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Load/save/clear capability injected into the session store.
pub trait SessionPersistence {
    /// Read the snapshot, `Ok(None)` when the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<Option<Session>, PersistenceError>;

    /// Replace the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, session: &Session) -> Result<(), PersistenceError>;

    /// Empty the slot. Clearing an empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot exists but cannot be removed.
    fn clear(&self) -> Result<(), PersistenceError>;
}

// =============================================================================
// File-backed slot
// =============================================================================

/// Snapshot stored as a single JSON file.
///
/// Writes go to `<file>.tmp` and are renamed over the target, so readers
/// never observe a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/user.json`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{SNAPSHOT_SLOT}.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn load(&self) -> Result<Option<Session>, PersistenceError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to deserialize session snapshot; treating as logged out"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        let tmp_path = self.tmp_path();
        let json = serde_json::to_vec_pretty(session)?;
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-memory slot
// =============================================================================

/// Process-local slot. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    slot: RefCell<Option<Session>>,
}

impl MemorySessionPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a snapshot already in the slot.
    #[must_use]
    pub fn with_snapshot(session: Session) -> Self {
        Self {
            slot: RefCell::new(Some(session)),
        }
    }

    /// Current slot contents.
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.slot.borrow().clone()
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn load(&self) -> Result<Option<Session>, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &Session) -> Result<(), PersistenceError> {
        *self.slot.borrow_mut() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

impl<P: SessionPersistence + ?Sized> SessionPersistence for &P {
    fn load(&self) -> Result<Option<Session>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), PersistenceError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}
