//! Session persistence.
//!
//! The controller treats persistence as an injectable collaborator: one
//! slot holding the whole serialized [`Session`], overwritten on every
//! mutation. [`FileSessionStore`] is what the CLI uses;
//! [`MemorySessionStore`] backs tests and in-process embedding.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use hwa_core::Session;
use thiserror::Error;

/// Errors from the persisted session slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The slot could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The slot's contents are not a valid serialized session.
    #[error("Corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A single-slot store for the persisted session.
///
/// Implementations are last-write-wins: no cross-process locking is
/// attempted, matching how the console treats the slot as a
/// single-writer-at-a-time resource.
pub trait SessionStore: Send + Sync {
    /// Read the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Overwrite the slot with the whole serialized session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be written.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Empty the slot. Clearing an already-empty slot succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot exists but cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

/// File-backed session slot.
///
/// The file holds exactly one JSON-serialized session, the same record
/// the original console kept under its `hwa_admin_session` storage key.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the session file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(session)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory session slot.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a session.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot.lock().map_or(None, |slot| slot.clone()))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
        Ok(())
    }
}
