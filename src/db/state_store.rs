//! Persisted monitor state.
//!
//! The document is one JSON file. Saves go to a temporary file in the same
//! directory which is synced and then renamed over the canonical path, so a
//! crash never leaves a truncated document behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StateError;
use crate::models::GlobalState;

pub trait StateStore: Send + Sync {
    /// Load the persisted document. A missing document is an empty state.
    fn load(&self) -> Result<GlobalState, StateError>;

    /// Persist the document. Saving an unchanged document writes nothing.
    fn save(&self, state: &GlobalState) -> Result<(), StateError>;
}

/// Load state, falling back to an empty document when the stored one is
/// unreadable.
pub fn load_or_default(store: &dyn StateStore) -> Result<GlobalState, StateError> {
    match store.load() {
        Ok(state) => Ok(state),
        Err(e @ StateError::Corrupt { .. }) => {
            warn!(error = %e, "State document is corrupt, starting from empty state");
            Ok(GlobalState::new())
        }
        Err(e) => Err(e),
    }
}

/// Canonical serialized form shared by every store.
pub fn encode(state: &GlobalState) -> Result<Vec<u8>, StateError> {
    let mut bytes = serde_json::to_vec_pretty(state)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<GlobalState, StateError> {
    serde_json::from_slice(bytes).map_err(|source| StateError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StateError {
        StateError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> Result<GlobalState, StateError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file, starting fresh");
                return Ok(GlobalState::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        decode(&self.path, &bytes)
    }

    fn save(&self, state: &GlobalState) -> Result<(), StateError> {
        let bytes = encode(state)?;

        if let Ok(existing) = fs::read(&self.path) {
            if existing == bytes {
                debug!(path = %self.path.display(), "State unchanged, skipping write");
                return Ok(());
            }
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&bytes).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "State saved");
        Ok(())
    }
}

/// In-memory store holding the serialized document (for tests and dry runs
/// against a scratch state).
#[derive(Default)]
pub struct InMemoryStateStore {
    document: Mutex<Option<Vec<u8>>>,
    writes: Mutex<usize>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw document bytes, which need not be valid JSON.
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            document: Mutex::new(Some(bytes.into())),
            writes: Mutex::new(0),
        }
    }

    pub fn document(&self) -> Option<Vec<u8>> {
        self.document.lock().ok().and_then(|d| d.clone())
    }

    /// Number of saves that changed the document.
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self) -> Result<GlobalState, StateError> {
        let document = self.document.lock().map_err(|_| StateError::Io {
            path: PathBuf::from("<memory>"),
            source: std::io::Error::other("state lock poisoned"),
        })?;
        match document.as_deref() {
            Some(bytes) => decode(Path::new("<memory>"), bytes),
            None => Ok(GlobalState::new()),
        }
    }

    fn save(&self, state: &GlobalState) -> Result<(), StateError> {
        let bytes = encode(state)?;
        let mut document = self.document.lock().map_err(|_| StateError::Io {
            path: PathBuf::from("<memory>"),
            source: std::io::Error::other("state lock poisoned"),
        })?;
        if document.as_deref() == Some(bytes.as_slice()) {
            return Ok(());
        }
        *document = Some(bytes);
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
