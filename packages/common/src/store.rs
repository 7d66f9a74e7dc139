//! # Definition Store
//!
//! The boundary to wherever block definitions persist between sessions. The
//! core only ever needs two operations: load the whole list, save the whole
//! list.

use crate::error::StoreResult;
use crate::library::LibraryEntry;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// Persistence capability for the block library
pub trait DefinitionStore {
    /// Load every persisted entry
    fn load(&self) -> StoreResult<Vec<LibraryEntry>>;

    /// Replace the persisted list
    fn save(&self, entries: &[LibraryEntry]) -> StoreResult<()>;
}

/// Shared stores, so a caller can keep a handle to a store it injected
impl<S: DefinitionStore + ?Sized> DefinitionStore for Rc<S> {
    fn load(&self) -> StoreResult<Vec<LibraryEntry>> {
        (**self).load()
    }

    fn save(&self, entries: &[LibraryEntry]) -> StoreResult<()> {
        (**self).save(entries)
    }
}

/// JSON file store. A missing file loads as an empty library.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DefinitionStore for JsonFileStore {
    fn load(&self) -> StoreResult<Vec<LibraryEntry>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Library file missing, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let entries: Vec<LibraryEntry> = serde_json::from_str(&content)?;
        info!(path = %self.path.display(), entries = entries.len(), "Loaded block library");
        Ok(entries)
    }

    fn save(&self, entries: &[LibraryEntry]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        info!(path = %self.path.display(), entries = entries.len(), "Saved block library");
        Ok(())
    }
}

/// In-memory store for tests and embedding
#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<Vec<LibraryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<LibraryEntry>) -> Self {
        Self {
            entries: RefCell::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DefinitionStore for MemoryStore {
    fn load(&self) -> StoreResult<Vec<LibraryEntry>> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, entries: &[LibraryEntry]) -> StoreResult<()> {
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}
