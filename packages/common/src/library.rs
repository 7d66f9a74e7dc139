//! # Block Library
//!
//! The session's view of the persisted block definitions. Entries pair a
//! definition with opaque project data (generated source and the like) that
//! the core passes through to generation requests untouched.

use crate::error::{StoreError, StoreResult};
use crate::store::DefinitionStore;
use blockprompt_parser::{BlockDefinition, DefinitionLookup, ParamDef};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One persisted record: `{def, project}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub def: BlockDefinition,
    #[serde(default)]
    pub project: Value,
}

impl LibraryEntry {
    pub fn new(def: BlockDefinition, project: Value) -> Self {
        Self { def, project }
    }
}

/// Ordered collection of block definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct BlockLibrary {
    entries: Vec<LibraryEntry>,
}

impl BlockLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from entries, rejecting invalid definitions and duplicate ids
    pub fn from_entries(entries: Vec<LibraryEntry>) -> StoreResult<Self> {
        let mut library = Self::new();
        for entry in entries {
            entry.def.validate()?;
            if library.contains(&entry.def.id) {
                return Err(StoreError::DuplicateBlock(entry.def.id));
            }
            library.entries.push(entry);
        }
        Ok(library)
    }

    pub fn load(store: &dyn DefinitionStore) -> StoreResult<Self> {
        Self::from_entries(store.load()?)
    }

    pub fn save(&self, store: &dyn DefinitionStore) -> StoreResult<()> {
        store.save(&self.entries)
    }

    pub fn get(&self, id: &str) -> Option<&BlockDefinition> {
        self.entry(id).map(|e| &e.def)
    }

    pub fn entry(&self, id: &str) -> Option<&LibraryEntry> {
        self.entries.iter().find(|e| e.def.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    /// Add a new entry. Existing definitions are never replaced; they can only
    /// grow through [`BlockLibrary::append_param`].
    pub fn insert(&mut self, entry: LibraryEntry) -> StoreResult<()> {
        entry.def.validate()?;
        if self.contains(&entry.def.id) {
            return Err(StoreError::DuplicateBlock(entry.def.id));
        }
        debug!(block_id = %entry.def.id, "Adding library entry");
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<LibraryEntry> {
        let pos = self.entries.iter().position(|e| e.def.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Extend a definition with a new parameter (the only allowed definition edit)
    pub fn append_param(&mut self, id: &str, param: ParamDef) -> StoreResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.def.id == id)
            .ok_or_else(|| StoreError::BlockNotFound(id.to_string()))?;
        entry.def.append_param(param)?;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.entries.iter()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.entries.iter().map(|e| &e.def)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DefinitionLookup for BlockLibrary {
    fn definition(&self, id: &str) -> Option<&BlockDefinition> {
        self.get(id)
    }

    fn project(&self, id: &str) -> Option<&Value> {
        self.entry(id).map(|e| &e.project)
    }
}

impl FromIterator<BlockDefinition> for BlockLibrary {
    /// Collect definitions with null project data; later duplicates replace earlier ones
    fn from_iter<I: IntoIterator<Item = BlockDefinition>>(iter: I) -> Self {
        let mut library = Self::new();
        for def in iter {
            let entry = LibraryEntry::new(def, Value::Null);
            match library.entries.iter_mut().find(|e| e.def.id == entry.def.id) {
                Some(existing) => *existing = entry,
                None => library.entries.push(entry),
            }
        }
        library
    }
}
