pub mod error;
pub mod library;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use library::{BlockLibrary, LibraryEntry};
pub use store::{DefinitionStore, JsonFileStore, MemoryStore};
