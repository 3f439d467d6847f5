//! Storage for note tables.
//!
//! - `TableRepository` with in-memory and SQLite implementations
//! - `load_table`: one background read producing a `LoadedTable`
//! - `PersistQueue`: write-behind worker for edits
//! - `TableSession`: a `GridModel` wired to the queue

pub mod debounce;
pub mod error;
pub mod load;
pub mod memory;
pub mod persist;
pub mod record;
pub mod repository;
pub mod session;
pub mod sqlite;

pub use debounce::{DebouncedWrites, Debouncer};
pub use error::{LoadError, RepositoryError};
pub use load::{load_table, LoadedTable, PendingLoad};
pub use memory::MemoryRepository;
pub use persist::{PersistCommand, PersistQueue};
pub use record::{StoredCell, StoredColumn, TableData};
pub use repository::{create_table, validate_table_name, RepoResult, TableRepository};
pub use session::TableSession;
pub use sqlite::SqliteRepository;
