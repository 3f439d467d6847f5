//! Background table load.
//!
//! One worker reads columns, cells and row heights together and sends a
//! single `LoadedTable` back, so the UI thread never sees a table with
//! columns but no cells.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use notegrid_config::Settings;
use notegrid_engine::GridModel;

use crate::error::LoadError;
use crate::record::TableData;
use crate::repository::TableRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table_id: i64,
    pub data: TableData,
}

impl LoadedTable {
    pub fn into_model(self, settings: &Settings) -> GridModel {
        self.data.into_model(settings)
    }
}

/// Result of `load_table`, not yet received.
pub struct PendingLoad {
    table_id: i64,
    rx: Receiver<Result<LoadedTable, LoadError>>,
    done: bool,
}

impl PendingLoad {
    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<LoadedTable, LoadError> {
        self.rx.recv().map_err(|_| LoadError::Interrupted)?
    }

    /// Non-blocking poll for a UI loop. `None` while still loading and
    /// after the result has been taken.
    pub fn try_take(&mut self) -> Option<Result<LoadedTable, LoadError>> {
        if self.done {
            return None;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.done = true;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                Some(Err(LoadError::Interrupted))
            }
        }
    }
}

pub fn load_table(repo: Arc<dyn TableRepository>, table_id: i64) -> PendingLoad {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name(format!("notegrid-load-{table_id}"))
        .spawn(move || {
            let result = repo
                .load_table(table_id)
                .map(|data| {
                    log::debug!(
                        "loaded table {table_id}: {} rows, {} cells",
                        data.row_count,
                        data.cells.len()
                    );
                    LoadedTable { table_id, data }
                })
                .map_err(LoadError::from);
            // Receiver may be gone if the table was closed mid-load.
            let _ = tx.send(result);
        });
    if let Err(e) = spawned {
        log::warn!("could not start loader for table {table_id}: {e}");
    }
    PendingLoad { table_id, rx, done: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::memory::MemoryRepository;

    #[test]
    fn test_load_builds_model() {
        let settings = Settings::default();
        let repo = Arc::new(MemoryRepository::new());
        let mut data = TableData::blank(2, 2, &settings);
        data.cells.push(crate::record::StoredCell {
            row: 1,
            col: 1,
            content: "42".into(),
            style: Default::default(),
        });
        let id = repo.insert_table("t", &data).unwrap();

        let loaded = load_table(repo, id).wait().unwrap();
        assert_eq!(loaded.table_id, id);
        let model = loaded.into_model(&settings);
        assert_eq!(model.content(1, 1), Some("42"));
        assert_eq!(model.col_count(), 2);
    }

    #[test]
    fn test_missing_table_error() {
        let repo = Arc::new(MemoryRepository::new());
        let err = load_table(repo, 5).wait().unwrap_err();
        assert_eq!(err, LoadError::Repository(RepositoryError::TableNotFound(5)));
    }

    #[test]
    fn test_try_take_yields_once() {
        let repo = Arc::new(MemoryRepository::new());
        let id = repo.insert_table("t", &TableData::default()).unwrap();
        let mut pending = load_table(repo, id);
        let result = loop {
            if let Some(result) = pending.try_take() {
                break result;
            }
            std::thread::yield_now();
        };
        assert!(result.is_ok());
        assert!(pending.try_take().is_none());
    }
}
