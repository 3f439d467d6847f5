//! Fire-and-forget persistence.
//!
//! Writes are handed to a worker thread over a channel. `submit` never
//! blocks the caller and a failed write is logged, not returned: the
//! in-memory model stays the source of truth for the open table.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use notegrid_engine::CellStyle;

use crate::record::{StoredColumn, TableData};
use crate::repository::{RepoResult, TableRepository};

#[derive(Debug, Clone, PartialEq)]
pub enum PersistCommand {
    CellContent { row: usize, col: usize, content: String },
    CellStyle { row: usize, col: usize, style: CellStyle },
    RowHeight { row: usize, height: f32 },
    Column(StoredColumn),
    /// Structural change: rewrite the whole table.
    Replace(Box<TableData>),
}

impl PersistCommand {
    fn apply(&self, repo: &dyn TableRepository, table_id: i64) -> RepoResult<()> {
        match self {
            PersistCommand::CellContent { row, col, content } => {
                repo.upsert_cell_content(table_id, *row, *col, content)
            }
            PersistCommand::CellStyle { row, col, style } => {
                repo.upsert_cell_style(table_id, *row, *col, style)
            }
            PersistCommand::RowHeight { row, height } => repo.set_row_height(table_id, *row, *height),
            PersistCommand::Column(column) => repo.update_column(table_id, column),
            PersistCommand::Replace(data) => repo.save_table(table_id, data),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PersistCommand::CellContent { .. } => "cell content",
            PersistCommand::CellStyle { .. } => "cell style",
            PersistCommand::RowHeight { .. } => "row height",
            PersistCommand::Column(_) => "column",
            PersistCommand::Replace(_) => "table",
        }
    }
}

enum Message {
    Write(i64, PersistCommand),
    Flush(mpsc::Sender<()>),
}

pub struct PersistQueue {
    tx: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
    failures: Arc<AtomicUsize>,
}

impl PersistQueue {
    pub fn new(repo: Arc<dyn TableRepository>) -> Self {
        let (tx, rx) = mpsc::channel::<Message>();
        let failures = Arc::new(AtomicUsize::new(0));
        let worker_failures = Arc::clone(&failures);

        let worker = thread::Builder::new()
            .name("notegrid-persist".into())
            .spawn(move || {
                for message in rx {
                    match message {
                        Message::Write(table_id, command) => {
                            if let Err(e) = command.apply(repo.as_ref(), table_id) {
                                worker_failures.fetch_add(1, Ordering::Relaxed);
                                log::warn!(
                                    "failed to save {} for table {table_id}: {e}",
                                    command.label()
                                );
                            }
                        }
                        Message::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("could not start persist worker: {e}");
                None
            }
        };
        Self { tx: Some(tx), worker, failures }
    }

    /// Queue a write. Returns false if the worker is gone.
    pub fn submit(&self, table_id: i64, command: PersistCommand) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        match tx.send(Message::Write(table_id, command)) {
            Ok(()) => true,
            Err(e) => {
                if let Message::Write(_, command) = e.0 {
                    log::warn!("persist worker stopped, dropping {} write", command.label());
                }
                false
            }
        }
    }

    /// Block until everything submitted so far has been applied.
    pub fn flush(&self) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        let (done_tx, done_rx) = mpsc::channel();
        if tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Writes that failed since the queue started.
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

impl Drop for PersistQueue {
    fn drop(&mut self) {
        // Closing the channel ends the worker after it drains.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("persist worker panicked");
            }
        }
    }
}
