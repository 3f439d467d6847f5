/// Undo/Redo log for grid operations
///
/// The log only stores records; `GridModel` knows how to apply them
/// forward and backward. Records address rows in DATA space so a
/// reorder between the edit and its undo does not misplace it.
use chrono::{DateTime, Utc};
use notegrid_core::{RowKey, SortDirection};

use crate::cell::{CellData, CellStyle};
use crate::column::Column;
use crate::filter::ColumnFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    AddRow,
    DeleteRow,
    AddColumn,
    DeleteColumn,
    UpdateCell,
    UpdateStyle,
    UpdateColumn,
    SortColumn,
    FilterColumn,
}

/// Sort and filter state, captured before and after a view change
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub row_order: Vec<usize>,
    pub visible_mask: Vec<bool>,
    pub sort: Option<(usize, SortDirection)>,
    pub filters: Vec<(usize, ColumnFilter)>,
}

#[derive(Clone, Debug)]
pub enum Change {
    RowInserted {
        data_row: usize,
        view_row: usize,
        key: RowKey,
    },
    RowDeleted {
        data_row: usize,
        view_row: usize,
        key: RowKey,
        visible: bool,
        cells: Vec<CellData>,
        base_height: Option<f32>,
    },
    ColumnInserted {
        col: usize,
        column: Column,
    },
    ColumnDeleted {
        col: usize,
        column: Column,
        cells: Vec<CellData>,
        /// Row visibility before a filtered column was removed
        visible_mask: Option<Vec<bool>>,
        /// Row order before the sorted column was removed
        row_order: Option<Vec<usize>>,
    },
    CellUpdated {
        data_row: usize,
        col: usize,
        old_value: String,
        new_value: String,
    },
    StyleUpdated {
        data_row: usize,
        col: usize,
        old_style: CellStyle,
        new_style: CellStyle,
    },
    ColumnUpdated {
        col: usize,
        old_column: Column,
        new_column: Column,
    },
    ViewChanged {
        col: usize,
        before: ViewState,
        after: ViewState,
    },
}

#[derive(Clone, Debug)]
pub struct Operation {
    pub kind: OperationKind,
    pub timestamp: DateTime<Utc>,
    pub change: Change,
}

impl Operation {
    pub fn new(kind: OperationKind, change: Change) -> Self {
        Self { kind, timestamp: Utc::now(), change }
    }

    /// Row (data space) or column the operation touched
    pub fn position(&self) -> usize {
        match &self.change {
            Change::RowInserted { data_row, .. }
            | Change::RowDeleted { data_row, .. }
            | Change::CellUpdated { data_row, .. }
            | Change::StyleUpdated { data_row, .. } => *data_row,
            Change::ColumnInserted { col, .. }
            | Change::ColumnDeleted { col, .. }
            | Change::ColumnUpdated { col, .. }
            | Change::ViewChanged { col, .. } => *col,
        }
    }
}

pub struct UndoRedoLog {
    undo_stack: Vec<Operation>,
    redo_stack: Vec<Operation>,
    max_entries: usize,
}

impl Default for UndoRedoLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl UndoRedoLog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record an operation; clears the redo stack
    pub fn record(&mut self, kind: OperationKind, change: Change) {
        self.push(Operation::new(kind, change));
    }

    pub fn push(&mut self, operation: Operation) {
        self.undo_stack.push(operation);
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the last operation for undo; it moves to the redo stack
    pub fn undo(&mut self) -> Option<Operation> {
        let operation = self.undo_stack.pop()?;
        self.redo_stack.push(operation.clone());
        Some(operation)
    }

    /// Pop from the redo stack; it moves back to the undo stack
    pub fn redo(&mut self) -> Option<Operation> {
        let operation = self.redo_stack.pop()?;
        self.undo_stack.push(operation.clone());
        Some(operation)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undoable operation
    pub fn last(&self) -> Option<&Operation> {
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_update(row: usize, old: &str, new: &str) -> Change {
        Change::CellUpdated {
            data_row: row,
            col: 1,
            old_value: old.into(),
            new_value: new.into(),
        }
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut log = UndoRedoLog::default();
        assert!(log.undo().is_none());
        assert!(log.redo().is_none());
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_undo_moves_to_redo_and_back() {
        let mut log = UndoRedoLog::default();
        log.record(OperationKind::UpdateCell, cell_update(2, "a", "b"));

        let op = log.undo().unwrap();
        assert_eq!(op.kind, OperationKind::UpdateCell);
        assert_eq!(op.position(), 2);
        assert!(!log.can_undo());
        assert!(log.can_redo());

        log.redo().unwrap();
        assert!(log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut log = UndoRedoLog::default();
        log.record(OperationKind::UpdateCell, cell_update(0, "", "x"));
        log.undo();
        log.record(OperationKind::UpdateCell, cell_update(1, "", "y"));
        assert!(!log.can_redo());
        assert_eq!(log.undo_len(), 1);
    }

    #[test]
    fn test_bounded() {
        let mut log = UndoRedoLog::new(3);
        for i in 0..5 {
            log.record(OperationKind::UpdateCell, cell_update(i, "", "v"));
        }
        assert_eq!(log.undo_len(), 3);
        // Oldest dropped first
        let positions: Vec<usize> = std::iter::from_fn(|| log.undo()).map(|op| op.position()).collect();
        assert_eq!(positions, vec![4, 3, 2]);
    }
}
