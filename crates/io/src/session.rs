//! An open table: the in-memory model plus write-behind persistence.
//!
//! Every mutation goes to the model first; the matching storage write
//! is queued afterwards. Cell and column edits are written individually,
//! structural edits and undo/redo rewrite the table. Row heights are
//! debounced per row so a resize drag produces one write.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use notegrid_config::Settings;
use notegrid_core::{GridEvent, RowKey, SortDirection};
use notegrid_engine::{CellStyle, CellType, FilterType, GridModel};

use crate::debounce::DebouncedWrites;
use crate::error::LoadError;
use crate::load::load_table;
use crate::persist::{PersistCommand, PersistQueue};
use crate::record::{StoredColumn, TableData};
use crate::repository::TableRepository;

pub struct TableSession {
    table_id: i64,
    model: GridModel,
    queue: PersistQueue,
    row_heights: DebouncedWrites<RowKey, f32>,
}

impl TableSession {
    pub fn new(table_id: i64, model: GridModel, queue: PersistQueue, settings: &Settings) -> Self {
        Self {
            table_id,
            model,
            queue,
            row_heights: DebouncedWrites::new(settings.row_height_save_delay_ms),
        }
    }

    /// Load the table in the background and wait for it.
    pub fn open(
        repo: Arc<dyn TableRepository>,
        table_id: i64,
        settings: &Settings,
    ) -> Result<Self, LoadError> {
        let loaded = load_table(Arc::clone(&repo), table_id).wait()?;
        let model = loaded.into_model(settings);
        Ok(Self::new(table_id, model, PersistQueue::new(repo), settings))
    }

    pub fn table_id(&self) -> i64 {
        self.table_id
    }

    pub fn model(&self) -> &GridModel {
        &self.model
    }

    pub fn take_events(&mut self) -> Vec<GridEvent> {
        self.model.take_events()
    }

    fn submit(&self, command: PersistCommand) {
        self.queue.submit(self.table_id, command);
    }

    fn save_column(&self, col: usize) {
        if let Some(column) = self.model.column(col) {
            self.submit(PersistCommand::Column(StoredColumn::from(column)));
        }
    }

    fn save_all_columns(&self) {
        for column in self.model.columns().iter() {
            self.submit(PersistCommand::Column(StoredColumn::from(column)));
        }
    }

    fn save_table(&self) {
        self.submit(PersistCommand::Replace(Box::new(TableData::from_model(&self.model))));
    }

    // -- cells -------------------------------------------------------------

    pub fn update_cell(&mut self, display_row: usize, col: usize, content: &str) -> bool {
        let Some(row) = self.model.data_row(display_row) else {
            return false;
        };
        if !self.model.update_cell(display_row, col, content) {
            return false;
        }
        self.submit(PersistCommand::CellContent { row, col, content: content.to_string() });
        true
    }

    pub fn update_cell_style(&mut self, display_row: usize, col: usize, style: CellStyle) -> bool {
        let Some(row) = self.model.data_row(display_row) else {
            return false;
        };
        if !self.model.update_cell_style(display_row, col, style.clone()) {
            return false;
        }
        self.submit(PersistCommand::CellStyle { row, col, style });
        true
    }

    // -- structure ---------------------------------------------------------

    pub fn insert_row(&mut self, position: usize) -> bool {
        self.structural(|m| m.insert_row(position))
    }

    pub fn delete_row_at(&mut self, position: usize) -> bool {
        self.structural(|m| m.delete_row_at(position))
    }

    pub fn insert_column_at(&mut self, position: usize) -> bool {
        self.structural(|m| m.insert_column_at(position))
    }

    pub fn delete_column_at(&mut self, position: usize) -> bool {
        self.structural(|m| m.delete_column_at(position))
    }

    pub fn undo(&mut self) -> bool {
        self.structural(GridModel::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.structural(GridModel::redo)
    }

    fn structural(&mut self, op: impl FnOnce(&mut GridModel) -> bool) -> bool {
        // Pending heights are keyed by row identity; write them at
        // their current positions before the rewrite.
        self.flush_row_heights();
        let changed = op(&mut self.model);
        if changed {
            self.save_table();
        }
        changed
    }

    // -- columns -----------------------------------------------------------

    pub fn rename_column(&mut self, col: usize, name: &str) -> bool {
        let changed = self.model.rename_column(col, name);
        if changed {
            self.save_column(col);
        }
        changed
    }

    pub fn set_column_type(&mut self, col: usize, column_type: CellType) -> bool {
        let changed = self.model.set_column_type(col, column_type);
        if changed {
            self.save_column(col);
        }
        changed
    }

    pub fn set_column_visible(&mut self, col: usize, visible: bool) -> bool {
        let changed = self.model.set_column_visible(col, visible);
        if changed {
            self.save_column(col);
        }
        changed
    }

    pub fn resize_column(&mut self, col: usize, width_px: f32, scale: f32) -> bool {
        let changed = self.model.resize_column(col, width_px, scale);
        if changed {
            self.save_column(col);
        }
        changed
    }

    // -- rows --------------------------------------------------------------

    /// Resize a displayed row now; the height is written once the row
    /// has been still for the save delay (see `tick`).
    pub fn resize_row(&mut self, display_row: usize, height_px: f32, scale: f32, now: Instant) -> bool {
        let Some(key) = self.model.row_key(display_row) else {
            return false;
        };
        match self.model.resize_row(display_row, height_px, scale) {
            Some((_, base_height)) => {
                self.row_heights.schedule(key, base_height, now);
                true
            }
            None => false,
        }
    }

    /// Write row heights whose delay has passed.
    pub fn tick(&mut self, now: Instant) {
        let due = self.row_heights.due(now);
        self.write_row_heights(due);
    }

    fn flush_row_heights(&mut self) {
        let pending = self.row_heights.flush();
        self.write_row_heights(pending);
    }

    fn write_row_heights(&self, heights: Vec<(RowKey, f32)>) {
        for (key, height) in heights {
            // Rows deleted meanwhile have nothing to save.
            if let Some(row) = self.model.row_order().data_row_of_key(key) {
                self.submit(PersistCommand::RowHeight { row, height });
            }
        }
    }

    // -- view --------------------------------------------------------------

    /// Sort direction is stored with the columns; row order is not.
    pub fn sort_by_column(&mut self, col: usize, direction: SortDirection) -> bool {
        let changed = self.model.sort_by_column(col, direction);
        if changed {
            self.save_all_columns();
        }
        changed
    }

    pub fn toggle_sort(&mut self, col: usize) -> bool {
        let changed = self.model.toggle_sort(col);
        if changed {
            self.save_all_columns();
        }
        changed
    }

    pub fn filter_by_values(&mut self, col: usize, selected: &BTreeSet<String>) -> bool {
        self.model.filter_by_values(col, selected)
    }

    pub fn filter_by_range(
        &mut self,
        col: usize,
        filter_type: FilterType,
        value: &str,
        range: Option<(f64, f64)>,
    ) -> bool {
        self.model.filter_by_range(col, filter_type, value, range)
    }

    pub fn clear_filter(&mut self, col: usize) -> bool {
        self.model.clear_filter(col)
    }

    pub fn clear_all_filters(&mut self) -> bool {
        self.model.clear_all_filters()
    }

    /// Write anything pending and wait for the queue to drain.
    pub fn close(mut self) -> GridModel {
        self.flush_row_heights();
        self.queue.flush();
        self.model
    }
}
