//! GridModel: the single writer over columns, cells, row order and history.
//!
//! Public methods take DISPLAY coordinates (what the user sees after
//! sort and filter). Internally everything is stored in DATA space and
//! the displayed projection is derived on demand, so there is exactly
//! one copy of the cells.
//!
//! Every public mutation is atomic: state and queued events are
//! complete before the method returns. Invalid positions are a no-op
//! returning `false`.

use std::collections::BTreeSet;

use notegrid_config::Settings;
use notegrid_core::{EventCollector, GridEvent, RowKey, SortDirection};
use notegrid_core::events::EventCallback;
use rustc_hash::FxHashMap;

use crate::cell::{Cell, CellData, CellStyle};
use crate::column::{infer_column_type, CellType, Column, ColumnCatalog};
use crate::filter::{self, ColumnFilter, FilterPredicate, FilterType, ValueCount};
use crate::grid::{build_full_grid, Projection};
use crate::history::{Change, OperationKind, UndoRedoLog, ViewState};
use crate::row_order::RowOrderTracker;
use crate::sort::sorted_order;
use crate::store::CellStore;

pub struct GridModel {
    catalog: ColumnCatalog,
    store: CellStore,
    order: RowOrderTracker,
    history: UndoRedoLog,
    events: EventCollector,

    /// Unscaled heights of resized rows, keyed by identity so they
    /// follow rows through sorting
    row_heights: FxHashMap<RowKey, f32>,
    base_row_height: f32,

    // Caches, dropped on write
    projection: Option<Projection>,
    value_counts_cache: FxHashMap<usize, Vec<ValueCount>>,
}

impl GridModel {
    /// Empty table with default column names.
    pub fn new(rows: usize, cols: usize, settings: &Settings) -> Self {
        let catalog = ColumnCatalog::with_defaults(cols, settings.default_column_width);
        Self::from_parts(catalog.iter().cloned().collect(), rows, Vec::new(), settings)
    }

    /// Table from loaded columns and sparse cells. Cells outside
    /// `rows x columns.len()` are dropped. A persisted sort direction is
    /// applied to the initial order.
    pub fn from_parts(
        columns: Vec<Column>,
        rows: usize,
        cells: impl IntoIterator<Item = (usize, usize, CellData)>,
        settings: &Settings,
    ) -> Self {
        let catalog = ColumnCatalog::from_columns(columns, settings.default_column_width);
        let store = CellStore::from_cells(rows, catalog.len(), cells);
        let mut model = Self {
            catalog,
            store,
            order: RowOrderTracker::new(rows),
            history: UndoRedoLog::new(settings.history_max_entries),
            events: EventCollector::new(),
            row_heights: FxHashMap::default(),
            base_row_height: settings.row_height,
            projection: None,
            value_counts_cache: FxHashMap::default(),
        };

        if let Some((col, direction)) = model.catalog.active_sort() {
            let permutation = sorted_order(&model.store.column_values(col), direction);
            model.order.apply_order(permutation);
        }
        log::info!("grid loaded: {} rows x {} cols", rows, model.catalog.len());
        model
    }

    /// Seed persisted row heights, given per data row at scale 1.0.
    pub fn with_row_heights(mut self, heights: impl IntoIterator<Item = (usize, f32)>) -> Self {
        for (data_row, height) in heights {
            if let Some(key) = self.order.key_of(data_row) {
                if height > 0.0 {
                    self.row_heights.insert(key, height);
                }
            }
        }
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Displayed row count (after filtering)
    pub fn row_count(&self) -> usize {
        self.order.visible_count()
    }

    /// Rows in storage, filtered or not
    pub fn total_row_count(&self) -> usize {
        self.store.row_count()
    }

    pub fn col_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn columns(&self) -> &ColumnCatalog {
        &self.catalog
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.catalog.get(col)
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn row_order(&self) -> &RowOrderTracker {
        &self.order
    }

    pub fn history(&self) -> &UndoRedoLog {
        &self.history
    }

    pub fn data_row(&self, display_row: usize) -> Option<usize> {
        self.order.display_to_data(display_row)
    }

    pub fn display_row(&self, data_row: usize) -> Option<usize> {
        self.order.data_to_display(data_row)
    }

    pub fn row_key(&self, display_row: usize) -> Option<RowKey> {
        self.data_row(display_row).and_then(|d| self.order.key_of(d))
    }

    /// Content at a display position; "" for empty cells, None when out of range.
    pub fn content(&self, display_row: usize, col: usize) -> Option<&str> {
        if col >= self.col_count() {
            return None;
        }
        let data_row = self.data_row(display_row)?;
        Some(self.store.content(data_row, col))
    }

    pub fn style(&self, display_row: usize, col: usize) -> Option<CellStyle> {
        if col >= self.col_count() {
            return None;
        }
        let data_row = self.data_row(display_row)?;
        Some(self.store.cell_or_default(data_row, col).style)
    }

    /// Unscaled height of a displayed row
    pub fn row_height(&self, display_row: usize) -> f32 {
        self.row_key(display_row)
            .and_then(|key| self.row_heights.get(&key).copied())
            .unwrap_or(self.base_row_height)
    }

    /// Resized rows as (data row, unscaled height), in data order
    pub fn row_heights(&self) -> Vec<(usize, f32)> {
        let mut heights: Vec<(usize, f32)> = self
            .row_heights
            .iter()
            .filter_map(|(key, h)| self.order.data_row_of_key(*key).map(|d| (d, *h)))
            .collect();
        heights.sort_by_key(|(d, _)| *d);
        heights
    }

    /// The displayed grid, derived from canonical cells and cached
    /// until the next write.
    pub fn projection(&mut self) -> &Projection {
        let projection = match self.projection.take() {
            Some(p) => p,
            None => self.derive_projection(),
        };
        self.projection.insert(projection)
    }

    /// Derive the displayed grid without touching the cache.
    pub fn derive_projection(&self) -> Projection {
        let keys = self.order.original_order();
        let key = |row: usize| keys.get(row).copied().unwrap_or_default();
        let frozen: Vec<Cell> = self
            .store
            .frozen_cells()
            .into_iter()
            .map(|(row, data)| Cell::new(row, 0, data.clone(), key(row)))
            .collect();
        let scrollable: Vec<Cell> = self
            .store
            .scrollable_cells()
            .into_iter()
            .map(|(row, col, data)| Cell::new(row, col, data.clone(), key(row)))
            .collect();

        let grid = build_full_grid(&frozen, &scrollable, self.store.row_count(), self.store.col_count())
            .with_row_keys(keys);
        Projection::from_grid(&grid, &self.order.display_order())
    }

    /// Distinct values of a column with counts, for the filter list.
    pub fn value_counts(&mut self, col: usize) -> &[ValueCount] {
        if col >= self.col_count() {
            return &[];
        }
        if !self.value_counts_cache.contains_key(&col) {
            let counts = filter::value_counts(self.store.column_values(col));
            self.value_counts_cache.insert(col, counts);
        }
        self.value_counts_cache.get(&col).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn distinct_values(&self, col: usize) -> BTreeSet<String> {
        filter::distinct_values(&self.store, col)
    }

    /// Majority content type of a column
    pub fn infer_column_type(&self, col: usize) -> CellType {
        infer_column_type(self.store.column_values(col))
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Take every event queued by completed operations.
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        self.events.drain()
    }

    pub fn dispatch_events(&mut self, callback: &mut EventCallback) {
        self.events.dispatch(callback);
    }

    pub fn pending_events(&self) -> &[GridEvent] {
        self.events.events()
    }

    fn emit_reload(&mut self) {
        self.events.push(GridEvent::GridReloaded {
            rows: self.row_count(),
            cols: self.col_count(),
        });
    }

    fn emit_cell(&mut self, data_row: usize, col: usize) {
        if let Some(row) = self.order.data_to_display(data_row) {
            let content = self.store.content(data_row, col).to_string();
            self.events.push(GridEvent::CellChanged { row, col, content });
        }
    }

    fn invalidate(&mut self) {
        self.projection = None;
        self.value_counts_cache.clear();
    }

    // =========================================================================
    // Cell edits
    // =========================================================================

    /// Replace the content at a display position. Style is kept.
    pub fn update_cell(&mut self, display_row: usize, col: usize, content: impl Into<String>) -> bool {
        let content = content.into();
        let Some(data_row) = self.data_row(display_row) else {
            return false;
        };
        if col >= self.col_count() || self.store.content(data_row, col) == content {
            return false;
        }

        let Some(old_value) = self.write_content(data_row, col, content.clone()) else {
            return false;
        };
        self.history.record(
            OperationKind::UpdateCell,
            Change::CellUpdated { data_row, col, old_value, new_value: content.clone() },
        );
        log::debug!("cell ({}, {}) updated", display_row, col);
        self.events.push(GridEvent::CellChanged { row: display_row, col, content });
        true
    }

    pub fn update_cell_style(&mut self, display_row: usize, col: usize, style: CellStyle) -> bool {
        let Some(data_row) = self.data_row(display_row) else {
            return false;
        };
        if col >= self.col_count() {
            return false;
        }
        let Some(old_style) = self.write_style(data_row, col, style.clone()) else {
            return false;
        };
        if old_style == style {
            return false;
        }
        self.history.record(
            OperationKind::UpdateStyle,
            Change::StyleUpdated { data_row, col, old_style, new_style: style },
        );
        self.emit_cell(data_row, col);
        true
    }

    fn write_content(&mut self, data_row: usize, col: usize, content: String) -> Option<String> {
        let mut data = self.store.get(data_row, col).cloned().unwrap_or_default();
        data.content = content;
        let previous = self.store.set(data_row, col, data)?;
        self.invalidate();
        Some(previous.content)
    }

    fn write_style(&mut self, data_row: usize, col: usize, style: CellStyle) -> Option<CellStyle> {
        let mut data = self.store.get(data_row, col).cloned().unwrap_or_default();
        data.style = style;
        let previous = self.store.set(data_row, col, data)?;
        self.projection = None;
        Some(previous.style)
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Insert an empty row shown at `position` (0..=row_count).
    pub fn insert_row(&mut self, position: usize) -> bool {
        if position > self.row_count() {
            return false;
        }
        let (data_row, view_row) = self.order.insertion_point(position);
        let key = self.order.next_key();
        self.apply_row_insert(data_row, view_row, key, true, Vec::new(), None);
        self.history.record(OperationKind::AddRow, Change::RowInserted { data_row, view_row, key });
        log::debug!("row inserted at {} (data row {})", position, data_row);
        self.emit_reload();
        true
    }

    /// Delete the row shown at `position`. The last remaining row is kept.
    pub fn delete_row_at(&mut self, position: usize) -> bool {
        if self.total_row_count() <= 1 {
            log::warn!("refusing to delete the last row");
            return false;
        }
        let Some(data_row) = self.data_row(position) else {
            return false;
        };
        let Some(change) = self.apply_row_delete(data_row) else {
            return false;
        };
        self.history.record(OperationKind::DeleteRow, change);
        log::debug!("row deleted at {} (data row {})", position, data_row);
        self.emit_reload();
        true
    }

    fn apply_row_insert(
        &mut self,
        data_row: usize,
        view_row: usize,
        key: RowKey,
        visible: bool,
        cells: Vec<CellData>,
        base_height: Option<f32>,
    ) {
        let data_row = self.store.insert_row(data_row, cells);
        self.order.insert(data_row, view_row, key, visible);
        if let Some(height) = base_height {
            self.row_heights.insert(key, height);
        }
        self.invalidate();
    }

    fn apply_row_delete(&mut self, data_row: usize) -> Option<Change> {
        if data_row >= self.store.row_count() {
            return None;
        }
        let (view_row, key, visible) = self.order.remove(data_row)?;
        let cells = self.store.remove_row(data_row).unwrap_or_default();
        let base_height = self.row_heights.remove(&key);
        self.invalidate();
        Some(Change::RowDeleted { data_row, view_row, key, visible, cells, base_height })
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Insert a default column at `position` (0..=col_count). Inserting
    /// at 0 replaces the frozen column; the old one becomes scrollable.
    pub fn insert_column_at(&mut self, position: usize) -> bool {
        if position > self.col_count() {
            return false;
        }
        let column = self.catalog.new_column(position);
        self.apply_column_insert(position, column.clone(), Vec::new(), None, None);
        self.history.record(OperationKind::AddColumn, Change::ColumnInserted { col: position, column });
        log::debug!("column inserted at {}", position);
        self.emit_reload();
        true
    }

    /// Delete the column at `position`. The last remaining column is kept.
    pub fn delete_column_at(&mut self, position: usize) -> bool {
        if self.col_count() <= 1 {
            log::warn!("refusing to delete the last column");
            return false;
        }
        let Some(change) = self.apply_column_delete(position) else {
            return false;
        };
        self.history.record(OperationKind::DeleteColumn, change);
        log::debug!("column deleted at {}", position);
        self.emit_reload();
        true
    }

    /// Insert a column definition with its cells. A saved mask or row
    /// order is put back as-is; a filtered column without a mask
    /// re-derives visibility.
    fn apply_column_insert(
        &mut self,
        col: usize,
        column: Column,
        cells: Vec<CellData>,
        visible_mask: Option<Vec<bool>>,
        row_order: Option<Vec<usize>>,
    ) {
        let filtered = column.filter.is_some();
        if let Some(order) = row_order {
            self.order.apply_order(order);
        }
        let col = self.catalog.insert(col, column);
        self.store.insert_col(col, cells);
        match visible_mask {
            Some(mask) => {
                self.order.apply_filter(mask);
            }
            None if filtered => self.refresh_mask(),
            None => {}
        }
        self.invalidate();
    }

    fn apply_column_delete(&mut self, col: usize) -> Option<Change> {
        let column = self.catalog.remove(col)?;
        let cells = self.store.remove_col(col).unwrap_or_default();
        let visible_mask = column.filter.as_ref().map(|_| self.order.visible_mask().to_vec());
        if visible_mask.is_some() {
            self.refresh_mask();
        }
        // Rows drop back to data order with the sort gone.
        let row_order = column.sort_direction.is_active().then(|| self.order.row_order().to_vec());
        if row_order.is_some() {
            self.order.clear_order();
        }
        self.invalidate();
        Some(Change::ColumnDeleted { col, column, cells, visible_mask, row_order })
    }

    /// Apply `edit` to a column definition as one undoable step.
    fn update_column(&mut self, col: usize, edit: impl FnOnce(&mut Column)) -> bool {
        let Some(old_column) = self.catalog.get(col).cloned() else {
            return false;
        };
        let mut new_column = old_column.clone();
        edit(&mut new_column);
        if new_column == old_column {
            return false;
        }
        self.catalog.replace(col, new_column.clone());
        self.history.record(
            OperationKind::UpdateColumn,
            Change::ColumnUpdated { col, old_column, new_column },
        );
        self.invalidate();
        true
    }

    pub fn rename_column(&mut self, col: usize, name: impl Into<String>) -> bool {
        let name = name.into();
        let changed = self.update_column(col, |c| c.name = name);
        if changed {
            self.emit_reload();
        }
        changed
    }

    pub fn set_column_type(&mut self, col: usize, column_type: CellType) -> bool {
        self.update_column(col, |c| c.column_type = column_type)
    }

    /// Infer the column's type from its content and store it.
    pub fn auto_infer_column_type(&mut self, col: usize) -> bool {
        let inferred = self.infer_column_type(col);
        self.set_column_type(col, inferred)
    }

    pub fn set_column_visible(&mut self, col: usize, visible: bool) -> bool {
        let changed = self.update_column(col, |c| c.visible = visible);
        if changed {
            self.emit_reload();
        }
        changed
    }

    /// Resize a column to `width_px` measured at `scale`. The catalog
    /// stores the unscaled width.
    pub fn resize_column(&mut self, col: usize, width_px: f32, scale: f32) -> bool {
        if !(width_px > 0.0 && scale > 0.0) {
            return false;
        }
        let base_width = width_px / scale;
        let changed = self.update_column(col, |c| c.base_width = base_width);
        if changed {
            self.events.push(GridEvent::ColumnResized { col, width_px });
        }
        changed
    }

    /// Resize a displayed row to `height_px` measured at `scale`.
    /// Returns (data row, unscaled height) for persisting.
    pub fn resize_row(&mut self, display_row: usize, height_px: f32, scale: f32) -> Option<(usize, f32)> {
        if !(height_px > 0.0 && scale > 0.0) {
            return None;
        }
        let data_row = self.data_row(display_row)?;
        let key = self.order.key_of(data_row)?;
        let base_height = height_px / scale;
        self.row_heights.insert(key, base_height);
        self.events.push(GridEvent::RowResized { row: display_row, height_px });
        Some((data_row, base_height))
    }

    // =========================================================================
    // Sort & filter
    // =========================================================================

    fn view_state(&self) -> ViewState {
        ViewState {
            row_order: self.order.row_order().to_vec(),
            visible_mask: self.order.visible_mask().to_vec(),
            sort: self.catalog.active_sort(),
            filters: self.catalog.active_filters(),
        }
    }

    fn restore_view(&mut self, state: &ViewState) {
        if !self.order.restore(state.row_order.clone(), state.visible_mask.clone()) {
            log::warn!("saved view no longer matches the table; keeping current order");
        }
        match state.sort {
            Some((col, direction)) => {
                self.catalog.set_sort(col, direction);
            }
            None => self.catalog.clear_sort(),
        }
        self.catalog.restore_filters(&state.filters);
        self.invalidate();
    }

    fn refresh_mask(&mut self) {
        if self.catalog.has_filters() {
            let mask = filter::compute_mask(&self.store, &self.catalog);
            self.order.apply_filter(mask);
        } else {
            self.order.clear_filter();
        }
    }

    /// Sort every row by a column's canonical content. `Unsorted`
    /// restores load order. Filter visibility is kept.
    pub fn sort_by_column(&mut self, col: usize, direction: SortDirection) -> bool {
        if col >= self.col_count() {
            return false;
        }
        let before = self.view_state();

        if direction.is_active() {
            let permutation = sorted_order(&self.store.column_values(col), direction);
            if !self.order.apply_order(permutation) {
                return false;
            }
            self.catalog.set_sort(col, direction);
        } else {
            self.order.clear_order();
            self.catalog.clear_sort();
        }
        self.invalidate();

        let after = self.view_state();
        if after != before {
            self.history.record(OperationKind::SortColumn, Change::ViewChanged { col, before, after });
        }
        log::debug!("sorted column {} {:?}", col, direction);
        self.events.push(GridEvent::SortChanged { col, direction });
        self.emit_reload();
        true
    }

    /// Advance a column through unsorted -> ascending -> descending.
    pub fn toggle_sort(&mut self, col: usize) -> bool {
        let Some(current) = self.catalog.get(col).map(|c| c.sort_direction) else {
            return false;
        };
        self.sort_by_column(col, current.cycle())
    }

    /// Show only rows whose content in `col` is selected. An empty
    /// selection, or one covering every value, clears the column's filter.
    pub fn filter_by_values(&mut self, col: usize, selected: &BTreeSet<String>) -> bool {
        if col >= self.col_count() {
            return false;
        }
        let filter = filter::value_filter(&self.store, col, selected);
        self.set_column_filter(col, filter)
    }

    /// Show only rows whose content in `col` matches a predicate.
    pub fn filter_by_range(
        &mut self,
        col: usize,
        filter_type: FilterType,
        value: &str,
        range: Option<(f64, f64)>,
    ) -> bool {
        let predicate = FilterPredicate::new(filter_type, value, range);
        self.set_column_filter(col, Some(ColumnFilter::Predicate(predicate)))
    }

    pub fn clear_filter(&mut self, col: usize) -> bool {
        self.set_column_filter(col, None)
    }

    pub fn clear_all_filters(&mut self) -> bool {
        let filtered: Vec<usize> = self.catalog.active_filters().into_iter().map(|(c, _)| c).collect();
        let Some(&first) = filtered.first() else {
            return false;
        };
        let before = self.view_state();
        self.catalog.restore_filters(&[]);
        self.refresh_mask();
        self.invalidate();
        let after = self.view_state();
        self.history.record(OperationKind::FilterColumn, Change::ViewChanged { col: first, before, after });
        for col in filtered {
            self.events.push(GridEvent::FilterApplied { col, values: Vec::new() });
        }
        self.emit_reload();
        true
    }

    fn set_column_filter(&mut self, col: usize, filter: Option<ColumnFilter>) -> bool {
        if col >= self.col_count() {
            return false;
        }
        let values = filter.as_ref().map(ColumnFilter::describe).unwrap_or_default();
        let before = self.view_state();

        if let Some(column) = self.catalog.get_mut(col) {
            column.filter = filter;
        }
        self.refresh_mask();
        self.invalidate();

        let after = self.view_state();
        if after != before {
            self.history.record(OperationKind::FilterColumn, Change::ViewChanged { col, before, after });
        }
        log::debug!("filter on column {}: {} rows shown", col, self.row_count());
        self.events.push(GridEvent::FilterApplied { col, values });
        self.emit_reload();
        true
    }

    // =========================================================================
    // Undo / redo
    // =========================================================================

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Revert the most recent operation. No-op on an empty log.
    pub fn undo(&mut self) -> bool {
        let Some(operation) = self.history.undo() else {
            return false;
        };
        log::debug!("undo {:?}", operation.kind);
        self.apply_change(&operation.change, false);
        true
    }

    /// Re-apply the most recently undone operation. No-op on an empty log.
    pub fn redo(&mut self) -> bool {
        let Some(operation) = self.history.redo() else {
            return false;
        };
        log::debug!("redo {:?}", operation.kind);
        self.apply_change(&operation.change, true);
        true
    }

    /// Forget all history, e.g. when navigating to another table.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn apply_change(&mut self, change: &Change, forward: bool) {
        match change {
            Change::RowInserted { data_row, view_row, key } => {
                if forward {
                    self.apply_row_insert(*data_row, *view_row, *key, true, Vec::new(), None);
                } else {
                    self.apply_row_delete(*data_row);
                }
                self.emit_reload();
            }
            Change::RowDeleted { data_row, view_row, key, visible, cells, base_height } => {
                if forward {
                    self.apply_row_delete(*data_row);
                } else {
                    self.apply_row_insert(*data_row, *view_row, *key, *visible, cells.clone(), *base_height);
                }
                self.emit_reload();
            }
            Change::ColumnInserted { col, column } => {
                if forward {
                    self.apply_column_insert(*col, column.clone(), Vec::new(), None, None);
                } else {
                    self.apply_column_delete(*col);
                }
                self.emit_reload();
            }
            Change::ColumnDeleted { col, column, cells, visible_mask, row_order } => {
                if forward {
                    self.apply_column_delete(*col);
                } else {
                    self.apply_column_insert(
                        *col,
                        column.clone(),
                        cells.clone(),
                        visible_mask.clone(),
                        row_order.clone(),
                    );
                }
                self.emit_reload();
            }
            Change::CellUpdated { data_row, col, old_value, new_value } => {
                let value = if forward { new_value } else { old_value };
                self.write_content(*data_row, *col, value.clone());
                self.emit_cell(*data_row, *col);
            }
            Change::StyleUpdated { data_row, col, old_style, new_style } => {
                let style = if forward { new_style } else { old_style };
                self.write_style(*data_row, *col, style.clone());
                self.emit_cell(*data_row, *col);
            }
            Change::ColumnUpdated { col, old_column, new_column } => {
                let column = if forward { new_column } else { old_column };
                self.catalog.replace(*col, column.clone());
                self.invalidate();
                self.emit_reload();
            }
            Change::ViewChanged { col, before, after } => {
                let state = if forward { after } else { before };
                let sort_changed = before.sort != after.sort || before.row_order != after.row_order;
                self.restore_view(state);
                if sort_changed {
                    let direction = state
                        .sort
                        .filter(|(c, _)| c == col)
                        .map(|(_, d)| d)
                        .unwrap_or_default();
                    self.events.push(GridEvent::SortChanged { col: *col, direction });
                } else {
                    let values = state
                        .filters
                        .iter()
                        .find(|(c, _)| c == col)
                        .map(|(_, f)| f.describe())
                        .unwrap_or_default();
                    self.events.push(GridEvent::FilterApplied { col: *col, values });
                }
                self.emit_reload();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(values: &[&str]) -> GridModel {
        // Column 0 = label, column 1 = value
        let cells = values.iter().enumerate().flat_map(|(row, v)| {
            [
                (row, 0, CellData::text(format!("row{row}"))),
                (row, 1, CellData::text(*v)),
            ]
        });
        let settings = Settings::default();
        let columns = ColumnCatalog::with_defaults(2, 120.0).iter().cloned().collect();
        GridModel::from_parts(columns, values.len(), cells, &settings)
    }

    fn column(m: &mut GridModel, col: usize) -> Vec<String> {
        m.projection().column(col).into_iter().map(String::from).collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_new_table_shape() {
        let mut m = GridModel::new(3, 4, &Settings::default());
        assert_eq!(m.row_count(), 3);
        assert_eq!(m.col_count(), 4);
        assert_eq!(m.column(3).unwrap().name, "Column 4");
        let projection = m.projection();
        assert_eq!(projection.frozen.len(), 3);
        assert_eq!(projection.scrollable.len(), 9);
        assert!(projection.scrollable.iter().all(|c| c.content.is_empty()));
    }

    #[test]
    fn test_update_cell_emits_and_undoes() {
        let mut m = model(&["a", "b"]);
        assert!(m.update_cell(1, 1, "z"));
        assert!(!m.update_cell(1, 1, "z"));
        assert!(!m.update_cell(9, 1, "z"));
        assert_eq!(m.content(1, 1), Some("z"));

        let events = m.take_events();
        assert_eq!(events, vec![GridEvent::CellChanged { row: 1, col: 1, content: "z".into() }]);

        assert!(m.undo());
        assert_eq!(m.content(1, 1), Some("b"));
        assert!(m.redo());
        assert_eq!(m.content(1, 1), Some("z"));
    }

    #[test]
    fn test_sort_then_unsorted_restores_identity() {
        let mut m = model(&["10", "2", "", "abc"]);
        let original: Vec<_> = m.projection().frozen.iter().map(|c| c.stable_id).collect();

        m.sort_by_column(1, SortDirection::Ascending);
        assert_eq!(column(&mut m, 1), ["2", "10", "abc", ""]);
        assert_eq!(m.columns().active_sort(), Some((1, SortDirection::Ascending)));

        m.sort_by_column(1, SortDirection::Descending);
        assert_eq!(column(&mut m, 1), ["10", "2", "abc", ""]);

        m.sort_by_column(1, SortDirection::Unsorted);
        let restored: Vec<_> = m.projection().frozen.iter().map(|c| c.stable_id).collect();
        assert_eq!(restored, original);
        assert_eq!(m.columns().active_sort(), None);
    }

    #[test]
    fn test_identity_follows_rows_through_sort() {
        let mut m = model(&["b", "a"]);
        m.sort_by_column(1, SortDirection::Ascending);
        let projection = m.projection();
        assert_eq!(projection.content(0, 0), Some("row1"));
        assert_eq!(projection.cell(0, 0).unwrap().stable_id.row_key, RowKey::from_raw(1));
        assert_eq!(projection.cell(0, 1).unwrap().stable_id.row_key, RowKey::from_raw(1));
    }

    #[test]
    fn test_deleting_sorted_column_restores_data_order() {
        let mut m = model(&["b", "a", "c"]);
        m.sort_by_column(1, SortDirection::Ascending);
        assert_eq!(column(&mut m, 0), ["row1", "row0", "row2"]);

        assert!(m.delete_column_at(1));
        assert_eq!(m.columns().active_sort(), None);
        assert!(!m.row_order().is_sorted());
        assert_eq!(column(&mut m, 0), ["row0", "row1", "row2"]);

        assert!(m.undo());
        assert_eq!(m.columns().active_sort(), Some((1, SortDirection::Ascending)));
        assert_eq!(column(&mut m, 0), ["row1", "row0", "row2"]);
        assert_eq!(column(&mut m, 1), ["a", "b", "c"]);

        assert!(m.redo());
        assert_eq!(m.columns().active_sort(), None);
        assert_eq!(column(&mut m, 0), ["row0", "row1", "row2"]);
    }

    #[test]
    fn test_sorting_other_column_clears_previous() {
        let mut m = model(&["b", "a"]);
        m.sort_by_column(1, SortDirection::Ascending);
        m.sort_by_column(0, SortDirection::Descending);
        assert_eq!(m.column(1).unwrap().sort_direction, SortDirection::Unsorted);
        assert_eq!(m.column(0).unwrap().sort_direction, SortDirection::Descending);
        assert_eq!(column(&mut m, 0), ["row1", "row0"]);
    }

    #[test]
    fn test_edit_while_sorted_updates_canonical() {
        let mut m = model(&["b", "a", "c"]);
        m.sort_by_column(1, SortDirection::Ascending);
        // Display row 0 is data row 1 ("a")
        m.update_cell(0, 1, "z");
        assert_eq!(m.store().content(1, 1), "z");
        // Re-sorting uses the edited value
        m.sort_by_column(1, SortDirection::Ascending);
        assert_eq!(column(&mut m, 1), ["b", "c", "z"]);
    }

    #[test]
    fn test_filter_values_and_clear() {
        let mut m = model(&["x", "y", "x", ""]);
        assert!(m.filter_by_values(1, &set(&["x"])));
        assert_eq!(m.row_count(), 2);
        assert_eq!(column(&mut m, 0), ["row0", "row2"]);
        assert_eq!(m.projection().cell(1, 0).unwrap().row, 1);

        assert!(m.filter_by_values(1, &set(&["x", "y", ""])));
        assert_eq!(m.row_count(), 4);
        assert!(m.column(1).unwrap().filter.is_none());
    }

    #[test]
    fn test_filter_no_match_is_empty_grid() {
        let mut m = model(&["1", "2"]);
        assert!(m.filter_by_range(1, FilterType::NumberRange, "", Some((50.0, 60.0))));
        assert_eq!(m.row_count(), 0);
        let projection = m.projection();
        assert_eq!(projection.row_count, 0);
        assert!(projection.frozen.is_empty());
        assert!(projection.scrollable.is_empty());
        assert_eq!(m.total_row_count(), 2);
    }

    #[test]
    fn test_filter_and_sort_compose() {
        let mut m = model(&["3", "1", "x", "2"]);
        m.filter_by_range(1, FilterType::NumberRange, "", Some((0.0, 100.0)));
        m.sort_by_column(1, SortDirection::Descending);
        assert_eq!(column(&mut m, 1), ["3", "2", "1"]);
        m.clear_filter(1);
        assert_eq!(column(&mut m, 1), ["3", "2", "1", "x"]);
    }

    #[test]
    fn test_filters_on_two_columns_and() {
        let mut m = model(&["a", "a", "b"]);
        m.filter_by_values(1, &set(&["a"]));
        m.filter_by_range(0, FilterType::TextContains, "ROW1", None);
        assert_eq!(column(&mut m, 0), ["row1"]);
        m.clear_filter(0);
        assert_eq!(m.row_count(), 2);
        assert!(m.clear_all_filters());
        assert_eq!(m.row_count(), 3);
        assert!(!m.clear_all_filters());
    }

    #[test]
    fn test_insert_row_then_delete_restores() {
        let mut m = model(&["a", "b", "c"]);
        let before = m.derive_projection();
        assert!(m.insert_row(1));
        assert_eq!(m.row_count(), 4);
        assert_eq!(m.content(1, 1), Some(""));
        assert_eq!(m.row_key(1), Some(RowKey::from_raw(3)));
        assert!(m.delete_row_at(1));
        assert_eq!(m.derive_projection(), before);
    }

    #[test]
    fn test_insert_row_bounds() {
        let mut m = model(&["a"]);
        assert!(!m.insert_row(2));
        assert!(m.insert_row(1));
        assert_eq!(m.content(1, 0), Some(""));
    }

    #[test]
    fn test_last_row_and_column_protected() {
        let mut m = GridModel::new(1, 1, &Settings::default());
        assert!(!m.delete_row_at(0));
        assert!(!m.delete_column_at(0));
        assert_eq!((m.row_count(), m.col_count()), (1, 1));
        assert!(!m.can_undo());
    }

    #[test]
    fn test_delete_row_undo_restores_content_and_identity() {
        let mut m = model(&["a", "b", "c"]);
        m.sort_by_column(1, SortDirection::Descending);
        m.resize_row(0, 88.0, 1.0);
        let before = m.derive_projection();

        assert!(m.delete_row_at(0));
        assert_eq!(column(&mut m, 1), ["b", "a"]);
        assert!(m.undo());
        assert_eq!(m.derive_projection(), before);
        assert_eq!(m.row_height(0), 88.0);
    }

    #[test]
    fn test_undo_insert_on_empty_table() {
        let mut m = GridModel::new(0, 2, &Settings::default());
        assert!(m.insert_row(0));
        assert!(m.undo());
        assert_eq!(m.total_row_count(), 0);
        assert!(m.redo());
        assert_eq!(m.total_row_count(), 1);
    }

    #[test]
    fn test_column_insert_delete_undo() {
        let mut m = model(&["a", "b"]);
        assert!(m.insert_column_at(0));
        assert_eq!(m.col_count(), 3);
        assert_eq!(m.content(0, 0), Some(""));
        assert_eq!(m.content(0, 1), Some("row0"));
        assert_eq!(m.projection().frozen[0].content, "");

        assert!(m.undo());
        assert_eq!(m.col_count(), 2);
        assert_eq!(m.content(0, 0), Some("row0"));

        assert!(m.delete_column_at(0));
        assert_eq!(m.content(1, 0), Some("b"));
        assert!(m.undo());
        assert_eq!(m.content(1, 0), Some("row1"));
        assert_eq!(m.content(1, 1), Some("b"));
        assert!(!m.delete_column_at(5));
    }

    #[test]
    fn test_deleting_filtered_column_drops_filter() {
        let mut m = model(&["a", "b"]);
        m.insert_column_at(2);
        m.filter_by_values(1, &set(&["a"]));
        assert_eq!(m.row_count(), 1);
        assert!(m.delete_column_at(1));
        assert_eq!(m.row_count(), 2);
        assert!(m.undo());
        assert_eq!(m.row_count(), 1);
    }

    #[test]
    fn test_sort_and_filter_are_undoable() {
        let mut m = model(&["b", "a", "c"]);
        m.sort_by_column(1, SortDirection::Ascending);
        m.filter_by_values(1, &set(&["a", "c"]));
        assert_eq!(column(&mut m, 1), ["a", "c"]);

        m.undo();
        assert_eq!(column(&mut m, 1), ["a", "b", "c"]);
        m.undo();
        assert_eq!(column(&mut m, 1), ["b", "a", "c"]);
        assert_eq!(m.columns().active_sort(), None);

        m.redo();
        m.redo();
        assert_eq!(column(&mut m, 1), ["a", "c"]);
        assert_eq!(m.columns().active_sort(), Some((1, SortDirection::Ascending)));
    }

    #[test]
    fn test_column_edits() {
        let mut m = model(&["12", "7.5", "x"]);
        assert!(m.rename_column(1, "Amount"));
        assert!(m.resize_column(1, 300.0, 2.0));
        assert_eq!(m.column(1).unwrap().base_width, 150.0);
        assert!(m.auto_infer_column_type(1));
        assert_eq!(m.column(1).unwrap().column_type, CellType::Number);
        assert!(!m.rename_column(7, "nope"));

        m.undo();
        m.undo();
        assert_eq!(m.column(1).unwrap().base_width, 120.0);
        m.undo();
        assert_eq!(m.column(1).unwrap().name, "Column 2");
    }

    #[test]
    fn test_row_height_follows_identity() {
        let mut m = model(&["b", "a"]);
        assert_eq!(m.resize_row(0, 60.0, 2.0), Some((0, 30.0)));
        m.sort_by_column(1, SortDirection::Ascending);
        assert_eq!(m.row_height(1), 30.0);
        assert_eq!(m.row_height(0), 44.0);
        assert_eq!(m.row_heights(), vec![(0, 30.0)]);
    }

    #[test]
    fn test_value_counts_cached_until_write() {
        let mut m = model(&["a", "b", "a"]);
        assert_eq!(m.value_counts(1)[0], ValueCount { value: "a".into(), count: 2 });
        m.update_cell(1, 1, "a");
        assert_eq!(m.value_counts(1), &[ValueCount { value: "a".into(), count: 3 }]);
        assert!(m.value_counts(9).is_empty());
    }

    #[test]
    fn test_persisted_sort_applied_on_load() {
        let mut columns: Vec<Column> = ColumnCatalog::with_defaults(2, 120.0).iter().cloned().collect();
        columns[1].sort_direction = SortDirection::Ascending;
        let cells = vec![(0, 1, CellData::text("b")), (1, 1, CellData::text("a"))];
        let mut m = GridModel::from_parts(columns, 2, cells, &Settings::default());
        assert_eq!(column(&mut m, 1), ["a", "b"]);
    }

    #[test]
    fn test_empty_history_noops() {
        let mut m = model(&["a"]);
        assert!(!m.undo());
        assert!(!m.redo());
    }
}
