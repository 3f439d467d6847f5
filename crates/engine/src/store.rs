//! Canonical cell storage.
//!
//! Rows here are DATA rows: the table's storage order, which sort and
//! filter never touch. Only structural edits (row/column insert and
//! delete) shift them. Column 0 lives in the frozen partition, every
//! other column in the scrollable partition.

use rustc_hash::FxHashMap;

use crate::cell::CellData;

#[derive(Debug, Clone, Default)]
pub struct CellStore {
    rows: usize,
    cols: usize,
    /// data row -> column 0 cell
    frozen: FxHashMap<usize, CellData>,
    /// (data row, col >= 1) -> cell
    scrollable: FxHashMap<(usize, usize), CellData>,
}

impl CellStore {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, ..Self::default() }
    }

    /// Build from sparse cells; entries outside `rows x cols` are dropped.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: impl IntoIterator<Item = (usize, usize, CellData)>,
    ) -> Self {
        let mut store = Self::new(rows, cols);
        for (row, col, data) in cells {
            if row < rows && col < cols {
                store.place(row, col, data);
            }
        }
        store
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellData> {
        if col == 0 {
            self.frozen.get(&row)
        } else {
            self.scrollable.get(&(row, col))
        }
    }

    /// Content at (row, col); absent or out-of-range cells read as "".
    pub fn content(&self, row: usize, col: usize) -> &str {
        self.get(row, col).map(|c| c.content.as_str()).unwrap_or("")
    }

    /// Dense copy of a cell, materializing absent cells as empty.
    pub fn cell_or_default(&self, row: usize, col: usize) -> CellData {
        self.get(row, col).cloned().unwrap_or_default()
    }

    /// Store `data` and return what was there before.
    /// Returns None (and stores nothing) when out of range.
    pub fn set(&mut self, row: usize, col: usize, data: CellData) -> Option<CellData> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let previous = self.take(row, col);
        self.place(row, col, data);
        Some(previous.unwrap_or_default())
    }

    /// Frozen partition as (data row, &cell), sorted by row.
    pub fn frozen_cells(&self) -> Vec<(usize, &CellData)> {
        let mut cells: Vec<_> = self.frozen.iter().map(|(r, c)| (*r, c)).collect();
        cells.sort_by_key(|(r, _)| *r);
        cells
    }

    /// Scrollable partition as (data row, col, &cell), sorted by (row, col).
    pub fn scrollable_cells(&self) -> Vec<(usize, usize, &CellData)> {
        let mut cells: Vec<_> = self.scrollable.iter().map(|((r, c), d)| (*r, *c, d)).collect();
        cells.sort_by_key(|(r, c, _)| (*r, *c));
        cells
    }

    /// Every stored (non-absent) cell, frozen first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &CellData)> {
        self.frozen
            .iter()
            .map(|(r, d)| (*r, 0, d))
            .chain(self.scrollable.iter().map(|((r, c), d)| (*r, *c, d)))
    }

    /// Content of `col` for every data row, in data order.
    pub fn column_values(&self, col: usize) -> Vec<&str> {
        (0..self.rows).map(|row| self.content(row, col)).collect()
    }

    /// Dense copy of one data row.
    pub fn row_cells(&self, row: usize) -> Vec<CellData> {
        (0..self.cols).map(|col| self.cell_or_default(row, col)).collect()
    }

    /// Dense copy of one column.
    pub fn column_cells(&self, col: usize) -> Vec<CellData> {
        (0..self.rows).map(|row| self.cell_or_default(row, col)).collect()
    }

    // -------------------------------------------------------------------------
    // Structural edits
    // -------------------------------------------------------------------------

    /// Insert a row at `at` (clamped to the end), shifting later rows down.
    /// `cells[c]` seeds column c; missing entries are empty.
    pub fn insert_row(&mut self, at: usize, cells: Vec<CellData>) -> usize {
        let at = at.min(self.rows);
        self.rekey(|row, col| Some((if row >= at { row + 1 } else { row }, col)));
        self.rows += 1;
        for (col, data) in cells.into_iter().enumerate().take(self.cols) {
            self.place(at, col, data);
        }
        at
    }

    /// Remove data row `at`, shifting later rows up. Returns the removed
    /// row, dense.
    pub fn remove_row(&mut self, at: usize) -> Option<Vec<CellData>> {
        if at >= self.rows {
            return None;
        }
        let removed = self.row_cells(at);
        self.rekey(|row, col| match row.cmp(&at) {
            std::cmp::Ordering::Less => Some((row, col)),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some((row - 1, col)),
        });
        self.rows -= 1;
        Some(removed)
    }

    /// Insert a column at `at` (clamped to the end). Inserting at 0 makes
    /// the new column frozen and moves the old frozen column into the
    /// scrollable partition.
    pub fn insert_col(&mut self, at: usize, cells: Vec<CellData>) -> usize {
        let at = at.min(self.cols);
        self.rekey(|row, col| Some((row, if col >= at { col + 1 } else { col })));
        self.cols += 1;
        for (row, data) in cells.into_iter().enumerate().take(self.rows) {
            self.place(row, at, data);
        }
        at
    }

    /// Remove column `at`, shifting later columns left.
    pub fn remove_col(&mut self, at: usize) -> Option<Vec<CellData>> {
        if at >= self.cols {
            return None;
        }
        let removed = self.column_cells(at);
        self.rekey(|row, col| match col.cmp(&at) {
            std::cmp::Ordering::Less => Some((row, col)),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some((row, col - 1)),
        });
        self.cols -= 1;
        Some(removed)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn take(&mut self, row: usize, col: usize) -> Option<CellData> {
        if col == 0 {
            self.frozen.remove(&row)
        } else {
            self.scrollable.remove(&(row, col))
        }
    }

    /// Route a cell to its partition. Blank cells are not stored.
    fn place(&mut self, row: usize, col: usize, data: CellData) {
        if data.is_blank() {
            return;
        }
        if col == 0 {
            self.frozen.insert(row, data);
        } else {
            self.scrollable.insert((row, col), data);
        }
    }

    /// Move every cell to `f(row, col)`; None drops the cell.
    fn rekey(&mut self, f: impl Fn(usize, usize) -> Option<(usize, usize)>) {
        let frozen = std::mem::take(&mut self.frozen);
        let scrollable = std::mem::take(&mut self.scrollable);
        let all = frozen
            .into_iter()
            .map(|(r, d)| (r, 0, d))
            .chain(scrollable.into_iter().map(|((r, c), d)| (r, c, d)));
        for (row, col, data) in all {
            if let Some((row, col)) = f(row, col) {
                self.place(row, col, data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CellStore {
        // 3 rows x 3 cols, content "r{row}c{col}"
        let cells = (0..3).flat_map(|r| (0..3).map(move |c| (r, c, CellData::text(format!("r{r}c{c}")))));
        CellStore::from_cells(3, 3, cells)
    }

    #[test]
    fn test_partitioning() {
        let store = sample();
        assert_eq!(store.frozen_cells().len(), 3);
        assert_eq!(store.scrollable_cells().len(), 6);
        assert!(store.frozen_cells().iter().all(|(_, c)| c.content.ends_with("c0")));
        assert!(store.scrollable_cells().iter().all(|(_, col, _)| *col >= 1));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut store = sample();
        assert_eq!(store.content(9, 9), "");
        assert!(store.set(3, 0, CellData::text("x")).is_none());
        assert!(store.set(0, 3, CellData::text("x")).is_none());
        assert_eq!(store.iter().count(), 9);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut store = CellStore::new(2, 2);
        assert_eq!(store.set(1, 1, CellData::text("a")), Some(CellData::default()));
        assert_eq!(store.set(1, 1, CellData::text("b")), Some(CellData::text("a")));
        assert_eq!(store.content(1, 1), "b");
        // Blank writes clear the slot.
        store.set(1, 1, CellData::default());
        assert!(store.get(1, 1).is_none());
    }

    #[test]
    fn test_insert_and_remove_row() {
        let mut store = sample();
        store.insert_row(1, vec![CellData::text("new")]);
        assert_eq!(store.row_count(), 4);
        assert_eq!(store.content(1, 0), "new");
        assert_eq!(store.content(1, 1), "");
        assert_eq!(store.content(2, 2), "r1c2");

        let removed = store.remove_row(1).unwrap();
        assert_eq!(removed[0].content, "new");
        assert_eq!(store.row_count(), 3);
        assert_eq!(store.content(1, 2), "r1c2");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut store = CellStore::new(1, 1);
        assert!(store.remove_row(1).is_none());
        assert!(store.remove_col(1).is_none());
        assert_eq!(store.row_count(), 1);
    }

    #[test]
    fn test_insert_col_at_zero_moves_frozen() {
        let mut store = sample();
        store.insert_col(0, vec![CellData::text("head")]);
        assert_eq!(store.col_count(), 4);
        assert_eq!(store.content(0, 0), "head");
        assert_eq!(store.content(0, 1), "r0c0");
        assert_eq!(store.frozen_cells().len(), 1);
        assert_eq!(store.scrollable_cells().len(), 9);
    }

    #[test]
    fn test_remove_frozen_col_promotes_next() {
        let mut store = sample();
        let removed = store.remove_col(0).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(store.content(2, 0), "r2c1");
        assert_eq!(store.frozen_cells().len(), 3);
        assert_eq!(store.scrollable_cells().len(), 3);
    }
}
