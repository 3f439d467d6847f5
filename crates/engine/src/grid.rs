//! Dense grid materialization and display-order emission.
//!
//! These are the pure functions that turn canonical cells into what the
//! renderer shows: `build_full_grid` fills holes with placeholders, and
//! `emit_grid_in_order` re-tags rows for a display permutation while the
//! identity keeps pointing at the row the data came from.

use notegrid_core::RowKey;

use crate::cell::Cell;

/// Dense row-major grid. Row `r` carries identity `row_keys[r]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    row_keys: Vec<RowKey>,
    cols: usize,
}

impl Grid {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    pub fn row_key(&self, row: usize) -> Option<RowKey> {
        self.row_keys.get(row).copied()
    }

    /// Attach row identities. Keys beyond the row count are ignored;
    /// rows without a key keep their positional one.
    pub fn with_row_keys(mut self, keys: &[RowKey]) -> Self {
        for (row, key) in keys.iter().enumerate().take(self.rows.len()) {
            self.row_keys[row] = *key;
            for cell in self.rows[row].iter_mut() {
                cell.stable_id.row_key = *key;
            }
        }
        self
    }
}

/// Materialize `row_count x col_count` cells. Cells from either partition
/// land at their own (row, col); anything missing becomes an empty
/// placeholder; out-of-range input is ignored. Row identity defaults to
/// the row position.
pub fn build_full_grid(
    frozen_cells: &[Cell],
    scrollable_cells: &[Cell],
    row_count: usize,
    col_count: usize,
) -> Grid {
    let row_keys: Vec<RowKey> = (0..row_count).map(|r| RowKey::from_raw(r as u64)).collect();
    let mut rows: Vec<Vec<Cell>> = (0..row_count)
        .map(|r| (0..col_count).map(|c| Cell::placeholder(r, c, row_keys[r])).collect())
        .collect();

    for cell in frozen_cells.iter().chain(scrollable_cells) {
        if cell.row < row_count && cell.col < col_count {
            let slot = &mut rows[cell.row][cell.col];
            slot.content = cell.content.clone();
            slot.style = cell.style.clone();
        }
    }

    Grid { rows, row_keys, cols: col_count }
}

/// Lay `grid` out in display order. Display row `i` shows
/// `grid[order[i]]`, re-tagged with `row = i` and identity
/// `(key of order[i], col)`. Out-of-range entries in `order` are skipped.
///
/// Returns (frozen cells sorted by row, scrollable cells sorted by (row, col)).
pub fn emit_grid_in_order(grid: &Grid, order: &[usize]) -> (Vec<Cell>, Vec<Cell>) {
    let mut frozen = Vec::with_capacity(order.len());
    let mut scrollable = Vec::with_capacity(order.len() * grid.cols.saturating_sub(1));

    let mut display_row = 0;
    for &source_row in order {
        let Some(row) = grid.rows.get(source_row) else {
            continue;
        };
        let key = grid.row_keys[source_row];
        for cell in row {
            let mut cell = cell.clone();
            cell.row = display_row;
            cell.stable_id.row_key = key;
            if cell.is_frozen() {
                frozen.push(cell);
            } else {
                scrollable.push(cell);
            }
        }
        display_row += 1;
    }

    frozen.sort_by_key(|c| c.row);
    scrollable.sort_by_key(|c| (c.row, c.col));
    (frozen, scrollable)
}

/// The displayed grid: both partitions, dense, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub frozen: Vec<Cell>,
    pub scrollable: Vec<Cell>,
    pub row_count: usize,
    pub col_count: usize,
}

impl Projection {
    pub fn from_grid(grid: &Grid, order: &[usize]) -> Self {
        let (frozen, scrollable) = emit_grid_in_order(grid, order);
        Self {
            row_count: order.iter().filter(|&&r| r < grid.row_count()).count(),
            col_count: grid.col_count(),
            frozen,
            scrollable,
        }
    }

    /// Cell at a display position; None when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row >= self.row_count || col >= self.col_count {
            return None;
        }
        if col == 0 {
            self.frozen.get(row)
        } else {
            let stride = self.col_count - 1;
            self.scrollable.get(row * stride + (col - 1))
        }
    }

    pub fn content(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.content.as_str())
    }

    /// One column top to bottom, in display order.
    pub fn column(&self, col: usize) -> Vec<&str> {
        (0..self.row_count).filter_map(|r| self.content(r, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellData;
    use notegrid_core::StableId;

    fn cell(row: usize, col: usize, text: &str) -> Cell {
        Cell::new(row, col, CellData::text(text), RowKey::from_raw(row as u64))
    }

    #[test]
    fn test_missing_cells_become_placeholders() {
        let grid = build_full_grid(&[cell(1, 0, "a")], &[cell(0, 2, "b")], 2, 3);
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.cell(1, 0).unwrap().content, "a");
        assert_eq!(grid.cell(0, 2).unwrap().content, "b");

        let hole = grid.cell(1, 1).unwrap();
        assert_eq!(hole.content, "");
        assert_eq!((hole.row, hole.col), (1, 1));
    }

    #[test]
    fn test_out_of_range_input_ignored() {
        let grid = build_full_grid(&[cell(5, 0, "x")], &[cell(0, 9, "y")], 1, 2);
        assert!(grid.row(0).unwrap().iter().all(|c| c.content.is_empty()));
    }

    #[test]
    fn test_emit_follows_original_identity() {
        let frozen = vec![cell(0, 0, "first"), cell(1, 0, "second")];
        let scrollable = vec![cell(0, 1, "1"), cell(1, 1, "2")];
        let grid = build_full_grid(&frozen, &scrollable, 2, 2);

        let (f, s) = emit_grid_in_order(&grid, &[1, 0]);
        assert_eq!(f[0].content, "second");
        assert_eq!(f[0].row, 0);
        assert_eq!(f[0].stable_id, StableId::new(RowKey::from_raw(1), 0));
        assert_eq!(s[1].content, "1");
        assert_eq!(s[1].row, 1);
        assert_eq!(s[1].stable_id, StableId::new(RowKey::from_raw(0), 1));
    }

    #[test]
    fn test_emit_uses_attached_keys() {
        let grid = build_full_grid(&[], &[], 2, 1)
            .with_row_keys(&[RowKey::from_raw(10), RowKey::from_raw(20)]);
        let (f, _) = emit_grid_in_order(&grid, &[1, 7, 0]);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].stable_id.row_key, RowKey::from_raw(20));
        assert_eq!(f[1].stable_id.row_key, RowKey::from_raw(10));
    }

    #[test]
    fn test_projection_lookup() {
        let scrollable = vec![cell(0, 1, "a"), cell(0, 2, "b"), cell(1, 2, "c")];
        let grid = build_full_grid(&[], &scrollable, 2, 3);
        let projection = Projection::from_grid(&grid, &[1, 0]);

        assert_eq!(projection.row_count, 2);
        assert_eq!(projection.content(0, 2), Some("c"));
        assert_eq!(projection.content(1, 1), Some("a"));
        assert_eq!(projection.content(2, 0), None);
        assert_eq!(projection.column(2), vec!["c", "b"]);
    }
}
