//! Row order tracking
//!
//! Three index spaces meet here:
//! - Data space: canonical storage order, row 0..N-1
//! - View space: data rows permuted by the active sort (all rows)
//! - Display space: visible view rows only, reindexed 0..K-1
//!
//! Key invariants:
//! - `original_order[data_row]` is that row's identity; only row
//!   insert/delete change it, never sort or filter
//! - `row_order` is always a permutation of 0..N-1
//! - `visible_mask` is indexed by DATA row
//! - `visible_rows` caches the visible VIEW rows in order

use notegrid_core::RowKey;

#[derive(Debug, Clone)]
pub struct RowOrderTracker {
    /// Identity of each data row
    original_order: Vec<RowKey>,

    /// view_row -> data_row
    row_order: Vec<usize>,

    /// data_row -> view_row
    data_to_view_map: Vec<usize>,

    /// true = visible, false = hidden by a filter
    visible_mask: Vec<bool>,

    /// Visible view rows, in view order
    visible_rows: Vec<usize>,
}

impl Default for RowOrderTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RowOrderTracker {
    /// Identity order for N rows with keys 0..N-1
    pub fn new(row_count: usize) -> Self {
        Self::from_keys((0..row_count as u64).map(RowKey::from_raw).collect())
    }

    /// Identity order over rows that already carry keys
    pub fn from_keys(keys: Vec<RowKey>) -> Self {
        let n = keys.len();
        Self {
            original_order: keys,
            row_order: (0..n).collect(),
            data_to_view_map: (0..n).collect(),
            visible_mask: vec![true; n],
            visible_rows: (0..n).collect(),
        }
    }

    /// Total number of data rows
    pub fn row_count(&self) -> usize {
        self.row_order.len()
    }

    /// Number of displayed rows
    pub fn visible_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// Row identities in data order
    pub fn original_order(&self) -> &[RowKey] {
        &self.original_order
    }

    /// Row identities in view order (all rows, filtered or not)
    pub fn current_order(&self) -> Vec<RowKey> {
        self.row_order.iter().map(|&d| self.original_order[d]).collect()
    }

    pub fn key_of(&self, data_row: usize) -> Option<RowKey> {
        self.original_order.get(data_row).copied()
    }

    pub fn data_row_of_key(&self, key: RowKey) -> Option<usize> {
        self.original_order.iter().position(|&k| k == key)
    }

    /// Key for a new row: one past the largest live key
    pub fn next_key(&self) -> RowKey {
        self.original_order
            .iter()
            .max()
            .map(|k| k.next())
            .unwrap_or_default()
    }

    pub fn row_order(&self) -> &[usize] {
        &self.row_order
    }

    pub fn visible_mask(&self) -> &[bool] {
        &self.visible_mask
    }

    pub fn visible_rows(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Map view row to data row
    pub fn view_to_data(&self, view_row: usize) -> Option<usize> {
        self.row_order.get(view_row).copied()
    }

    /// View position of a data row, visible or not
    pub fn data_to_view(&self, data_row: usize) -> Option<usize> {
        self.data_to_view_map.get(data_row).copied()
    }

    /// Map a display row to its data row
    pub fn display_to_data(&self, display_row: usize) -> Option<usize> {
        self.visible_rows
            .get(display_row)
            .and_then(|&view_row| self.view_to_data(view_row))
    }

    /// Display row of a data row; None if hidden or out of range
    pub fn data_to_display(&self, data_row: usize) -> Option<usize> {
        if !self.is_data_row_visible(data_row) {
            return None;
        }
        let view_row = self.data_to_view_map[data_row];
        self.visible_rows.binary_search(&view_row).ok()
    }

    /// Data rows in display order
    pub fn display_order(&self) -> Vec<usize> {
        self.visible_rows.iter().map(|&v| self.row_order[v]).collect()
    }

    pub fn is_data_row_visible(&self, data_row: usize) -> bool {
        self.visible_mask.get(data_row).copied().unwrap_or(false)
    }

    /// Is any filtering active?
    pub fn is_filtered(&self) -> bool {
        self.visible_count() < self.row_count()
    }

    /// Is the view order non-identity?
    pub fn is_sorted(&self) -> bool {
        self.row_order.iter().enumerate().any(|(i, &d)| i != d)
    }

    /// Where a row inserted at display position `display_pos` goes:
    /// (data row, view row). Past the last displayed row means append.
    pub fn insertion_point(&self, display_pos: usize) -> (usize, usize) {
        match self.visible_rows.get(display_pos) {
            Some(&view_row) => (self.row_order[view_row], view_row),
            None => (self.row_count(), self.row_count()),
        }
    }

    // -------------------------------------------------------------------------
    // Internal rebuilders
    // -------------------------------------------------------------------------

    fn rebuild_inverse_map(&mut self) {
        self.data_to_view_map.resize(self.row_order.len(), 0);
        for (view_row, &data_row) in self.row_order.iter().enumerate() {
            if data_row < self.data_to_view_map.len() {
                self.data_to_view_map[data_row] = view_row;
            }
        }
    }

    fn rebuild_visible_cache(&mut self) {
        let mask = &self.visible_mask;
        self.visible_rows = self
            .row_order
            .iter()
            .enumerate()
            .filter(|&(_, &data_row)| mask.get(data_row).copied().unwrap_or(false))
            .map(|(view_row, _)| view_row)
            .collect();
    }

    fn rebuild(&mut self) {
        self.rebuild_inverse_map();
        self.rebuild_visible_cache();
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Apply a view permutation (view_row -> data_row). Rejected unless it
    /// is a permutation of every data row.
    pub fn apply_order(&mut self, permutation: Vec<usize>) -> bool {
        if !is_permutation(&permutation, self.row_count()) {
            log::warn!("rejected row order of {} entries for {} rows", permutation.len(), self.row_count());
            return false;
        }
        self.row_order = permutation;
        self.rebuild();
        true
    }

    /// Back to data order, which is `original_order`
    pub fn clear_order(&mut self) {
        self.row_order = (0..self.row_order.len()).collect();
        self.rebuild();
    }

    /// Apply filter visibility (mask indexed by data row)
    pub fn apply_filter(&mut self, visible_mask: Vec<bool>) -> bool {
        if visible_mask.len() != self.row_count() {
            return false;
        }
        self.visible_mask = visible_mask;
        self.rebuild_visible_cache();
        true
    }

    /// Every row visible
    pub fn clear_filter(&mut self) {
        self.visible_mask = vec![true; self.row_order.len()];
        self.rebuild_visible_cache();
    }

    /// Insert a row identity at `data_row` (data space) shown at
    /// `view_row` (view space). Both positions clamp to the end.
    pub fn insert(&mut self, data_row: usize, view_row: usize, key: RowKey, visible: bool) {
        let data_row = data_row.min(self.row_count());
        let view_row = view_row.min(self.row_count());

        for data_ref in self.row_order.iter_mut() {
            if *data_ref >= data_row {
                *data_ref += 1;
            }
        }
        self.row_order.insert(view_row, data_row);
        self.original_order.insert(data_row, key);
        self.visible_mask.insert(data_row, visible);
        self.rebuild();
    }

    /// Remove the identity at `data_row`. Returns (view row, key, visible)
    /// for undo.
    pub fn remove(&mut self, data_row: usize) -> Option<(usize, RowKey, bool)> {
        if data_row >= self.row_count() {
            return None;
        }
        let view_row = self.data_to_view_map[data_row];
        self.row_order.remove(view_row);
        let key = self.original_order.remove(data_row);
        let visible = self.visible_mask.remove(data_row);
        self.data_to_view_map.remove(data_row);

        for data_ref in self.row_order.iter_mut() {
            if *data_ref > data_row {
                *data_ref -= 1;
            }
        }
        self.rebuild();
        Some((view_row, key, visible))
    }

    /// Restore a saved (row_order, visible_mask) pair; ignored if its
    /// shape no longer matches the table.
    pub fn restore(&mut self, row_order: Vec<usize>, visible_mask: Vec<bool>) -> bool {
        if visible_mask.len() != self.row_count() || !is_permutation(&row_order, self.row_count()) {
            return false;
        }
        self.row_order = row_order;
        self.visible_mask = visible_mask;
        self.rebuild();
        true
    }
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &d in order {
        if d >= n || seen[d] {
            return false;
        }
        seen[d] = true;
    }
    true
}
