//! Scaled column geometry and offset-to-column mapping.

use notegrid_engine::ColumnCatalog;

/// First partially visible column at a horizontal offset, and how far
/// into that column the offset lands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnAnchor {
    pub column: usize,
    pub sub_offset: f32,
}

impl ColumnAnchor {
    pub fn new(column: usize, sub_offset: f32) -> Self {
        Self { column, sub_offset }
    }
}

/// Pixel widths of a run of columns at the current scale.
///
/// `positions[i]` is the left edge of the i-th column in the run and
/// `positions[n]` the total width, so mapping an offset back to a
/// column is a binary search over the same sums that built it.
#[derive(Debug, Clone)]
pub struct ColumnWidthProvider {
    base_widths: Vec<f32>,
    first_column: usize,
    scale: f32,
    base_row_height: f32,
    positions: Vec<f32>,
}

impl ColumnWidthProvider {
    /// `first_column` is the catalog index of `base_widths[0]`.
    pub fn new(base_widths: Vec<f32>, first_column: usize, scale: f32, base_row_height: f32) -> Self {
        let mut provider = Self {
            base_widths,
            first_column,
            scale,
            base_row_height,
            positions: Vec::new(),
        };
        provider.rebuild();
        provider
    }

    /// Columns right of the frozen column, which is what the header
    /// pane scrolls over.
    pub fn for_scrollable(catalog: &ColumnCatalog, scale: f32, base_row_height: f32) -> Self {
        let widths = catalog.layout_widths().into_iter().skip(1).collect();
        Self::new(widths, 1, scale, base_row_height)
    }

    pub fn for_all(catalog: &ColumnCatalog, scale: f32, base_row_height: f32) -> Self {
        Self::new(catalog.layout_widths(), 0, scale, base_row_height)
    }

    fn rebuild(&mut self) {
        self.positions.clear();
        self.positions.reserve(self.base_widths.len() + 1);
        let mut x = 0.0f32;
        self.positions.push(x);
        for &w in &self.base_widths {
            x += w.max(0.0) * self.scale;
            self.positions.push(x);
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.rebuild();
        }
    }

    pub fn set_base_widths(&mut self, base_widths: Vec<f32>, first_column: usize) {
        self.base_widths = base_widths;
        self.first_column = first_column;
        self.rebuild();
    }

    pub fn set_base_row_height(&mut self, height: f32) {
        self.base_row_height = height;
    }

    pub fn column_count(&self) -> usize {
        self.base_widths.len()
    }

    pub fn first_column(&self) -> usize {
        self.first_column
    }

    /// Width in px of catalog column `col`; 0 outside the run.
    pub fn column_width_px(&self, col: usize) -> f32 {
        col.checked_sub(self.first_column)
            .and_then(|i| self.base_widths.get(i))
            .map_or(0.0, |w| w.max(0.0) * self.scale)
    }

    pub fn row_height_px(&self) -> f32 {
        self.base_row_height * self.scale
    }

    /// Left edge of catalog column `col` within the run.
    pub fn column_left(&self, col: usize) -> Option<f32> {
        let i = col.checked_sub(self.first_column)?;
        if i < self.base_widths.len() {
            self.positions.get(i).copied()
        } else {
            None
        }
    }

    pub fn total_width_px(&self) -> f32 {
        self.positions.last().copied().unwrap_or(0.0)
    }

    pub fn max_horizontal_offset(&self, viewport_width: f32) -> f32 {
        (self.total_width_px() - viewport_width).max(0.0)
    }

    pub fn clamp_offset(&self, offset: f32, viewport_width: f32) -> f32 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_horizontal_offset(viewport_width))
    }

    /// Map a horizontal offset to `(column, sub_offset)`.
    ///
    /// Boundaries belong to the column on their right: an offset equal
    /// to a column's left edge yields that column with sub-offset 0.
    /// Zero-width columns are never chosen.
    pub fn map_offset_to_column(&self, offset: f32) -> ColumnAnchor {
        let n = self.base_widths.len();
        if n == 0 {
            return ColumnAnchor::new(self.first_column, 0.0);
        }
        let offset = if offset.is_nan() { 0.0 } else { offset.max(0.0) };
        let total = self.total_width_px();

        if offset >= total {
            return match (0..n).rev().find(|&i| self.positions[i + 1] > self.positions[i]) {
                Some(i) => ColumnAnchor::new(
                    self.first_column + i,
                    self.positions[i + 1] - self.positions[i],
                ),
                None => ColumnAnchor::new(self.first_column, 0.0),
            };
        }

        // Last left edge <= offset; ties skip collapsed columns.
        let i = self.positions[..n].partition_point(|&p| p <= offset) - 1;
        ColumnAnchor::new(self.first_column + i, offset - self.positions[i])
    }

    /// Inverse of `map_offset_to_column`.
    pub fn offset_of(&self, anchor: ColumnAnchor) -> f32 {
        match self.column_left(anchor.column) {
            Some(left) => left + anchor.sub_offset,
            None if anchor.column >= self.first_column + self.base_widths.len() => {
                self.total_width_px()
            }
            None => anchor.sub_offset.max(0.0),
        }
    }

    /// Columns needing at least one pixel at `offset` within `viewport_width`.
    pub fn visible_columns(&self, offset: f32, viewport_width: f32) -> std::ops::Range<usize> {
        let n = self.base_widths.len();
        if n == 0 {
            return self.first_column..self.first_column;
        }
        let start = self.map_offset_to_column(offset).column - self.first_column;
        let right = offset + viewport_width;
        let end = self.positions[..n].partition_point(|&p| p < right).max(start + 1);
        self.first_column + start..self.first_column + end.min(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notegrid_engine::Column;

    fn provider(widths: &[f32], scale: f32) -> ColumnWidthProvider {
        ColumnWidthProvider::new(widths.to_vec(), 0, scale, 44.0)
    }

    #[test]
    fn test_total_and_max_offset() {
        let p = provider(&[100.0, 150.0, 200.0], 1.0);
        assert_eq!(p.total_width_px(), 450.0);
        assert_eq!(p.max_horizontal_offset(300.0), 150.0);
        assert_eq!(p.clamp_offset(200.0, 300.0), 150.0);
        assert_eq!(p.clamp_offset(-20.0, 300.0), 0.0);
        assert_eq!(p.max_horizontal_offset(600.0), 0.0);
    }

    #[test]
    fn test_scaled_sizes() {
        let p = provider(&[100.0, 150.0], 1.5);
        assert_eq!(p.column_width_px(1), 225.0);
        assert_eq!(p.row_height_px(), 66.0);
        assert_eq!(p.column_width_px(7), 0.0);
    }

    #[test]
    fn test_mapping_boundaries() {
        let p = provider(&[100.0, 150.0, 200.0], 1.0);
        assert_eq!(p.map_offset_to_column(0.0), ColumnAnchor::new(0, 0.0));
        assert_eq!(p.map_offset_to_column(99.5), ColumnAnchor::new(0, 99.5));
        assert_eq!(p.map_offset_to_column(100.0), ColumnAnchor::new(1, 0.0));
        assert_eq!(p.map_offset_to_column(249.0), ColumnAnchor::new(1, 149.0));
        assert_eq!(p.map_offset_to_column(250.0), ColumnAnchor::new(2, 0.0));
        assert_eq!(p.map_offset_to_column(450.0), ColumnAnchor::new(2, 200.0));
        assert_eq!(p.map_offset_to_column(999.0), ColumnAnchor::new(2, 200.0));
        assert_eq!(p.map_offset_to_column(-3.0), ColumnAnchor::new(0, 0.0));
    }

    #[test]
    fn test_mapping_inverse() {
        let p = provider(&[100.0, 150.0, 200.0], 1.0);
        for offset in [0.0, 1.0, 99.0, 100.0, 101.0, 250.0, 300.0, 450.0] {
            assert_eq!(p.offset_of(p.map_offset_to_column(offset)), offset);
        }
    }

    #[test]
    fn test_mapping_skips_hidden_columns() {
        let p = provider(&[100.0, 0.0, 50.0, 0.0], 1.0);
        assert_eq!(p.map_offset_to_column(100.0), ColumnAnchor::new(2, 0.0));
        assert_eq!(p.map_offset_to_column(150.0), ColumnAnchor::new(2, 50.0));
    }

    #[test]
    fn test_empty_run() {
        let p = ColumnWidthProvider::new(Vec::new(), 1, 1.0, 44.0);
        assert_eq!(p.total_width_px(), 0.0);
        assert_eq!(p.map_offset_to_column(10.0), ColumnAnchor::new(1, 0.0));
        assert_eq!(p.visible_columns(0.0, 100.0), 1..1);
    }

    #[test]
    fn test_scrollable_skips_frozen() {
        let mut columns = vec![
            Column::new(0, "Name", 80.0),
            Column::new(1, "A", 100.0),
            Column::new(2, "B", 120.0),
        ];
        columns[2].visible = false;
        let catalog = ColumnCatalog::from_columns(columns, 120.0);
        let p = ColumnWidthProvider::for_scrollable(&catalog, 2.0, 44.0);
        assert_eq!(p.first_column(), 1);
        assert_eq!(p.column_width_px(1), 200.0);
        assert_eq!(p.column_width_px(2), 0.0);
        assert_eq!(p.column_left(1), Some(0.0));
        assert_eq!(p.total_width_px(), 200.0);
    }

    #[test]
    fn test_visible_columns() {
        let p = provider(&[100.0, 150.0, 200.0], 1.0);
        assert_eq!(p.visible_columns(0.0, 100.0), 0..1);
        assert_eq!(p.visible_columns(50.0, 100.0), 0..2);
        assert_eq!(p.visible_columns(150.0, 300.0), 1..3);
    }

    #[test]
    fn test_rescale() {
        let mut p = provider(&[100.0, 100.0], 1.0);
        p.set_scale(2.0);
        assert_eq!(p.total_width_px(), 400.0);
        assert_eq!(p.map_offset_to_column(250.0), ColumnAnchor::new(1, 50.0));
    }
}
