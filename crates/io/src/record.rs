//! Storage-shaped table records and conversion to and from the model.

use serde::{Deserialize, Serialize};

use notegrid_config::Settings;
use notegrid_core::SortDirection;
use notegrid_engine::{CellData, CellStyle, CellType, Column, GridModel};

/// One non-blank cell at a data position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCell {
    pub row: usize,
    pub col: usize,
    pub content: String,
    #[serde(default)]
    pub style: CellStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredColumn {
    pub index: usize,
    pub name: String,
    /// Width at scale 1.0
    pub width: f32,
    #[serde(default)]
    pub column_type: CellType,
    #[serde(default)]
    pub sort: SortDirection,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl From<&Column> for StoredColumn {
    fn from(c: &Column) -> Self {
        Self {
            index: c.index,
            name: c.name.clone(),
            width: c.base_width,
            column_type: c.column_type,
            sort: c.sort_direction,
            visible: c.visible,
        }
    }
}

impl StoredColumn {
    pub fn into_column(self) -> Column {
        let mut column = Column::new(self.index, self.name, self.width);
        column.column_type = self.column_type;
        column.sort_direction = self.sort;
        column.visible = self.visible;
        column
    }
}

/// A whole table in data order, as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<StoredColumn>,
    pub cells: Vec<StoredCell>,
    pub row_count: usize,
    /// (data row, height at scale 1.0) for resized rows only
    pub row_heights: Vec<(usize, f32)>,
}

impl TableData {
    /// A blank table with default column names.
    pub fn blank(rows: usize, cols: usize, settings: &Settings) -> Self {
        Self::from_model(&GridModel::new(rows, cols.max(1), settings))
    }

    pub fn from_model(model: &GridModel) -> Self {
        let mut cells: Vec<StoredCell> = model
            .store()
            .iter()
            .filter(|(_, _, d)| !d.is_blank())
            .map(|(row, col, d)| StoredCell {
                row,
                col,
                content: d.content.clone(),
                style: d.style.clone(),
            })
            .collect();
        cells.sort_by_key(|c| (c.row, c.col));

        Self {
            columns: model.columns().iter().map(StoredColumn::from).collect(),
            cells,
            row_count: model.total_row_count(),
            row_heights: model.row_heights(),
        }
    }

    /// Build the in-memory model. Rows and columns are widened to fit
    /// every stored cell; a table with no columns gets one.
    pub fn into_model(self, settings: &Settings) -> GridModel {
        let rows = self
            .cells
            .iter()
            .map(|c| c.row + 1)
            .max()
            .unwrap_or(0)
            .max(self.row_count);

        let mut columns: Vec<Column> = {
            let mut stored = self.columns;
            stored.sort_by_key(|c| c.index);
            stored.into_iter().map(StoredColumn::into_column).collect()
        };
        let needed = self.cells.iter().map(|c| c.col + 1).max().unwrap_or(1);
        while columns.len() < needed {
            let index = columns.len();
            columns.push(Column::new(
                index,
                format!("Column {}", index + 1),
                settings.default_column_width,
            ));
        }

        let cells = self.cells.into_iter().map(|c| {
            (c.row, c.col, CellData { content: c.content, style: c.style })
        });
        GridModel::from_parts(columns, rows, cells, settings).with_row_heights(self.row_heights)
    }
}
