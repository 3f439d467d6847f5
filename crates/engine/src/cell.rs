use notegrid_core::{RowKey, StableId};
use serde::{Deserialize, Serialize};

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

/// Per-cell presentation attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CellStyle {
    /// `#RRGGBB` or `#AARRGGBB`; None = theme default
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub bold: bool,
    pub italic: bool,
    /// Unscaled text size; None = settings default
    pub text_size: Option<f32>,
    pub alignment: Alignment,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}

/// What the canonical store holds for one (data row, column).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CellData {
    pub content: String,
    pub style: CellStyle,
}

impl CellData {
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), style: CellStyle::default() }
    }

    /// Nothing worth storing: no content and default style.
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.style.is_default()
    }
}

/// A displayed cell: position in the current projection plus the
/// identity of the row its data came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub content: String,
    pub style: CellStyle,
    pub stable_id: StableId,
}

impl Cell {
    pub fn new(row: usize, col: usize, data: CellData, row_key: RowKey) -> Self {
        Self {
            row,
            col,
            content: data.content,
            style: data.style,
            stable_id: StableId::new(row_key, col),
        }
    }

    /// Empty cell standing in for an absent (row, col).
    pub fn placeholder(row: usize, col: usize, row_key: RowKey) -> Self {
        Self::new(row, col, CellData::default(), row_key)
    }

    pub fn is_frozen(&self) -> bool {
        self.col == 0
    }
}
