//! Column definitions and content type detection.

use notegrid_core::SortDirection;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::filter::ColumnFilter;
use crate::sort::parse_number;

// =============================================================================
// CellType
// =============================================================================

/// Content type of a value or a whole column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    Image,
}

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}-\d{1,2}-\d{1,2}$",
        r"^\d{4}/\d{1,2}/\d{1,2}$",
        r"^\d{1,2}-\d{1,2}-\d{4}$",
        r"^\d{1,2}/\d{1,2}/\d{4}$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const BOOLEAN_WORDS: &[&str] = &["true", "false", "是", "否", "✓", "✗", "1", "0"];
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];
const IMAGE_SCHEMES: &[&str] = &["content://", "file://"];

impl CellType {
    /// Classify one value. Blank is Text. Booleans win over numbers, so
    /// "1" and "0" are Boolean.
    pub fn detect(content: &str) -> Self {
        let content = content.trim();
        if content.is_empty() {
            return CellType::Text;
        }

        let lower = content.to_lowercase();
        if BOOLEAN_WORDS.contains(&lower.as_str()) {
            CellType::Boolean
        } else if parse_number(content).is_some() {
            CellType::Number
        } else if DATE_PATTERNS.iter().any(|re| re.is_match(content)) {
            CellType::Date
        } else if IMAGE_SUFFIXES.iter().any(|s| lower.ends_with(s))
            || IMAGE_SCHEMES.iter().any(|s| content.starts_with(s))
        {
            CellType::Image
        } else {
            CellType::Text
        }
    }
}

/// Type holding a strict majority of the non-blank values, else Text.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str>) -> CellType {
    let mut counts = [0usize; 5];
    let mut non_blank = 0usize;

    for value in values {
        if value.trim().is_empty() {
            continue;
        }
        non_blank += 1;
        let slot = match CellType::detect(value) {
            CellType::Text => 0,
            CellType::Number => 1,
            CellType::Date => 2,
            CellType::Boolean => 3,
            CellType::Image => 4,
        };
        counts[slot] += 1;
    }

    if non_blank == 0 {
        return CellType::Text;
    }

    let majority = |n: usize| n * 2 > non_blank;
    if majority(counts[1]) {
        CellType::Number
    } else if majority(counts[2]) {
        CellType::Date
    } else if majority(counts[3]) {
        CellType::Boolean
    } else if majority(counts[4]) {
        CellType::Image
    } else {
        CellType::Text
    }
}

// =============================================================================
// Column
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Storage id, None until the column has been persisted
    pub id: Option<i64>,
    /// Position in the catalog (kept in sync by ColumnCatalog)
    pub index: usize,
    pub name: String,
    /// Width at scale 1.0
    pub base_width: f32,
    pub column_type: CellType,
    pub sort_direction: SortDirection,
    pub filter: Option<ColumnFilter>,
    pub visible: bool,
}

impl Column {
    pub fn new(index: usize, name: impl Into<String>, base_width: f32) -> Self {
        Self {
            id: None,
            index,
            name: name.into(),
            base_width,
            column_type: CellType::Text,
            sort_direction: SortDirection::Unsorted,
            filter: None,
            visible: true,
        }
    }

    /// Column 0 is always the frozen column.
    pub fn frozen(&self) -> bool {
        self.index == 0
    }

    /// Width that takes up horizontal space; hidden columns collapse to 0.
    pub fn layout_width(&self) -> f32 {
        if self.visible {
            self.base_width
        } else {
            0.0
        }
    }
}

// =============================================================================
// ColumnCatalog
// =============================================================================

/// Ordered column definitions.
///
/// Invariant: `columns[i].index == i`, and at most one column has an
/// active sort direction.
#[derive(Debug, Clone)]
pub struct ColumnCatalog {
    columns: Vec<Column>,
    default_width: f32,
}

impl ColumnCatalog {
    /// `count` columns named "Column 1".."Column N".
    pub fn with_defaults(count: usize, default_width: f32) -> Self {
        let columns = (0..count)
            .map(|i| Column::new(i, default_column_name(i), default_width))
            .collect();
        Self { columns, default_width }
    }

    pub fn from_columns(mut columns: Vec<Column>, default_width: f32) -> Self {
        // Keep the first active sort only.
        let mut seen_sort = false;
        for column in columns.iter_mut() {
            if column.sort_direction.is_active() {
                if seen_sort {
                    column.sort_direction = SortDirection::Unsorted;
                }
                seen_sort = true;
            }
        }
        let mut catalog = Self { columns, default_width };
        catalog.reindex();
        catalog
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn default_width(&self) -> f32 {
        self.default_width
    }

    /// Widths at scale 1.0 as laid out, hidden columns as 0.
    pub fn layout_widths(&self) -> Vec<f32> {
        self.columns.iter().map(Column::layout_width).collect()
    }

    /// The column carrying the active sort, if any.
    pub fn active_sort(&self) -> Option<(usize, SortDirection)> {
        self.columns
            .iter()
            .find(|c| c.sort_direction.is_active())
            .map(|c| (c.index, c.sort_direction))
    }

    /// Set `index`'s direction and clear every other column's.
    pub fn set_sort(&mut self, index: usize, direction: SortDirection) -> bool {
        if index >= self.columns.len() {
            return false;
        }
        for column in self.columns.iter_mut() {
            column.sort_direction = if column.index == index {
                direction
            } else {
                SortDirection::Unsorted
            };
        }
        true
    }

    pub fn clear_sort(&mut self) {
        for column in self.columns.iter_mut() {
            column.sort_direction = SortDirection::Unsorted;
        }
    }

    /// Columns with a filter, as (index, filter).
    pub fn active_filters(&self) -> Vec<(usize, ColumnFilter)> {
        self.columns
            .iter()
            .filter_map(|c| c.filter.clone().map(|f| (c.index, f)))
            .collect()
    }

    pub fn has_filters(&self) -> bool {
        self.columns.iter().any(|c| c.filter.is_some())
    }

    /// Replace every column's filter from `filters`; unlisted columns are cleared.
    pub(crate) fn restore_filters(&mut self, filters: &[(usize, ColumnFilter)]) {
        for column in self.columns.iter_mut() {
            column.filter = None;
        }
        for (index, filter) in filters {
            if let Some(column) = self.columns.get_mut(*index) {
                column.filter = Some(filter.clone());
            }
        }
    }

    /// A fresh column for position `index`, not yet inserted.
    pub fn new_column(&self, index: usize) -> Column {
        Column::new(index, default_column_name(index), self.default_width)
    }

    /// Insert `column` at `index` (clamped to the end) and renumber.
    pub fn insert(&mut self, index: usize, column: Column) -> usize {
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        self.reindex();
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<Column> {
        if index >= self.columns.len() {
            return None;
        }
        let removed = self.columns.remove(index);
        self.reindex();
        Some(removed)
    }

    /// Replace the definition at `index`, keeping the index field consistent.
    pub(crate) fn replace(&mut self, index: usize, mut column: Column) -> Option<Column> {
        let slot = self.columns.get_mut(index)?;
        column.index = index;
        Some(std::mem::replace(slot, column))
    }

    fn reindex(&mut self) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.index = i;
        }
    }
}

fn default_column_name(index: usize) -> String {
    format!("Column {}", index + 1)
}
