//! Filtering
//!
//! A column filter decides visibility per DATA row from canonical
//! content. Filters on several columns combine with AND. The resulting
//! mask feeds `RowOrderTracker::apply_filter`; sorting never touches it.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::column::ColumnCatalog;
use crate::sort::parse_number;
use crate::store::CellStore;

// =============================================================================
// Predicates
// =============================================================================

/// Kind of predicate filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Case-insensitive substring match
    TextContains,
    /// Inclusive numeric range; non-numeric content fails
    NumberRange,
    /// Raw content equals the value (boolean-like columns)
    Exact,
}

/// Range predicate on a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterPredicate {
    TextContains(String),
    NumberRange { min: f64, max: f64 },
    Exact(String),
}

impl FilterPredicate {
    /// Build from the dialog's (type, value, range) triple. A missing
    /// range covers every non-negative number.
    pub fn new(filter_type: FilterType, value: &str, range: Option<(f64, f64)>) -> Self {
        match filter_type {
            FilterType::TextContains => FilterPredicate::TextContains(value.to_string()),
            FilterType::NumberRange => {
                let (a, b) = range.unwrap_or((0.0, f64::MAX));
                FilterPredicate::NumberRange { min: a.min(b), max: a.max(b) }
            }
            FilterType::Exact => FilterPredicate::Exact(value.to_string()),
        }
    }

    pub fn matches(&self, content: &str) -> bool {
        match self {
            FilterPredicate::TextContains(needle) => {
                content.to_lowercase().contains(&needle.to_lowercase())
            }
            FilterPredicate::NumberRange { min, max } => {
                parse_number(content).is_some_and(|n| n >= *min && n <= *max)
            }
            FilterPredicate::Exact(value) => content == value,
        }
    }
}

// =============================================================================
// ColumnFilter
// =============================================================================

/// Per-column filter criteria
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Show rows whose content is one of these values
    Values(BTreeSet<String>),
    /// Show rows matching a predicate
    Predicate(FilterPredicate),
}

impl ColumnFilter {
    pub fn passes(&self, content: &str) -> bool {
        match self {
            ColumnFilter::Values(selected) => selected.contains(content),
            ColumnFilter::Predicate(p) => p.matches(content),
        }
    }

    /// Selected values as reported in FilterApplied events
    pub fn describe(&self) -> Vec<String> {
        match self {
            ColumnFilter::Values(selected) => selected.iter().cloned().collect(),
            ColumnFilter::Predicate(FilterPredicate::TextContains(v)) => vec![v.clone()],
            ColumnFilter::Predicate(FilterPredicate::Exact(v)) => vec![v.clone()],
            ColumnFilter::Predicate(FilterPredicate::NumberRange { min, max }) => {
                vec![min.to_string(), max.to_string()]
            }
        }
    }
}

/// Distinct contents of `col` over every data row.
pub fn distinct_values(store: &CellStore, col: usize) -> BTreeSet<String> {
    store.column_values(col).into_iter().map(str::to_string).collect()
}

/// Reduce a value selection to a filter. None means "show all": the
/// selection is empty or covers every distinct value in the column.
pub fn value_filter(store: &CellStore, col: usize, selected: &BTreeSet<String>) -> Option<ColumnFilter> {
    if selected.is_empty() {
        return None;
    }
    let distinct = distinct_values(store, col);
    if distinct.is_subset(selected) {
        return None;
    }
    Some(ColumnFilter::Values(selected.clone()))
}

/// Visibility per data row under every filter in `catalog`.
pub fn compute_mask(store: &CellStore, catalog: &ColumnCatalog) -> Vec<bool> {
    let filters = catalog.active_filters();
    (0..store.row_count())
        .map(|row| filters.iter().all(|(col, f)| f.passes(store.content(row, *col))))
        .collect()
}

// =============================================================================
// Value counts
// =============================================================================

/// One entry of a column's value list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Distinct values with their frequency. Most frequent first, then by
/// value ignoring case; the empty value always last.
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut entries: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value: value.to_string(), count })
        .collect();

    entries.sort_by(|a, b| {
        match (a.value.is_empty(), b.value.is_empty()) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        b.count
            .cmp(&a.count)
            .then_with(|| a.value.to_lowercase().cmp(&b.value.to_lowercase()))
            .then_with(|| a.value.cmp(&b.value))
    });
    entries
}
