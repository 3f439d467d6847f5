//! Sorting
//!
//! Orders are always computed from canonical (data-order) content, so
//! sorting twice gives the same permutation as sorting once, and
//! returning to `Unsorted` is exact.
//!
//! Ranking: numbers, then text, then blanks. Direction reverses the
//! comparison inside a rank only; blanks stay last either way and
//! numbers stay ahead of text.

use std::cmp::Ordering;

use notegrid_core::SortDirection;
use ordered_float::OrderedFloat;

/// Characters ignored when reading a number: thousands separator and
/// currency symbols.
const NUMBER_NOISE: &[char] = &[',', '￥', '$', '€', '£', '¥'];

/// Parse display text as a number. Separators and currency symbols are
/// dropped, a trailing `%` divides by 100. Non-finite results are not
/// numbers.
pub fn parse_number(content: &str) -> Option<f64> {
    let cleaned: String = content.chars().filter(|c| !NUMBER_NOISE.contains(c)).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, scale) = match cleaned.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), 0.01),
        None => (cleaned, 1.0),
    };
    let value = digits.parse::<f64>().ok()? * scale;
    value.is_finite().then_some(value)
}

/// Key for sorting one value. Variant order is the rank order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Number(OrderedFloat<f64>),
    /// Lowercased for case-insensitive comparison
    Text(String),
    Blank,
}

impl SortKey {
    pub fn from_content(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            SortKey::Blank
        } else if let Some(n) = parse_number(trimmed) {
            SortKey::Number(OrderedFloat(n))
        } else {
            SortKey::Text(trimmed.to_lowercase())
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Blank => 2,
        }
    }

    /// Compare two keys for `direction`. `Unsorted` compares as equal.
    pub fn compare(&self, other: &Self, direction: SortDirection) -> Ordering {
        let by_rank = self.rank().cmp(&other.rank());
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        let within = match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        };
        match direction {
            SortDirection::Ascending => within,
            SortDirection::Descending => within.reverse(),
            SortDirection::Unsorted => Ordering::Equal,
        }
    }
}

/// Compare two cell contents the way a column sort does.
pub fn compare_contents(a: &str, b: &str, direction: SortDirection) -> Ordering {
    SortKey::from_content(a).compare(&SortKey::from_content(b), direction)
}

/// Stable sort of data rows by `values[data_row]`. Equal keys keep data
/// order. `Unsorted` yields the identity order.
pub fn sorted_order<S: AsRef<str>>(values: &[S], direction: SortDirection) -> Vec<usize> {
    let mut keyed: Vec<(SortKey, usize)> = values
        .iter()
        .enumerate()
        .map(|(row, v)| (SortKey::from_content(v.as_ref()), row))
        .collect();

    if direction.is_active() {
        keyed.sort_by(|a, b| a.0.compare(&b.0, direction));
    }
    keyed.into_iter().map(|(_, row)| row).collect()
}
