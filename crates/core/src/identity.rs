//! Row and cell identity.
//!
//! A `StableId` follows a row's original data through sorting and
//! filtering so the renderer can animate moves instead of rebinding.

use serde::{Deserialize, Serialize};

/// Identity key assigned to a row when it enters the table.
///
/// Keys are never reused while the row exists. New rows take
/// `max(existing) + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RowKey(u64);

impl RowKey {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The key that follows this one.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Render identity of one displayed cell: the original row key plus the
/// column index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StableId {
    pub row_key: RowKey,
    pub col: usize,
}

impl StableId {
    #[inline]
    pub fn new(row_key: RowKey, col: usize) -> Self {
        Self { row_key, col }
    }
}

impl std::fmt::Display for StableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}:c{}", self.row_key.raw(), self.col)
    }
}
