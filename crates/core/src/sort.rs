use serde::{Deserialize, Serialize};

/// Sort direction carried by a column. At most one column in a table is
/// ever not `Unsorted`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_active(self) -> bool {
        !matches!(self, SortDirection::Unsorted)
    }

    /// Header toggle cycle: unsorted -> ascending -> descending -> unsorted.
    pub fn cycle(self) -> Self {
        match self {
            SortDirection::Unsorted => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Unsorted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle() {
        let d = SortDirection::default();
        assert!(!d.is_active());
        assert_eq!(d.cycle(), SortDirection::Ascending);
        assert_eq!(d.cycle().cycle(), SortDirection::Descending);
        assert_eq!(d.cycle().cycle().cycle(), SortDirection::Unsorted);
    }
}
