pub mod cell;
pub mod column;
pub mod filter;
pub mod grid;
pub mod history;
pub mod model;
pub mod row_order;
pub mod sort;
pub mod store;

pub use cell::{Alignment, Cell, CellData, CellStyle};
pub use column::{CellType, Column, ColumnCatalog};
pub use filter::{ColumnFilter, FilterPredicate, FilterType, ValueCount};
pub use grid::{build_full_grid, emit_grid_in_order, Grid, Projection};
pub use history::{Operation, OperationKind, UndoRedoLog};
pub use model::GridModel;
pub use row_order::RowOrderTracker;
pub use sort::{compare_contents, parse_number, sorted_order};
pub use store::CellStore;
