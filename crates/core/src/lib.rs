//! Shared vocabulary for the grid crates: row identity, sort direction,
//! and the events the model emits to the rendering layer.

pub mod events;
pub mod identity;
pub mod sort;

pub use events::{EventCollector, GridEvent};
pub use identity::{RowKey, StableId};
pub use sort::SortDirection;
