//! Viewport geometry and pane synchronization for the grid view.
//!
//! `ViewportState` holds scale and offsets, `ColumnWidthProvider` turns
//! base widths into pixels, and `PaneSynchronizer` keeps the header, the
//! rows and the frozen column aligned through pan and zoom. Rendering is
//! behind the `GridPanes` trait.

pub mod editing;
pub mod gesture;
pub mod sync;
pub mod viewport;
pub mod widths;

pub use editing::{BeginEditing, EditingCoordinator, EditorHandle, EditorId};
pub use gesture::{GestureController, GestureState, PanAxis, PointerEvent};
pub use sync::{GridPanes, PaneSynchronizer, SyncOptions};
pub use viewport::{focus_preserving_offset, ViewportState, ZoomLimits};
pub use widths::{ColumnAnchor, ColumnWidthProvider};
