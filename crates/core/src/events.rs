//! Change notifications for the rendering layer.
//!
//! The model queues events while an operation runs and hands them over
//! only after the operation completes, so renderers never observe a
//! half-applied sort, filter or undo.

use crate::sort::SortDirection;

/// Events emitted by the grid model and the pane synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A displayed cell's content changed.
    CellChanged {
        row: usize,
        col: usize,
        content: String,
    },

    /// A column's pixel width changed at the current scale.
    ColumnResized { col: usize, width_px: f32 },

    /// A displayed row's pixel height changed.
    RowResized { row: usize, height_px: f32 },

    /// The active sort changed. `Unsorted` means original order is back.
    SortChanged { col: usize, direction: SortDirection },

    /// A column filter was set or cleared. Empty `values` means cleared.
    FilterApplied { col: usize, values: Vec<String> },

    /// Scale or pan offsets changed.
    ViewportChanged { scale: f32, offset_x: f32, offset_y: f32 },

    /// Rows or columns were inserted, deleted or reordered; the whole
    /// displayed projection must be re-read.
    GridReloaded { rows: usize, cols: usize },
}

/// Callback type for receiving grid events.
pub type EventCallback = Box<dyn FnMut(&GridEvent)>;

/// Ordered queue of pending events.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<GridEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    /// Take every queued event, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver every queued event to `callback` in order.
    pub fn dispatch(&mut self, callback: &mut EventCallback) {
        for event in self.events.drain(..) {
            callback(&event);
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only CellChanged events.
    pub fn cells_changed(&self) -> Vec<(usize, usize, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridEvent::CellChanged { row, col, content } => Some((*row, *col, content.as_str())),
                _ => None,
            })
            .collect()
    }

    /// The most recent ViewportChanged event, if any.
    pub fn last_viewport(&self) -> Option<(f32, f32, f32)> {
        self.events.iter().rev().find_map(|e| match e {
            GridEvent::ViewportChanged { scale, offset_x, offset_y } => Some((*scale, *offset_x, *offset_y)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_filtering() {
        let mut collector = EventCollector::new();
        collector.push(GridEvent::SortChanged { col: 1, direction: SortDirection::Ascending });
        collector.push(GridEvent::CellChanged { row: 0, col: 2, content: "x".into() });
        collector.push(GridEvent::ViewportChanged { scale: 1.0, offset_x: 5.0, offset_y: 0.0 });
        collector.push(GridEvent::ViewportChanged { scale: 2.0, offset_x: 9.0, offset_y: 1.0 });

        assert_eq!(collector.len(), 4);
        assert_eq!(collector.cells_changed(), vec![(0, 2, "x")]);
        assert_eq!(collector.last_viewport(), Some((2.0, 9.0, 1.0)));
    }

    #[test]
    fn test_drain_empties() {
        let mut collector = EventCollector::new();
        collector.push(GridEvent::GridReloaded { rows: 1, cols: 1 });
        let drained = collector.drain();
        assert_eq!(drained.len(), 1);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_dispatch_in_order() {
        let mut collector = EventCollector::new();
        collector.push(GridEvent::RowResized { row: 0, height_px: 44.0 });
        collector.push(GridEvent::ColumnResized { col: 1, width_px: 120.0 });

        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut callback: EventCallback = Box::new(move |e| sink.borrow_mut().push(e.clone()));
        collector.dispatch(&mut callback);

        assert!(collector.is_empty());
        assert_eq!(seen.borrow().len(), 2);
        assert!(matches!(seen.borrow()[0], GridEvent::RowResized { .. }));
    }
}
