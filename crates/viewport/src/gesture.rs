//! Single-stream gesture state machine: pan and scale never overlap.

use crate::editing::EditingCoordinator;
use crate::sync::{GridPanes, PaneSynchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning(PanAxis),
    Scaling,
}

/// Pointer input in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Cancel,
    ScaleBegin,
    Scale { factor: f32, fx: f32, fy: f32 },
    ScaleEnd,
    DoubleTap { x: f32, y: f32 },
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: GestureState,
    touch_slop: f32,
    down: Option<(f32, f32)>,
    last: (f32, f32),
}

impl GestureController {
    pub fn new(touch_slop: f32) -> Self {
        Self { state: GestureState::Idle, touch_slop, down: None, last: (0.0, 0.0) }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Feed one event. Returns true if the event was consumed by the
    /// grid, false if it should reach child views (e.g. a cell editor).
    pub fn handle(
        &mut self,
        event: PointerEvent,
        editing: &EditingCoordinator,
        sync: &mut PaneSynchronizer,
        panes: &mut impl GridPanes,
    ) -> bool {
        match event {
            PointerEvent::Down { x, y } => {
                if self.state == GestureState::Idle {
                    self.down = Some((x, y));
                    self.last = (x, y);
                }
                false
            }
            PointerEvent::Move { x, y } => self.on_move(x, y, editing, sync, panes),
            PointerEvent::Up | PointerEvent::Cancel => {
                let was = self.state;
                self.finish_pan(sync, panes);
                self.state = GestureState::Idle;
                self.down = None;
                was != GestureState::Idle
            }
            PointerEvent::ScaleBegin => {
                self.finish_pan(sync, panes);
                self.state = GestureState::Scaling;
                true
            }
            PointerEvent::Scale { factor, fx, fy } => {
                if self.state != GestureState::Scaling {
                    self.finish_pan(sync, panes);
                    self.state = GestureState::Scaling;
                }
                sync.zoom_by(factor, fx, fy, panes);
                true
            }
            PointerEvent::ScaleEnd => {
                self.state = GestureState::Idle;
                self.down = None;
                true
            }
            PointerEvent::DoubleTap { x, y } => {
                if editing.is_editing() {
                    return false;
                }
                sync.double_tap(x, y, panes);
                true
            }
        }
    }

    fn on_move(
        &mut self,
        x: f32,
        y: f32,
        editing: &EditingCoordinator,
        sync: &mut PaneSynchronizer,
        panes: &mut impl GridPanes,
    ) -> bool {
        match self.state {
            GestureState::Scaling => true,
            GestureState::Idle => {
                if editing.is_editing() {
                    return false;
                }
                let Some((x0, y0)) = self.down else {
                    return false;
                };
                let dx = (x - x0).abs();
                let dy = (y - y0).abs();
                if dx <= self.touch_slop && dy <= self.touch_slop {
                    return false;
                }
                let axis = if dx > dy || dx > 0.7 * self.touch_slop {
                    PanAxis::Horizontal
                } else {
                    PanAxis::Vertical
                };
                if axis == PanAxis::Horizontal {
                    sync.begin_drag(panes);
                }
                self.state = GestureState::Panning(axis);
                self.last = (x, y);
                true
            }
            GestureState::Panning(PanAxis::Horizontal) => {
                sync.drag_by(self.last.0 - x, panes);
                self.last = (x, y);
                true
            }
            GestureState::Panning(PanAxis::Vertical) => {
                sync.scroll_vertically(self.last.1 - y, panes);
                self.last = (x, y);
                true
            }
        }
    }

    fn finish_pan(&mut self, sync: &mut PaneSynchronizer, panes: &mut impl GridPanes) {
        if self.state == GestureState::Panning(PanAxis::Horizontal) {
            sync.end_drag(panes);
        }
    }
}
