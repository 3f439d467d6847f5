//! Keeps the header pane, every attached row and the frozen column
//! aligned while the user pans and zooms.
//!
//! The column-header pane is the horizontal source of truth. Rows are
//! slaved to it through a `(column, sub_offset)` anchor rather than a
//! raw pixel offset, so rows that were laid out at a different moment
//! still land on the same column boundary.

use notegrid_config::{Settings, ViewportSnapshot};
use notegrid_core::{EventCollector, GridEvent};
use notegrid_engine::ColumnCatalog;

use crate::viewport::ViewportState;
use crate::widths::{ColumnAnchor, ColumnWidthProvider};

/// The rendering surfaces driven by the synchronizer.
///
/// Offsets are screen pixels. Left edges are in the shared screen
/// coordinate space so header and row columns can be compared directly.
pub trait GridPanes {
    /// Visible width of the scrollable (non-frozen) area.
    fn viewport_width(&self) -> f32;

    /// The header's current raw horizontal offset.
    fn header_offset(&self) -> f32;

    fn scroll_header_to(&mut self, offset: f32);

    /// Anchor reported by the header's own layout, if it has one.
    fn measured_header_anchor(&self) -> Option<ColumnAnchor>;

    /// Scroll every currently attached row to `anchor`.
    fn apply_row_anchor(&mut self, anchor: ColumnAnchor);

    /// Left edge of the header's first visible column.
    fn header_first_left(&self) -> Option<f32>;

    /// Left edge of the first visible row's first scrollable cell.
    fn row_first_left(&self) -> Option<f32>;

    fn scroll_body_by(&mut self, dy: f32);

    fn scroll_frozen_by(&mut self, dy: f32);

    /// Sizes changed; remeasure and call `PaneSynchronizer::on_layout`.
    fn request_layout(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncOptions {
    /// Max disagreement in px between a measured anchor and the
    /// computed one before the measured anchor is ignored.
    pub anchor_tolerance: f32,
    /// Header/row misalignment in px that triggers a re-sync.
    pub self_heal_threshold: f32,
    pub overscroll_damping: f32,
    pub double_tap_scale: f32,
    pub double_tap_alt_scale: f32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            anchor_tolerance: 2.0,
            self_heal_threshold: 1.0,
            overscroll_damping: 0.3,
            double_tap_scale: 1.0,
            double_tap_alt_scale: 0.8,
        }
    }
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            anchor_tolerance: settings.anchor_tolerance,
            self_heal_threshold: settings.self_heal_threshold,
            overscroll_damping: settings.overscroll_damping,
            double_tap_scale: settings.double_tap_scale,
            double_tap_alt_scale: settings.double_tap_alt_scale,
        }
    }
}

/// Offsets computed by a zoom, applied on the next layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingZoom {
    target_x: f32,
    target_y: f32,
}

pub struct PaneSynchronizer {
    viewport: ViewportState,
    widths: ColumnWidthProvider,
    options: SyncOptions,
    dragging: bool,
    drag_offset: f32,
    anchor: ColumnAnchor,
    pending_zoom: Option<PendingZoom>,
    needs_alignment_check: bool,
    // Deltas we forwarded and expect to hear back about.
    body_echo: Option<f32>,
    frozen_echo: Option<f32>,
    last_persisted: Option<ViewportSnapshot>,
    events: EventCollector,
}

impl PaneSynchronizer {
    pub fn new(catalog: &ColumnCatalog, settings: &Settings) -> Self {
        let viewport = ViewportState::from_settings(settings);
        let widths =
            ColumnWidthProvider::for_scrollable(catalog, viewport.scale(), settings.row_height);
        Self::from_parts(viewport, widths, SyncOptions::from_settings(settings))
    }

    pub fn from_parts(
        viewport: ViewportState,
        mut widths: ColumnWidthProvider,
        options: SyncOptions,
    ) -> Self {
        widths.set_scale(viewport.scale());
        Self {
            viewport,
            widths,
            options,
            dragging: false,
            drag_offset: viewport.offset_x(),
            anchor: ColumnAnchor::default(),
            pending_zoom: None,
            needs_alignment_check: false,
            body_echo: None,
            frozen_echo: None,
            last_persisted: None,
            events: EventCollector::new(),
        }
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn widths(&self) -> &ColumnWidthProvider {
        &self.widths
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn anchor(&self) -> ColumnAnchor {
        self.anchor
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn has_pending_zoom(&self) -> bool {
        self.pending_zoom.is_some()
    }

    pub fn take_events(&mut self) -> Vec<GridEvent> {
        self.events.drain()
    }

    /// Column widths changed (resize, insert, delete, hide).
    pub fn set_column_widths(&mut self, catalog: &ColumnCatalog) {
        let widths = catalog.layout_widths().into_iter().skip(1).collect();
        self.widths.set_base_widths(widths, 1);
        self.needs_alignment_check = true;
    }

    pub fn set_base_row_height(&mut self, height: f32) {
        self.widths.set_base_row_height(height);
    }

    // -- horizontal --------------------------------------------------------

    /// Clamp the header's offset, derive an anchor and push it to rows.
    ///
    /// Outside a drag an offset past either bound is snapped back by
    /// scrolling the header itself.
    pub fn sync_rows_from_header(&mut self, panes: &mut impl GridPanes) {
        let raw = panes.header_offset();
        let max = self.widths.max_horizontal_offset(panes.viewport_width());
        let tolerance = self.options.anchor_tolerance;

        if !self.dragging && (raw < -tolerance || raw > max + tolerance) {
            self.jump_header_to(raw, panes);
            return;
        }

        let clamped = raw.clamp(0.0, max);
        let anchor = self.derive_anchor(clamped, panes);
        self.propagate(anchor, panes);
        self.persist_x(clamped);
        self.needs_alignment_check = true;
    }

    /// Header pane scrolled on its own (fling, programmatic scroll).
    pub fn on_header_scrolled(&mut self, panes: &mut impl GridPanes) {
        if self.dragging {
            self.drag_offset = panes.header_offset();
        }
        self.sync_rows_from_header(panes);
    }

    /// Scroll the header to `offset` (clamped) and align rows using the
    /// provider's mapping.
    pub fn jump_header_to(&mut self, offset: f32, panes: &mut impl GridPanes) {
        let clamped = self.widths.clamp_offset(offset, panes.viewport_width());
        panes.scroll_header_to(clamped);
        let anchor = self.widths.map_offset_to_column(clamped);
        self.propagate(anchor, panes);
        self.persist_x(clamped);
        self.drag_offset = clamped;
        self.needs_alignment_check = true;
    }

    pub fn begin_drag(&mut self, panes: &impl GridPanes) {
        self.dragging = true;
        self.drag_offset = panes.header_offset();
    }

    /// Move the header by `dx` px. Movement past either bound is damped.
    pub fn drag_by(&mut self, dx: f32, panes: &mut impl GridPanes) {
        if !self.dragging {
            self.begin_drag(panes);
        }
        let max = self.widths.max_horizontal_offset(panes.viewport_width());
        self.drag_offset =
            rubber_band(self.drag_offset, dx, max, self.options.overscroll_damping);
        panes.scroll_header_to(self.drag_offset);
        self.sync_rows_from_header(panes);
    }

    /// Release: snap exactly to the clamped offset.
    pub fn end_drag(&mut self, panes: &mut impl GridPanes) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.jump_header_to(self.drag_offset, panes);
    }

    fn derive_anchor(&self, offset: f32, panes: &impl GridPanes) -> ColumnAnchor {
        let computed = self.widths.map_offset_to_column(offset);
        let end = self.widths.first_column() + self.widths.column_count();
        // Measured anchors drift at the scroll end.
        if computed.column + 2 >= end {
            return computed;
        }
        match panes.measured_header_anchor() {
            Some(measured)
                if (self.widths.offset_of(measured) - offset).abs()
                    <= self.options.anchor_tolerance =>
            {
                measured
            }
            _ => computed,
        }
    }

    fn propagate(&mut self, anchor: ColumnAnchor, panes: &mut impl GridPanes) {
        panes.apply_row_anchor(anchor);
        self.anchor = anchor;
    }

    // -- vertical ----------------------------------------------------------

    /// Body pane scrolled by `dy`; the frozen column follows.
    pub fn on_body_scrolled(&mut self, dy: f32, panes: &mut impl GridPanes) {
        if take_echo(&mut self.body_echo, dy) || dy == 0.0 {
            return;
        }
        panes.scroll_frozen_by(dy);
        self.frozen_echo = Some(dy);
        self.persist_y(self.viewport.offset_y() + dy);
    }

    /// Frozen pane scrolled by `dy`; the body follows.
    pub fn on_frozen_scrolled(&mut self, dy: f32, panes: &mut impl GridPanes) {
        if take_echo(&mut self.frozen_echo, dy) || dy == 0.0 {
            return;
        }
        panes.scroll_body_by(dy);
        self.body_echo = Some(dy);
        self.persist_y(self.viewport.offset_y() + dy);
    }

    /// Scroll both vertical panes together.
    pub fn scroll_vertically(&mut self, dy: f32, panes: &mut impl GridPanes) {
        if dy == 0.0 {
            return;
        }
        panes.scroll_body_by(dy);
        self.body_echo = Some(dy);
        panes.scroll_frozen_by(dy);
        self.frozen_echo = Some(dy);
        self.persist_y(self.viewport.offset_y() + dy);
    }

    // -- zoom --------------------------------------------------------------

    /// Zoom to `new_scale` keeping screen point (fx, fy) fixed.
    ///
    /// Updates the scale and asks the panes to remeasure; offsets are
    /// applied from `on_layout`. Zooms arriving before that layout chain
    /// from the pending targets. Returns false if the scale is unchanged.
    pub fn zoom_at(&mut self, new_scale: f32, fx: f32, fy: f32, panes: &mut impl GridPanes) -> bool {
        let old_scale = self.viewport.scale();
        let (ox, oy) = match self.pending_zoom {
            Some(p) => (p.target_x, p.target_y),
            None => (self.viewport.offset_x(), self.viewport.offset_y()),
        };

        let mut base = self.viewport;
        base.set_offsets(ox, oy);
        let (scale, target_x, target_y) = base.zoom_about(new_scale, fx, fy);
        if scale == old_scale {
            return false;
        }

        self.viewport.set_scale(scale);
        self.widths.set_scale(scale);
        self.pending_zoom = Some(PendingZoom {
            target_x: target_x.max(0.0),
            target_y: target_y.max(0.0),
        });
        log::debug!("zoom {old_scale:.3} -> {scale:.3} at ({fx}, {fy})");
        panes.request_layout();
        true
    }

    pub fn zoom_by(&mut self, factor: f32, fx: f32, fy: f32, panes: &mut impl GridPanes) -> bool {
        self.zoom_at(self.viewport.scale() * factor, fx, fy, panes)
    }

    /// Toggle between the preset scale and the alternate preset.
    pub fn double_tap(&mut self, fx: f32, fy: f32, panes: &mut impl GridPanes) -> bool {
        let preset = self.options.double_tap_scale;
        let target = if (self.viewport.scale() - preset).abs() > 0.01 {
            preset
        } else {
            self.options.double_tap_alt_scale
        };
        self.zoom_at(target, fx, fy, panes)
    }

    /// Second phase: panes have remeasured at the new scale.
    pub fn on_layout(&mut self, panes: &mut impl GridPanes) {
        if let Some(pending) = self.pending_zoom.take() {
            let dy = pending.target_y - self.viewport.offset_y();
            if dy != 0.0 {
                panes.scroll_body_by(dy);
                self.body_echo = Some(dy);
                panes.scroll_frozen_by(dy);
                self.frozen_echo = Some(dy);
            }
            self.viewport.set_offsets(self.viewport.offset_x(), pending.target_y);
            self.jump_header_to(pending.target_x, panes);
        }
        if self.needs_alignment_check {
            self.check_alignment(panes);
        }
    }

    /// Re-sync when the header's first column and the first row's first
    /// cell disagree by more than the threshold. Returns true if a
    /// re-sync ran.
    pub fn check_alignment(&mut self, panes: &mut impl GridPanes) -> bool {
        self.needs_alignment_check = false;
        let (Some(header), Some(row)) = (panes.header_first_left(), panes.row_first_left()) else {
            return false;
        };
        if (header - row).abs() <= self.options.self_heal_threshold {
            return false;
        }
        log::debug!("pane misalignment {:.2}px, re-syncing", header - row);
        self.sync_rows_from_header(panes);
        true
    }

    /// Restore a saved viewport; offsets land on the next layout.
    pub fn restore(&mut self, snapshot: ViewportSnapshot, panes: &mut impl GridPanes) {
        self.viewport.restore(snapshot);
        self.viewport.set_offsets(0.0, 0.0);
        self.widths.set_scale(self.viewport.scale());
        self.pending_zoom = Some(PendingZoom {
            target_x: snapshot.offset_x.max(0.0),
            target_y: snapshot.offset_y.max(0.0),
        });
        self.last_persisted = None;
        panes.request_layout();
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        self.viewport.snapshot()
    }

    // -- persistence -------------------------------------------------------

    fn persist_x(&mut self, offset_x: f32) {
        self.viewport.set_offsets(offset_x, self.viewport.offset_y());
        self.persist();
    }

    fn persist_y(&mut self, offset_y: f32) {
        self.viewport.set_offsets(self.viewport.offset_x(), offset_y);
        self.persist();
    }

    fn persist(&mut self) {
        let snapshot = self.viewport.snapshot();
        if self.last_persisted == Some(snapshot) {
            return;
        }
        self.last_persisted = Some(snapshot);
        self.events.push(GridEvent::ViewportChanged {
            scale: snapshot.scale,
            offset_x: snapshot.offset_x,
            offset_y: snapshot.offset_y,
        });
    }
}

/// New drag offset after moving `dx` from `current`, with the part of
/// the movement beyond `[0, max]` scaled by `damping`.
fn rubber_band(current: f32, dx: f32, max: f32, damping: f32) -> f32 {
    let target = current + dx;
    if dx < 0.0 && target < 0.0 {
        let free = current.max(0.0);
        current - free + (dx + free) * damping
    } else if dx > 0.0 && target > max {
        let free = (max - current).max(0.0);
        current + free + (dx - free) * damping
    } else {
        target
    }
}

fn take_echo(slot: &mut Option<f32>, dy: f32) -> bool {
    match slot.take() {
        Some(expected) => (expected - dy).abs() < 0.01,
        None => false,
    }
}
