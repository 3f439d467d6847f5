//! Viewport state: zoom scale and pan offsets.

use notegrid_config::{Settings, ViewportSnapshot};

/// Allowed zoom range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.6, max: 2.5 }
    }
}

impl ZoomLimits {
    pub fn from_settings(settings: &Settings) -> Self {
        Self { min: settings.min_scale, max: settings.max_scale.max(settings.min_scale) }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return self.min.max(1.0f32.min(self.max));
        }
        scale.clamp(self.min, self.max)
    }
}

/// Current scale and pan offsets, in screen pixels.
///
/// Scale is clamped on every write; offsets are never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    limits: ZoomLimits,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl ViewportState {
    pub fn new(limits: ZoomLimits) -> Self {
        Self { scale: limits.clamp(1.0), offset_x: 0.0, offset_y: 0.0, limits }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(ZoomLimits::from_settings(settings))
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Set the scale, clamped. Returns the value stored.
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        self.scale = self.limits.clamp(scale);
        self.scale
    }

    pub fn set_offsets(&mut self, offset_x: f32, offset_y: f32) {
        self.offset_x = offset_x.max(0.0);
        self.offset_y = offset_y.max(0.0);
    }

    pub fn update(&mut self, scale: f32, offset_x: f32, offset_y: f32) {
        self.set_scale(scale);
        self.set_offsets(offset_x, offset_y);
    }

    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot { scale: self.scale, offset_x: self.offset_x, offset_y: self.offset_y }
    }

    pub fn restore(&mut self, snapshot: ViewportSnapshot) {
        self.update(snapshot.scale, snapshot.offset_x, snapshot.offset_y);
    }

    /// Offsets that keep the content under screen point (fx, fy) fixed
    /// when the scale moves to `new_scale` (clamped). Returns
    /// (scale, offset_x, offset_y) without applying them.
    pub fn zoom_about(&self, new_scale: f32, fx: f32, fy: f32) -> (f32, f32, f32) {
        let new_scale = self.limits.clamp(new_scale);
        (
            new_scale,
            focus_preserving_offset(self.offset_x, fx, self.scale, new_scale),
            focus_preserving_offset(self.offset_y, fy, self.scale, new_scale),
        )
    }
}

/// `contentX = (offset + focal) / old`; new offset puts contentX back
/// under `focal` at `new`.
pub fn focus_preserving_offset(offset: f32, focal: f32, old_scale: f32, new_scale: f32) -> f32 {
    if old_scale <= 0.0 {
        return offset;
    }
    let content = (offset + focal) / old_scale;
    content * new_scale - focal
}
