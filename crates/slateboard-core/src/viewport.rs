//! Viewport module for pan/zoom transforms.

use crate::config::{MAX_SCALE, MIN_SCALE};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Direction of a discrete keyboard nudge.
///
/// The view moves toward the named side, so `Left` reveals content further left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NudgeDirection {
    fn offset_unit(self) -> Vec2 {
        match self {
            NudgeDirection::Left => Vec2::new(1.0, 0.0),
            NudgeDirection::Right => Vec2::new(-1.0, 0.0),
            NudgeDirection::Up => Vec2::new(0.0, 1.0),
            NudgeDirection::Down => Vec2::new(0.0, -1.0),
        }
    }
}

/// Viewport manages the view transform for the canvas.
///
/// Device coordinates map to logical coordinates as
/// `logical = device / scale - offset`, so `offset` is expressed in logical
/// units and `scale` is the zoom factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (logical units).
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Viewport {
    /// Create a new viewport at the origin with scale 1.0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom scale bounds.
    pub fn with_scale_bounds(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Affine transform from logical to device coordinates (for rendering).
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale) * Affine::translate(self.offset)
    }

    /// Affine transform from device to logical coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.offset) * Affine::scale(1.0 / self.scale)
    }

    /// Convert a device point (relative to the surface origin) to logical coordinates.
    pub fn to_logical(&self, device: Point) -> Point {
        Point::new(
            device.x / self.scale - self.offset.x,
            device.y / self.scale - self.offset.y,
        )
    }

    /// Convert a logical point to device coordinates.
    pub fn to_device(&self, logical: Point) -> Point {
        Point::new(
            (logical.x + self.offset.x) * self.scale,
            (logical.y + self.offset.y) * self.scale,
        )
    }

    /// Step the zoom by `step` in the direction of `direction`'s sign, keeping
    /// the logical point under `device` fixed.
    ///
    /// Returns false when the zoom did not change (zero direction or already
    /// at a bound).
    pub fn zoom(&mut self, device: Point, direction: f64, step: f64) -> bool {
        if direction == 0.0 || direction.is_nan() {
            return false;
        }
        let new_scale = (self.scale + step * direction.signum()).clamp(self.min_scale, self.max_scale);
        self.zoom_to(device, new_scale)
    }

    /// Set the zoom to `new_scale` (clamped), keeping the logical point under `device` fixed.
    pub fn zoom_to(&mut self, device: Point, new_scale: f64) -> bool {
        let new_scale = new_scale.clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return false;
        }

        let device_vec = device.to_vec2();
        self.offset += device_vec / new_scale - device_vec / self.scale;
        self.scale = new_scale;
        true
    }

    /// Pan the view by a delta in device coordinates.
    pub fn pan(&mut self, device_delta: Vec2) {
        self.offset += device_delta / self.scale;
    }

    /// Move the view by `distance / scale` logical units toward `direction`.
    pub fn nudge(&mut self, direction: NudgeDirection, distance: f64) {
        self.offset += direction.offset_unit() * (distance / self.scale);
    }

    /// Reset to the origin at scale 1.0.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// The logical rectangle visible through a surface of `size` device pixels.
    pub fn visible_rect(&self, size: Size) -> Rect {
        Rect::from_points(
            self.to_logical(Point::ZERO),
            self.to_logical(Point::new(size.width, size.height)),
        )
    }

    /// Fit the view to show the given logical bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, surface: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (surface.width - padding * 2.0).max(1.0),
            (surface.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.scale = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);

        // Center the bounds on the surface
        let surface_center = Vec2::new(surface.width / 2.0, surface.height / 2.0);
        self.offset = surface_center / self.scale - bounds.center().to_vec2();
    }
}
