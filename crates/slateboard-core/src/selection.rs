//! Hit-testing and resize handles.

use crate::objects::CanvasObject;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Corner resize handle of a selected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl ResizeHandle {
    /// Check order when several handles are within tolerance.
    pub const ALL: [ResizeHandle; 4] = [ResizeHandle::Nw, ResizeHandle::Ne, ResizeHandle::Sw, ResizeHandle::Se];

    /// Position of this handle on a bounding box.
    pub fn position(self, bounds: Rect) -> Point {
        match self {
            ResizeHandle::Nw => Point::new(bounds.x0, bounds.y0),
            ResizeHandle::Ne => Point::new(bounds.x1, bounds.y0),
            ResizeHandle::Sw => Point::new(bounds.x0, bounds.y1),
            ResizeHandle::Se => Point::new(bounds.x1, bounds.y1),
        }
    }
}

/// Topmost object containing `point`.
///
/// Objects are in z-order (back to front), so the last-drawn hit wins.
pub fn hit_test(point: Point, objects: &[CanvasObject]) -> Option<&CanvasObject> {
    hit_test_index(point, objects).map(|i| &objects[i])
}

/// Index of the topmost object containing `point`.
pub fn hit_test_index(point: Point, objects: &[CanvasObject]) -> Option<usize> {
    objects.iter().rposition(|obj| obj.contains(point))
}

/// Handles of an object with their positions, for drawing the selection.
pub fn handles(obj: &CanvasObject) -> [(ResizeHandle, Point); 4] {
    let bounds = obj.bounds();
    ResizeHandle::ALL.map(|h| (h, h.position(bounds)))
}

/// Which corner handle (if any) is within `tolerance` of `point` on both axes.
pub fn resize_handle(point: Point, obj: &CanvasObject, tolerance: f64) -> Option<ResizeHandle> {
    let bounds = obj.bounds();
    ResizeHandle::ALL.into_iter().find(|h| {
        let corner = h.position(bounds);
        (point.x - corner.x).abs() < tolerance && (point.y - corner.y).abs() < tolerance
    })
}

/// Apply one resize step to an `(x, y, width, height)` box.
///
/// The handle's opposite edges stay put; width and height are then floored
/// at `min_size`.
pub fn resize_box(bounds: Rect, handle: ResizeHandle, delta: Vec2, min_size: f64) -> Rect {
    let (mut x, mut y) = (bounds.x0, bounds.y0);
    let (mut width, mut height) = (bounds.width(), bounds.height());
    let (dx, dy) = (delta.x, delta.y);

    match handle {
        ResizeHandle::Se => {
            width += dx;
            height += dy;
        }
        ResizeHandle::Sw => {
            x += dx;
            width -= dx;
            height += dy;
        }
        ResizeHandle::Ne => {
            y += dy;
            width += dx;
            height -= dy;
        }
        ResizeHandle::Nw => {
            x += dx;
            y += dy;
            width -= dx;
            height -= dy;
        }
    }

    width = width.max(min_size);
    height = height.max(min_size);
    Rect::new(x, y, x + width, y + height)
}

/// Resize an object in place by one pointer step.
pub fn apply_resize(obj: &mut CanvasObject, handle: ResizeHandle, delta: Vec2, min_size: f64) {
    let resized = resize_box(obj.bounds(), handle, delta, min_size);
    obj.set_bounds(resized);
}
