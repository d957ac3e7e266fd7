//! Freehand drawing object.

use super::{ObjectId, ObjectTrait};
use crate::color::Rgba;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

fn default_stroke_width() -> f64 {
    2.0
}

/// A freehand stroke (ordered series of points).
///
/// The bounding box is the min/max extent of `path` and is recomputed whenever
/// the path changes. A resize rescales the path into the new box. On an axis
/// where the path has no extent (a straight vertical or horizontal stroke, a
/// dot) the box may be wider than the path, which then sits on its centre line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawing {
    pub(crate) id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    path: Vec<Point>,
    #[serde(default)]
    pub stroke_color: Rgba,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Drawing {
    /// Create a drawing from captured points. Returns `None` for an empty path.
    pub fn from_points(id: ObjectId, path: Vec<Point>) -> Option<Self> {
        let bounds = path_bounds(&path)?;
        Some(Self {
            id,
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width(),
            height: bounds.height(),
            path,
            stroke_color: Rgba::black(),
            stroke_width: default_stroke_width(),
        })
    }

    pub fn with_stroke(mut self, color: Rgba, width: f64) -> Self {
        self.stroke_color = color;
        self.stroke_width = width;
        self
    }

    /// The captured points.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Replace the path. An empty path is refused.
    pub fn set_path(&mut self, path: Vec<Point>) -> bool {
        let Some(bounds) = path_bounds(&path) else {
            return false;
        };
        self.path = path;
        self.x = bounds.x0;
        self.y = bounds.y0;
        self.width = bounds.width();
        self.height = bounds.height();
        true
    }

    /// Append a point and re-derive the bounding box from the path.
    pub fn add_point(&mut self, point: Point) {
        let mut path = std::mem::take(&mut self.path);
        path.push(point);
        self.set_path(path);
    }

    /// Whether the stored box agrees with the path. On each axis the path
    /// either spans the box exactly or is a zero-extent line through its centre.
    pub fn box_matches_path(&self) -> bool {
        let Some(extent) = path_bounds(&self.path) else {
            return false;
        };
        let b = self.bounds();
        self.width >= 0.0
            && self.height >= 0.0
            && axis_matches(extent.x0, extent.x1, b.x0, b.x1)
            && axis_matches(extent.y0, extent.y1, b.y0, b.y1)
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Min/max extent of a point sequence.
pub fn path_bounds(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p)),
    )
}

const TOLERANCE: f64 = 1e-6;

fn axis_matches(p0: f64, p1: f64, b0: f64, b1: f64) -> bool {
    let close = |a: f64, b: f64| (a - b).abs() <= TOLERANCE;
    (close(p0, b0) && close(p1, b1)) || (close(p0, p1) && close(p0, (b0 + b1) / 2.0))
}

/// Map a coordinate from `old0..old0+old_len` onto `new0..new0+new_len`.
/// A zero-length source collapses onto the centre of the target.
fn rescale(v: f64, old0: f64, old_len: f64, new0: f64, new_len: f64) -> f64 {
    if old_len > f64::EPSILON {
        new0 + (v - old0) * new_len / old_len
    } else {
        new0 + new_len / 2.0
    }
}

impl ObjectTrait for Drawing {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn set_bounds(&mut self, bounds: Rect) {
        let old = self.bounds();
        let (width, height) = (bounds.width().max(0.0), bounds.height().max(0.0));
        for p in &mut self.path {
            p.x = rescale(p.x, old.x0, old.width(), bounds.x0, width);
            p.y = rescale(p.y, old.y0, old.height(), bounds.y0, height);
        }
        self.x = bounds.x0;
        self.y = bounds.y0;
        self.width = width;
        self.height = height;
    }

    fn translate(&mut self, delta: Vec2) {
        for p in &mut self.path {
            *p += delta;
        }
        self.x += delta.x;
        self.y += delta.y;
    }
}
