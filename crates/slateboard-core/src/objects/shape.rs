//! Box-shaped objects: rectangles, circles, triangles and text boxes.

use super::{ObjectId, ObjectTrait};
use crate::color::Rgba;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A text-bearing object occupying an axis-aligned box.
///
/// The same body backs the `rectangle`, `circle`, `triangle` and `text`
/// variants; the variant decides how a renderer paints it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub(crate) id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba>,
    /// Image URL; only rectangles carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Shape {
    /// Create a new shape body.
    pub fn new(id: ObjectId, position: Point, width: f64, height: f64) -> Self {
        Self {
            id,
            x: position.x,
            y: position.y,
            width: width.max(0.0),
            height: height.max(0.0),
            text: None,
            background: None,
            image: None,
        }
    }

    /// Create a shape from two opposite corners.
    pub fn from_corners(id: ObjectId, p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(id, rect.origin(), rect.width(), rect.height())
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl ObjectTrait for Shape {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.x = bounds.x0;
        self.y = bounds.y0;
        self.width = bounds.width().max(0.0);
        self.height = bounds.height().max(0.0);
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }
}
