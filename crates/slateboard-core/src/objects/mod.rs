//! Placeable objects for the whiteboard.

mod drawing;
mod shape;
mod table;

pub use drawing::{Drawing, path_bounds};
pub use shape::Shape;
pub use table::Table;

use crate::color::Rgba;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Unique identifier for objects, connections and animations.
pub type ObjectId = u64;

/// Common behavior of every object variant.
pub trait ObjectTrait {
    /// Get the unique identifier.
    fn id(&self) -> ObjectId;

    /// Axis-aligned bounding box in logical coordinates.
    fn bounds(&self) -> Rect;

    /// Move and resize the object to occupy `bounds`.
    fn set_bounds(&mut self, bounds: Rect);

    /// Move the object by a logical delta.
    fn translate(&mut self, delta: Vec2);
}

/// Discriminant of [`CanvasObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Rectangle,
    Circle,
    Triangle,
    Text,
    Drawing,
    Table,
}

/// The geometric shapes a drawing can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
}

/// Every object that can sit on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasObject {
    Rectangle(Shape),
    Circle(Shape),
    Triangle(Shape),
    Text(Shape),
    Drawing(Drawing),
    Table(Table),
}

impl CanvasObject {
    /// Wrap a shape body in the variant for `kind`.
    pub fn from_shape(kind: ShapeKind, shape: Shape) -> Self {
        match kind {
            ShapeKind::Rectangle => CanvasObject::Rectangle(shape),
            ShapeKind::Circle => CanvasObject::Circle(shape),
            ShapeKind::Triangle => CanvasObject::Triangle(shape),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            CanvasObject::Rectangle(_) => ObjectKind::Rectangle,
            CanvasObject::Circle(_) => ObjectKind::Circle,
            CanvasObject::Triangle(_) => ObjectKind::Triangle,
            CanvasObject::Text(_) => ObjectKind::Text,
            CanvasObject::Drawing(_) => ObjectKind::Drawing,
            CanvasObject::Table(_) => ObjectKind::Table,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => s.id(),
            CanvasObject::Drawing(d) => d.id(),
            CanvasObject::Table(t) => t.id(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => s.bounds(),
            CanvasObject::Drawing(d) => d.bounds(),
            CanvasObject::Table(t) => t.bounds(),
        }
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => s.set_bounds(bounds),
            CanvasObject::Drawing(d) => d.set_bounds(bounds),
            CanvasObject::Table(t) => t.set_bounds(bounds),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => s.translate(delta),
            CanvasObject::Drawing(d) => d.translate(delta),
            CanvasObject::Table(t) => t.translate(delta),
        }
    }

    /// Center of the bounding box; connections are drawn between centers.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Point-in-object test against the bounding box (edges inclusive).
    ///
    /// Triangles and drawings are tested against their box too, not their
    /// silhouette.
    pub fn contains(&self, point: Point) -> bool {
        let b = self.bounds();
        point.x >= b.x0 && point.x <= b.x1 && point.y >= b.y0 && point.y <= b.y1
    }

    /// The shape body of a text-bearing variant.
    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut Shape> {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_drawing(&self) -> Option<&Drawing> {
        match self {
            CanvasObject::Drawing(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            CanvasObject::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            CanvasObject::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Set the text of a text-bearing object. Refused for drawings and tables.
    pub fn set_text(&mut self, text: Option<String>) -> bool {
        match self.as_shape_mut() {
            Some(shape) => {
                shape.text = text;
                true
            }
            None => false,
        }
    }

    /// Set the background of a text-bearing object.
    pub fn set_background(&mut self, color: Option<Rgba>) -> bool {
        match self.as_shape_mut() {
            Some(shape) => {
                shape.background = color;
                true
            }
            None => false,
        }
    }

    /// Set the image URL. Only rectangles carry images.
    pub fn set_image(&mut self, url: Option<String>) -> bool {
        match self {
            CanvasObject::Rectangle(shape) => {
                shape.image = url;
                true
            }
            _ => false,
        }
    }

    /// Set stroke color and width of a drawing.
    pub fn set_stroke(&mut self, color: Rgba, width: f64) -> bool {
        match self {
            CanvasObject::Drawing(drawing) => {
                drawing.stroke_color = color;
                drawing.stroke_width = width.max(0.0);
                true
            }
            _ => false,
        }
    }

    /// Give the object a different id (used when re-keying imported objects).
    pub(crate) fn set_id(&mut self, id: ObjectId) {
        match self {
            CanvasObject::Rectangle(s)
            | CanvasObject::Circle(s)
            | CanvasObject::Triangle(s)
            | CanvasObject::Text(s) => s.id = id,
            CanvasObject::Drawing(d) => d.id = id,
            CanvasObject::Table(t) => t.id = id,
        }
    }
}
