//! Table object.

use super::{ObjectId, ObjectTrait};
use crate::grid::{CellPos, Grid};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A table placed on the canvas. Its cells may hold nested grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub(crate) id: ObjectId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub grid: Grid,
}

impl Table {
    /// Create an empty `rows × cols` table occupying `bounds`.
    pub fn new(id: ObjectId, bounds: Rect, rows: usize, cols: usize) -> Self {
        Self {
            id,
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width().max(0.0),
            height: bounds.height().max(0.0),
            grid: Grid::new(rows, cols),
        }
    }

    /// The grid addressed by `path` (empty path = the table's own grid).
    pub fn grid_at(&self, path: &[CellPos]) -> Option<&Grid> {
        self.grid.grid_at(path)
    }

    pub fn grid_at_mut(&mut self, path: &[CellPos]) -> Option<&mut Grid> {
        self.grid.grid_at_mut(path)
    }

    /// Which top-level cell lies under a logical point, laying cells out
    /// uniformly over the table's box.
    pub fn cell_at(&self, point: Point) -> Option<CellPos> {
        let bounds = self.bounds();
        if !bounds.contains(point) || self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let col = ((point.x - self.x) / self.width * self.grid.cols as f64) as usize;
        let row = ((point.y - self.y) / self.height * self.grid.rows as f64) as usize;
        Some(CellPos::new(
            row.min(self.grid.rows - 1),
            col.min(self.grid.cols - 1),
        ))
    }
}

impl ObjectTrait for Table {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table() {
        let table = Table::new(3, Rect::new(0.0, 0.0, 300.0, 90.0), 3, 2);
        assert_eq!((table.grid.rows, table.grid.cols), (3, 2));
        assert!(table.grid.check_invariants());
    }

    #[test]
    fn test_cell_at() {
        let table = Table::new(3, Rect::new(0.0, 0.0, 300.0, 90.0), 3, 3);
        assert_eq!(table.cell_at(Point::new(10.0, 10.0)), Some(CellPos::new(0, 0)));
        assert_eq!(table.cell_at(Point::new(150.0, 45.0)), Some(CellPos::new(1, 1)));
        assert_eq!(table.cell_at(Point::new(300.0, 90.0)), Some(CellPos::new(2, 2)));
        assert_eq!(table.cell_at(Point::new(301.0, 10.0)), None);
    }

    #[test]
    fn test_serializes_grid_fields_inline() {
        let table = Table::new(9, Rect::new(0.0, 0.0, 100.0, 100.0), 1, 2);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"], 1);
        assert_eq!(json["cols"], 2);
        assert_eq!(json["cells"][0].as_array().unwrap().len(), 2);
    }
}
