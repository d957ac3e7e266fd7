//! Directed links between objects.

use crate::objects::{CanvasObject, ObjectId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A directed link from one object to another, drawn between their centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: ObjectId,
    pub from: ObjectId,
    pub to: ObjectId,
}

impl Connection {
    pub fn new(id: ObjectId, from: ObjectId, to: ObjectId) -> Self {
        Self { id, from, to }
    }

    /// Whether either end refers to `object`.
    pub fn touches(&self, object: ObjectId) -> bool {
        self.from == object || self.to == object
    }

    /// Line endpoints (object centers). `None` when either end is missing.
    pub fn endpoints(&self, objects: &[CanvasObject]) -> Option<(Point, Point)> {
        let center = |id: ObjectId| objects.iter().find(|o| o.id() == id).map(CanvasObject::center);
        Some((center(self.from)?, center(self.to)?))
    }
}

/// Resolve every connection to a line, skipping those with a missing end.
pub fn connection_lines(connections: &[Connection], objects: &[CanvasObject]) -> Vec<(ObjectId, Point, Point)> {
    connections
        .iter()
        .filter_map(|conn| match conn.endpoints(objects) {
            Some((a, b)) => Some((conn.id, a, b)),
            None => {
                log::debug!("Skipping connection {} with a dangling end", conn.id);
                None
            }
        })
        .collect()
}
