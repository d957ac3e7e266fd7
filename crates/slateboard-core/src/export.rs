//! JSON export format: `{ objects, connections, animations }`.
//!
//! Export writes the document verbatim. Import is lenient: missing keys are
//! empty lists, entries that don't parse are skipped with a warning, and
//! tables are repaired so their grids are rectangular with consistent spans.

use crate::animation::Animation;
use crate::canvas::{Canvas, CanvasDocument};
use crate::connection::Connection;
use crate::error::ImportError;
use crate::objects::CanvasObject;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The exported state of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportedCanvas {
    pub objects: Vec<CanvasObject>,
    pub connections: Vec<Connection>,
    pub animations: Vec<Animation>,
}

impl ExportedCanvas {
    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse exported JSON leniently.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, ImportError> {
        let Value::Object(mut map) = value else {
            return Err(ImportError::NotAnObject(json_kind(&value)));
        };

        let mut objects: Vec<CanvasObject> = parse_entries(map.remove("objects"), "objects");
        objects.retain_mut(|obj| repair_object(obj));
        let connections = parse_entries(map.remove("connections"), "connections");
        let animations = parse_entries(map.remove("animations"), "animations");

        log::info!(
            "Imported {} object(s), {} connection(s), {} animation(s)",
            objects.len(),
            connections.len(),
            animations.len()
        );
        Ok(Self {
            objects,
            connections,
            animations,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse every entry of a JSON list, skipping the ones that don't fit `T`.
fn parse_entries<T: DeserializeOwned>(value: Option<Value>, key: &str) -> Vec<T> {
    let entries = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            log::warn!("Ignoring '{key}': expected a list, found {}", json_kind(&other));
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("Skipping {key}[{i}]: {e}");
                None
            }
        })
        .collect()
}

/// Fix what can be fixed in an imported object. Returns false to drop it.
fn repair_object(obj: &mut CanvasObject) -> bool {
    let id = obj.id();
    match obj {
        CanvasObject::Drawing(drawing) => {
            if drawing.is_empty() {
                log::warn!("Skipping drawing {id} with an empty path");
                return false;
            }
            // A resized box is kept; a stale one is re-derived from the path
            if !drawing.box_matches_path() {
                log::warn!("Re-deriving bounds of drawing {id} from its path");
                let path = drawing.path().to_vec();
                drawing.set_path(path);
            }
        }
        CanvasObject::Table(table) => {
            table.grid.normalize();
        }
        _ => {
            if let Some(shape) = obj.as_shape_mut() {
                shape.width = shape.width.max(0.0);
                shape.height = shape.height.max(0.0);
            }
        }
    }
    true
}

impl CanvasDocument {
    /// The document's content in export form.
    pub fn export(&self) -> ExportedCanvas {
        ExportedCanvas {
            objects: self.objects.clone(),
            connections: self.connections.clone(),
            animations: self.animations.clone(),
        }
    }

    /// Serialize the document's content to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.export().to_json()
    }

    /// Build a document from exported content.
    pub fn import(exported: ExportedCanvas) -> Self {
        Self::from_parts(exported.objects, exported.connections, exported.animations)
    }

    /// Deserialize a document from exported JSON.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        ExportedCanvas::from_json(json).map(Self::import)
    }
}

impl Canvas {
    /// Replace the canvas content with an exported document, as one undo step.
    pub fn import_json(&mut self, json: &str) -> Result<(), ImportError> {
        let imported = CanvasDocument::from_json(json)?;
        self.document.replace_content(imported);
        self.selection = None;
        self.tool_manager.cancel();
        Ok(())
    }

    pub fn export(&self) -> ExportedCanvas {
        self.document.export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationKind;
    use crate::color::Rgba;
    use crate::grid::{CellContent, CellPos};
    use crate::objects::{Drawing, ObjectKind, Shape};
    use kurbo::{Point, Rect};

    fn sample_document() -> CanvasDocument {
        let mut canvas = Canvas::new();
        let a = canvas.document.add_object(CanvasObject::Rectangle(
            Shape::new(0, Point::new(10.0, 10.0), 120.0, 80.0).with_text("start"),
        ));
        canvas.set_object_background(a, Rgba::parse("#ffcc00"));
        canvas.set_object_image(a, Some("https://example.com/a.png".into()));
        let drawing = Drawing::from_points(0, vec![Point::new(0.0, 0.0), Point::new(30.0, 40.0)])
            .unwrap()
            .with_stroke(Rgba::new(255, 0, 0, 255), 3.0);
        canvas.document.add_object(CanvasObject::Drawing(drawing));
        let table = canvas.create_table(Rect::new(200.0, 0.0, 500.0, 200.0), 2, 3);
        canvas.set_cell_content(table, &[], CellPos::new(0, 0), CellContent::Text("a".into()));
        canvas.set_cell_content(
            table,
            &[],
            CellPos::new(1, 2),
            CellContent::Audio {
                url: "memo.ogg".into(),
                transcript: Some("hello".into()),
            },
        );
        canvas.merge_cells(table, &[], &[CellPos::new(0, 0), CellPos::new(0, 1)]);
        canvas.insert_nested_table(table, &[], CellPos::new(1, 0), 2, 2);
        canvas.connect(a, table).unwrap();
        canvas.add_animation(a, AnimationKind::Bounce, 600, 200).unwrap();
        canvas.document
    }

    #[test]
    fn test_export_import_roundtrip() {
        let doc = sample_document();
        let json = doc.to_json().unwrap();
        let back = CanvasDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
        let ids = |d: &CanvasDocument| d.objects.iter().map(CanvasObject::id).collect::<Vec<_>>();
        assert_eq!(ids(&back), ids(&doc));
    }

    #[test]
    fn test_export_shape() {
        let json = sample_document().to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["objects"].as_array().unwrap().len(), 3);
        assert_eq!(value["objects"][0]["type"], "rectangle");
        assert_eq!(value["objects"][0]["background"], "#ffcc00");
        assert_eq!(value["objects"][2]["type"], "table");
        assert_eq!(value["objects"][2]["cells"][0][0]["colSpan"], 2);
        assert_eq!(value["objects"][2]["cells"][0][1]["merged"], true);
        assert!(value["objects"][2]["cells"][1][0]["nestedTable"].is_object());
        assert_eq!(value["connections"][0]["from"], value["objects"][0]["id"]);
        assert_eq!(value["animations"][0]["type"], "bounce");
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let doc = CanvasDocument::from_json("{}").unwrap();
        assert!(doc.is_empty());
        assert!(doc.connections.is_empty());
        assert!(doc.animations.is_empty());

        let doc = CanvasDocument::from_json(r#"{ "objects": [], "connections": null }"#).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_not_an_object_is_an_error() {
        assert!(matches!(
            CanvasDocument::from_json("[1, 2]"),
            Err(ImportError::NotAnObject("an array"))
        ));
        assert!(matches!(CanvasDocument::from_json("{ nope"), Err(ImportError::Json(_))));
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let json = r#"{
            "objects": [
                { "type": "circle", "id": 1, "x": 0, "y": 0, "width": 50, "height": 50 },
                { "type": "hexagon", "id": 2 },
                { "type": "drawing", "id": 3, "x": 0, "y": 0, "width": 0, "height": 0, "path": [] },
                { "type": "rectangle", "id": 4, "x": 1, "y": 2, "width": 3, "height": 4 }
            ],
            "connections": [ { "id": 5, "from": 1, "to": 4 }, { "id": "x" } ],
            "animations": "nope"
        }"#;
        let doc = CanvasDocument::from_json(json).unwrap();
        assert_eq!(doc.objects.iter().map(CanvasObject::id).collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(doc.connections.len(), 1);
        assert!(doc.animations.is_empty());
    }

    #[test]
    fn test_drawing_box_rederived_from_path() {
        let json = r#"{ "objects": [
            { "type": "drawing", "id": 1, "x": 999, "y": 999, "width": 1, "height": 1,
              "path": [ { "x": 5, "y": 5 }, { "x": 25, "y": 45 } ] }
        ] }"#;
        let doc = CanvasDocument::from_json(json).unwrap();
        assert_eq!(doc.objects[0].bounds(), Rect::new(5.0, 5.0, 25.0, 45.0));
    }

    #[test]
    fn test_resized_straight_stroke_keeps_its_box() {
        let json = r#"{ "objects": [
            { "type": "drawing", "id": 1, "x": 130, "y": 100, "width": 50, "height": 110,
              "path": [ { "x": 155, "y": 100 }, { "x": 155, "y": 210 } ] }
        ] }"#;
        let doc = CanvasDocument::from_json(json).unwrap();
        assert_eq!(doc.objects[0].bounds(), Rect::new(130.0, 100.0, 180.0, 210.0));

        // Off the centre line the box no longer fits the path
        let json = json.replace("155", "140");
        let doc = CanvasDocument::from_json(&json).unwrap();
        assert_eq!(doc.objects[0].bounds(), Rect::new(140.0, 100.0, 140.0, 210.0));
    }

    #[test]
    fn test_ragged_table_is_repaired() {
        let json = r#"{ "objects": [
            { "type": "table", "id": 1, "x": 0, "y": 0, "width": 100, "height": 100,
              "rows": 2, "cols": 2,
              "cells": [ [ { "text": "a" }, { "text": "b" }, { "text": "c" } ], [] ] }
        ] }"#;
        let doc = CanvasDocument::from_json(json).unwrap();
        let grid = &doc.objects[0].as_table().unwrap().grid;
        assert!(grid.check_invariants());
        assert_eq!(grid.cells[0][0].text, "a");
    }

    #[test]
    fn test_dangling_connection_survives_import() {
        let json = r#"{ "objects": [], "connections": [ { "id": 1, "from": 7, "to": 8 } ] }"#;
        let doc = CanvasDocument::from_json(json).unwrap();
        assert_eq!(doc.connections.len(), 1);
    }

    #[test]
    fn test_import_ids_do_not_collide() {
        let json = r#"{ "objects": [
            { "type": "text", "id": 41, "x": 0, "y": 0, "width": 100, "height": 40, "text": "hi" }
        ], "connections": [], "animations": [ { "id": 42, "objectId": 41, "type": "fade", "durationMs": 100 } ] }"#;
        let mut canvas = Canvas::new();
        canvas.import_json(json).unwrap();
        assert_eq!(canvas.document.get(41).unwrap().kind(), ObjectKind::Text);

        canvas.set_tool(crate::tools::ToolKind::Rectangle);
        canvas.pointer_down(Point::new(0.0, 0.0), false);
        let outcome = canvas.pointer_up(Point::new(100.0, 100.0));
        assert_eq!(outcome, crate::interaction::PointerOutcome::Created(43));

        // Import is undoable
        assert!(canvas.undo());
        assert!(canvas.undo());
        assert!(canvas.document.is_empty());
    }
}
