//! Canvas document and session state.

use crate::animation::{Animation, AnimationKind};
use crate::color::Rgba;
use crate::config::{EngineConfig, MAX_UNDO_HISTORY};
use crate::connection::{Connection, connection_lines};
use crate::grid::{CellContent, CellPos, Grid};
use crate::input::InputState;
use crate::objects::{CanvasObject, ObjectId, Table};
use crate::tools::{ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size};
use uuid::Uuid;

/// A snapshot of document state for undo/redo.
#[derive(Debug, Clone)]
struct DocumentSnapshot {
    objects: Vec<CanvasObject>,
    connections: Vec<Connection>,
    animations: Vec<Animation>,
}

/// A canvas document: objects in z-order, the links between them and their
/// animations.
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    /// Unique document identifier, used as the storage key.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All objects, back to front.
    pub objects: Vec<CanvasObject>,
    pub connections: Vec<Connection>,
    pub animations: Vec<Animation>,
    /// Next id to hand out. Shared by objects, connections and animations.
    next_id: ObjectId,
    undo_stack: Vec<DocumentSnapshot>,
    redo_stack: Vec<DocumentSnapshot>,
    max_undo_history: usize,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for CanvasDocument {
    /// Documents are equal when their content is; history and ids are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.objects == other.objects && self.connections == other.connections && self.animations == other.animations
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            objects: Vec::new(),
            connections: Vec::new(),
            animations: Vec::new(),
            next_id: 1,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_history: MAX_UNDO_HISTORY,
        }
    }

    /// Build a document from existing content, keeping ids unique.
    pub fn from_parts(objects: Vec<CanvasObject>, connections: Vec<Connection>, animations: Vec<Animation>) -> Self {
        let mut doc = Self::new();
        for object in objects {
            doc.add_object(object);
        }
        let max_link = connections
            .iter()
            .map(|c| c.id)
            .chain(animations.iter().map(|a| a.id))
            .max()
            .unwrap_or(0);
        doc.next_id = doc.next_id.max(max_link + 1);
        doc.connections = connections;
        doc.animations = animations;
        doc
    }

    /// Replace this document's content with `other`'s, as one undo step.
    ///
    /// Ids stay as they are in `other`; the id counter moves past all of them.
    pub fn replace_content(&mut self, other: CanvasDocument) {
        self.push_undo();
        self.next_id = self.next_id.max(other.next_id);
        self.objects = other.objects;
        self.connections = other.connections;
        self.animations = other.animations;
    }

    /// Bound the number of undo states kept.
    pub fn set_max_undo_history(&mut self, max: usize) {
        self.max_undo_history = max;
        self.trim_history();
    }

    /// Hand out a fresh id.
    pub fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            objects: self.objects.clone(),
            connections: self.connections.clone(),
            animations: self.animations.clone(),
        }
    }

    fn restore(&mut self, snapshot: DocumentSnapshot) {
        self.objects = snapshot.objects;
        self.connections = snapshot.connections;
        self.animations = snapshot.animations;
    }

    fn trim_history(&mut self) {
        if self.undo_stack.len() > self.max_undo_history {
            let excess = self.undo_stack.len() - self.max_undo_history;
            self.undo_stack.drain(..excess);
        }
    }

    fn record(&mut self, snapshot: DocumentSnapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        self.trim_history();
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        let snapshot = self.snapshot();
        self.record(snapshot);
    }

    /// Run `edit` and record an undo point only if it reports a change.
    pub fn transact(&mut self, edit: impl FnOnce(&mut Self) -> bool) -> bool {
        let snapshot = self.snapshot();
        let changed = edit(self);
        if changed {
            self.record(snapshot);
        }
        changed
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.redo_stack.push(current);
        self.restore(snapshot);
        true
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.undo_stack.push(current);
        self.restore(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Add an object on top of the z-order.
    ///
    /// An object whose id is already taken is given a fresh one. Returns the
    /// id the object ended up with.
    pub fn add_object(&mut self, mut object: CanvasObject) -> ObjectId {
        if object.id() == 0 || self.get(object.id()).is_some() {
            let id = self.allocate_id();
            object.set_id(id);
        }
        let id = object.id();
        self.next_id = self.next_id.max(id + 1);
        self.objects.push(object);
        id
    }

    /// Remove an object together with every connection and animation that
    /// refers to it.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<CanvasObject> {
        let index = self.index_of(id)?;
        let removed = self.objects.remove(index);
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        self.animations.retain(|a| a.object_id != id);
        log::debug!(
            "Removed object {id} and {} connection(s)",
            before - self.connections.len()
        );
        Some(removed)
    }

    /// Clear all content. Undo history is left alone.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.connections.clear();
        self.animations.clear();
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// Bring an object to the front (topmost).
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.objects.len() => {
                let object = self.objects.remove(index);
                self.objects.push(object);
                true
            }
            _ => false,
        }
    }

    /// Send an object to the back (bottommost).
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                let object = self.objects.remove(index);
                self.objects.insert(0, object);
                true
            }
            _ => false,
        }
    }

    /// Get the bounding box of all objects.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(CanvasObject::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Link two distinct, existing objects.
    pub fn add_connection(&mut self, from: ObjectId, to: ObjectId) -> Option<ObjectId> {
        if from == to || self.get(from).is_none() || self.get(to).is_none() {
            return None;
        }
        let id = self.allocate_id();
        self.connections.push(Connection::new(id, from, to));
        log::debug!("Connected {from} -> {to} as {id}");
        Some(id)
    }

    pub fn remove_connection(&mut self, id: ObjectId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    /// Attach an animation to an existing object.
    pub fn add_animation(
        &mut self,
        object_id: ObjectId,
        kind: AnimationKind,
        duration_ms: u64,
        delay_ms: u64,
    ) -> Option<ObjectId> {
        self.get(object_id)?;
        let id = self.allocate_id();
        self.animations
            .push(Animation::new(id, object_id, kind, duration_ms, delay_ms));
        Some(id)
    }

    pub fn remove_animation(&mut self, id: ObjectId) -> bool {
        let before = self.animations.len();
        self.animations.retain(|a| a.id != id);
        self.animations.len() != before
    }

    /// Animations attached to an object, in playback order of insertion.
    pub fn animations_for(&self, object_id: ObjectId) -> impl Iterator<Item = &Animation> {
        self.animations.iter().filter(move |a| a.object_id == object_id)
    }

    /// The grid at `path` inside table `table`.
    pub fn grid(&self, table: ObjectId, path: &[CellPos]) -> Option<&Grid> {
        self.get(table)?.as_table()?.grid_at(path)
    }

    /// Apply `op` to the grid at `path` inside table `table`.
    ///
    /// An undo point is recorded only when `op` returns `Some`.
    pub fn edit_grid<R>(
        &mut self,
        table: ObjectId,
        path: &[CellPos],
        op: impl FnOnce(&mut Grid) -> Option<R>,
    ) -> Option<R> {
        let snapshot = self.snapshot();
        let grid = self.get_mut(table)?.as_table_mut()?.grid_at_mut(path)?;
        let result = op(grid)?;
        self.record(snapshot);
        Some(result)
    }
}

/// Read-only view of everything a renderer paints.
#[derive(Debug, Clone)]
pub struct RenderSnapshot<'a> {
    pub objects: &'a [CanvasObject],
    pub connections: &'a [Connection],
    /// Resolved connection lines; dangling connections are left out.
    pub lines: Vec<(ObjectId, Point, Point)>,
    pub viewport: &'a Viewport,
    pub selected: Option<ObjectId>,
    pub tool: ToolKind,
    /// Box being dragged out by a creation tool.
    pub pending_rect: Option<Rect>,
    /// Stroke being captured by the draw tool.
    pub current_path: Option<&'a [Point]>,
}

/// The cell a transcription stream is writing into.
#[derive(Debug, Clone, PartialEq)]
struct TranscriptTarget {
    table: ObjectId,
    path: Vec<CellPos>,
    cell: CellPos,
}

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Pan/zoom of the view.
    pub viewport: Viewport,
    pub tool_manager: ToolManager,
    /// Currently selected object.
    pub selection: Option<ObjectId>,
    /// Size of the rendering surface in device pixels.
    pub viewport_size: Size,
    pub config: EngineConfig,
    /// Keyboard/pointer modifier state.
    pub input: InputState,
    transcript: Option<TranscriptTarget>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut document = CanvasDocument::new();
        document.set_max_undo_history(config.max_undo_history);
        Self {
            document,
            viewport: Viewport::with_scale_bounds(config.min_scale, config.max_scale),
            tool_manager: ToolManager::new(),
            selection: None,
            viewport_size: Size::new(800.0, 600.0),
            config,
            input: InputState::new(),
            transcript: None,
        }
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: CanvasDocument) -> Self {
        let mut canvas = Self::new();
        canvas.set_document(document);
        canvas
    }

    /// Swap in a new document, dropping selection and any gesture.
    pub fn set_document(&mut self, mut document: CanvasDocument) {
        document.set_max_undo_history(self.config.max_undo_history);
        self.document = document;
        self.selection = None;
        self.transcript = None;
        self.tool_manager.cancel();
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    /// Select an object. Returns false if it doesn't exist.
    pub fn select(&mut self, id: ObjectId) -> bool {
        if self.document.get(id).is_none() {
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection == Some(id)
    }

    pub fn selected_object(&self) -> Option<&CanvasObject> {
        self.selection.and_then(|id| self.document.get(id))
    }

    /// Set the current tool. Picking a non-select tool clears the selection.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.set_tool(tool);
        if tool != ToolKind::Select {
            self.selection = None;
        }
    }

    /// Fit the view to show all objects.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.document.bounds() {
            self.viewport.fit_to_bounds(bounds, self.viewport_size, 50.0);
        }
    }

    /// Drop references to objects that no longer exist.
    fn forget_missing(&mut self) {
        if self.selection.is_some_and(|id| self.document.get(id).is_none()) {
            self.selection = None;
        }
        if self
            .tool_manager
            .connection_source()
            .is_some_and(|id| self.document.get(id).is_none())
        {
            self.tool_manager.cancel();
        }
    }

    /// Delete an object, its connections and its animations.
    pub fn delete_object(&mut self, id: ObjectId) -> bool {
        let deleted = self.document.transact(|doc| doc.remove_object(id).is_some());
        if deleted {
            self.forget_missing();
        }
        deleted
    }

    /// Delete the selected object.
    pub fn delete_selected(&mut self) -> bool {
        match self.selection {
            Some(id) => self.delete_object(id),
            None => false,
        }
    }

    /// Undo the last change, abandoning any gesture in progress.
    pub fn undo(&mut self) -> bool {
        if self.tool_manager.is_active() {
            self.tool_manager.cancel();
        }
        self.transcript = None;
        let undone = self.document.undo();
        self.forget_missing();
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.transcript = None;
        let redone = self.document.redo();
        self.forget_missing();
        redone
    }

    fn edit_object(&mut self, id: ObjectId, edit: impl FnOnce(&mut CanvasObject) -> bool) -> bool {
        self.document
            .transact(|doc| doc.get_mut(id).is_some_and(edit))
    }

    /// Set the text of a rectangle, circle, triangle or text object.
    pub fn set_object_text(&mut self, id: ObjectId, text: Option<String>) -> bool {
        self.edit_object(id, |obj| obj.set_text(text))
    }

    pub fn set_object_background(&mut self, id: ObjectId, color: Option<Rgba>) -> bool {
        self.edit_object(id, |obj| obj.set_background(color))
    }

    /// Set the image URL of a rectangle.
    pub fn set_object_image(&mut self, id: ObjectId, url: Option<String>) -> bool {
        self.edit_object(id, |obj| obj.set_image(url))
    }

    pub fn set_object_stroke(&mut self, id: ObjectId, color: Rgba, width: f64) -> bool {
        self.edit_object(id, |obj| obj.set_stroke(color, width))
    }

    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        self.document.transact(|doc| doc.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        self.document.transact(|doc| doc.send_to_back(id))
    }

    /// Connect two objects directly, bypassing the connect tool.
    pub fn connect(&mut self, from: ObjectId, to: ObjectId) -> Option<ObjectId> {
        let mut created = None;
        self.document.transact(|doc| {
            created = doc.add_connection(from, to);
            created.is_some()
        });
        created
    }

    pub fn remove_connection(&mut self, id: ObjectId) -> bool {
        self.document.transact(|doc| doc.remove_connection(id))
    }

    pub fn add_animation(
        &mut self,
        object_id: ObjectId,
        kind: AnimationKind,
        duration_ms: u64,
        delay_ms: u64,
    ) -> Option<ObjectId> {
        let mut created = None;
        self.document.transact(|doc| {
            created = doc.add_animation(object_id, kind, duration_ms, delay_ms);
            created.is_some()
        });
        created
    }

    pub fn remove_animation(&mut self, id: ObjectId) -> bool {
        self.document.transact(|doc| doc.remove_animation(id))
    }

    /// Create a table after the caller answered a table-dimensions request.
    /// The new table is selected.
    pub fn create_table(&mut self, bounds: Rect, rows: usize, cols: usize) -> ObjectId {
        self.document.push_undo();
        let id = self.document.allocate_id();
        let table = Table::new(id, bounds, rows, cols);
        log::debug!("Created {}x{} table {id}", table.grid.rows, table.grid.cols);
        self.document.add_object(CanvasObject::Table(table));
        self.selection = Some(id);
        id
    }

    /// Append a row to the grid at `path` of `table`.
    pub fn add_row(&mut self, table: ObjectId, path: &[CellPos]) -> bool {
        self.document
            .edit_grid(table, path, |grid| {
                grid.add_row();
                Some(())
            })
            .is_some()
    }

    pub fn add_column(&mut self, table: ObjectId, path: &[CellPos]) -> bool {
        self.document
            .edit_grid(table, path, |grid| {
                grid.add_column();
                Some(())
            })
            .is_some()
    }

    /// Delete a row. Refused for the last row.
    pub fn delete_row(&mut self, table: ObjectId, path: &[CellPos], index: usize) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.delete_row(index).then_some(()))
            .is_some()
    }

    /// Delete a column. Refused for the last column.
    pub fn delete_column(&mut self, table: ObjectId, path: &[CellPos], index: usize) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.delete_column(index).then_some(()))
            .is_some()
    }

    /// Merge cells into one span. Returns the anchor cell.
    pub fn merge_cells(&mut self, table: ObjectId, path: &[CellPos], cells: &[CellPos]) -> Option<CellPos> {
        self.document.edit_grid(table, path, |grid| grid.merge(cells))
    }

    pub fn split_cell(&mut self, table: ObjectId, path: &[CellPos], cell: CellPos) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.split(cell).then_some(()))
            .is_some()
    }

    pub fn set_cell_content(
        &mut self,
        table: ObjectId,
        path: &[CellPos],
        cell: CellPos,
        content: CellContent,
    ) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.set_content(cell, content).then_some(()))
            .is_some()
    }

    pub fn set_cell_size(
        &mut self,
        table: ObjectId,
        path: &[CellPos],
        cell: CellPos,
        width: Option<f64>,
        height: Option<f64>,
    ) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.set_cell_size(cell, width, height).then_some(()))
            .is_some()
    }

    /// Put a new `rows × cols` grid inside a cell.
    pub fn insert_nested_table(
        &mut self,
        table: ObjectId,
        path: &[CellPos],
        cell: CellPos,
        rows: usize,
        cols: usize,
    ) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.insert_nested(cell, rows, cols).then_some(()))
            .is_some()
    }

    pub fn remove_nested_table(&mut self, table: ObjectId, path: &[CellPos], cell: CellPos) -> bool {
        self.document
            .edit_grid(table, path, |grid| grid.remove_nested(cell).then_some(()))
            .is_some()
    }

    /// Feed streaming transcription output into a cell.
    ///
    /// Each call replaces the previous partial. All partials for one cell up
    /// to `is_final` form a single undo step. Refused for missing or covered
    /// cells.
    pub fn apply_transcript(
        &mut self,
        table: ObjectId,
        path: &[CellPos],
        cell: CellPos,
        text: &str,
        is_final: bool,
    ) -> bool {
        let writable = self
            .document
            .grid(table, path)
            .and_then(|grid| grid.cell(cell))
            .is_some_and(|c| !c.merged);
        if !writable {
            return false;
        }

        let target = TranscriptTarget {
            table,
            path: path.to_vec(),
            cell,
        };
        if self.transcript.as_ref() != Some(&target) {
            self.document.push_undo();
            self.transcript = Some(target);
        }

        if let Some(c) = self
            .document
            .get_mut(table)
            .and_then(CanvasObject::as_table_mut)
            .and_then(|t| t.grid_at_mut(path))
            .and_then(|grid| grid.cell_mut(cell))
        {
            c.apply_transcript(text);
        }

        if is_final {
            log::debug!("Transcript committed to table {table} cell ({}, {})", cell.row, cell.col);
            self.transcript = None;
        }
        true
    }

    /// Resolved connection lines for rendering.
    pub fn connection_lines(&self) -> Vec<(ObjectId, Point, Point)> {
        connection_lines(&self.document.connections, &self.document.objects)
    }

    /// Everything a renderer needs, re-read after every mutation.
    pub fn render_snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            objects: &self.document.objects,
            connections: &self.document.connections,
            lines: self.connection_lines(),
            viewport: &self.viewport,
            selected: self.selection,
            tool: self.tool_manager.current_tool,
            pending_rect: self.tool_manager.pending_rect(),
            current_path: self.tool_manager.current_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Shape;

    fn rect(x: f64, y: f64) -> CanvasObject {
        CanvasObject::Rectangle(Shape::new(0, Point::new(x, y), 100.0, 100.0))
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::new();
        assert!(doc.is_empty());
        assert!(!doc.id.is_empty());
    }

    #[test]
    fn test_add_object_assigns_unique_ids() {
        let mut doc = CanvasDocument::new();
        let a = doc.add_object(rect(0.0, 0.0));
        let b = doc.add_object(rect(50.0, 50.0));
        assert_ne!(a, b);
        assert_eq!(doc.len(), 2);

        // Colliding id is re-keyed
        let clash = CanvasObject::Circle(Shape::new(a, Point::ZERO, 10.0, 10.0));
        let c = doc.add_object(clash);
        assert_ne!(c, a);
        assert_ne!(c, b);
    }

    #[test]
    fn test_remove_cascades_connections_and_animations() {
        let mut doc = CanvasDocument::new();
        let a = doc.add_object(rect(0.0, 0.0));
        let b = doc.add_object(rect(200.0, 0.0));
        let c = doc.add_object(rect(400.0, 0.0));
        doc.add_connection(a, b).unwrap();
        let keep = doc.add_connection(b, c).unwrap();
        doc.add_animation(a, AnimationKind::Fade, 300, 0).unwrap();

        assert!(doc.remove_object(a).is_some());
        assert_eq!(doc.connections.len(), 1);
        assert_eq!(doc.connections[0].id, keep);
        assert!(doc.animations.is_empty());
    }

    #[test]
    fn test_add_connection_refuses_self_and_missing() {
        let mut doc = CanvasDocument::new();
        let a = doc.add_object(rect(0.0, 0.0));
        assert!(doc.add_connection(a, a).is_none());
        assert!(doc.add_connection(a, 999).is_none());
        assert!(doc.connections.is_empty());
    }

    #[test]
    fn test_z_order() {
        let mut doc = CanvasDocument::new();
        let a = doc.add_object(rect(0.0, 0.0));
        let b = doc.add_object(rect(50.0, 50.0));

        assert!(doc.bring_to_front(a));
        assert_eq!(doc.objects[1].id(), a);
        assert!(!doc.bring_to_front(a));

        assert!(doc.send_to_back(a));
        assert_eq!(doc.objects[0].id(), a);
        assert_eq!(doc.objects[1].id(), b);
    }

    #[test]
    fn test_undo_add_object() {
        let mut doc = CanvasDocument::new();

        doc.push_undo();
        let id = doc.add_object(rect(0.0, 0.0));
        assert!(doc.can_undo());

        assert!(doc.undo());
        assert!(doc.is_empty());
        assert!(doc.can_redo());

        assert!(doc.redo());
        assert!(doc.get(id).is_some());
    }

    #[test]
    fn test_undo_clears_redo() {
        let mut doc = CanvasDocument::new();
        doc.push_undo();
        doc.add_object(rect(0.0, 0.0));
        assert!(doc.undo());
        assert!(doc.can_redo());

        doc.push_undo();
        doc.add_object(rect(50.0, 50.0));
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_undo_empty_stack() {
        let mut doc = CanvasDocument::new();
        assert!(!doc.can_undo());
        assert!(!doc.undo());
        assert!(!doc.can_redo());
        assert!(!doc.redo());
    }

    #[test]
    fn test_undo_history_is_bounded() {
        let mut doc = CanvasDocument::new();
        doc.set_max_undo_history(3);
        for i in 0..10 {
            doc.push_undo();
            doc.add_object(rect(i as f64, 0.0));
        }
        let mut undone = 0;
        while doc.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(doc.len(), 7);
    }

    #[test]
    fn test_transact_skips_noops() {
        let mut doc = CanvasDocument::new();
        assert!(!doc.transact(|_| false));
        assert!(!doc.can_undo());
    }

    #[test]
    fn test_ids_not_reused_after_undo() {
        let mut doc = CanvasDocument::new();
        doc.push_undo();
        let a = doc.add_object(rect(0.0, 0.0));
        doc.undo();
        let b = doc.add_object(rect(0.0, 0.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_canvas_selection() {
        let mut canvas = Canvas::new();
        let id = canvas.document.add_object(rect(0.0, 0.0));

        assert!(!canvas.is_selected(id));
        assert!(canvas.select(id));
        assert!(canvas.is_selected(id));
        canvas.clear_selection();
        assert!(!canvas.is_selected(id));
        assert!(!canvas.select(12345));
    }

    #[test]
    fn test_delete_selected() {
        let mut canvas = Canvas::new();
        let id = canvas.document.add_object(rect(0.0, 0.0));
        canvas.select(id);
        assert!(canvas.delete_selected());
        assert!(canvas.document.is_empty());
        assert!(canvas.selection.is_none());
        assert!(!canvas.delete_selected());

        assert!(canvas.undo());
        assert!(canvas.document.get(id).is_some());
    }

    #[test]
    fn test_set_tool_clears_selection() {
        let mut canvas = Canvas::new();
        let id = canvas.document.add_object(rect(0.0, 0.0));
        canvas.select(id);
        canvas.set_tool(ToolKind::Select);
        assert!(canvas.is_selected(id));
        canvas.set_tool(ToolKind::Draw);
        assert!(canvas.selection.is_none());
    }

    #[test]
    fn test_object_edits_are_undoable() {
        let mut canvas = Canvas::new();
        let id = canvas.document.add_object(rect(0.0, 0.0));
        assert!(canvas.set_object_text(id, Some("hello".into())));
        assert!(canvas.set_object_image(id, Some("cat.png".into())));
        assert!(!canvas.set_object_stroke(id, Rgba::black(), 3.0));

        let shape = canvas.document.get(id).and_then(CanvasObject::as_shape).unwrap();
        assert_eq!(shape.text.as_deref(), Some("hello"));

        assert!(canvas.undo());
        assert!(canvas.undo());
        let shape = canvas.document.get(id).and_then(CanvasObject::as_shape).unwrap();
        assert!(shape.text.is_none());
        assert!(!canvas.undo());
    }

    #[test]
    fn test_table_ops_through_canvas() {
        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 300.0, 200.0), 2, 2);
        assert!(canvas.is_selected(table));

        assert!(canvas.add_row(table, &[]));
        assert!(canvas.add_column(table, &[]));
        assert!(canvas.delete_row(table, &[], 0));
        let grid = canvas.document.grid(table, &[]).unwrap();
        assert_eq!((grid.rows, grid.cols), (2, 3));
        assert!(grid.check_invariants());

        // Not a table
        let other = canvas.document.add_object(rect(0.0, 0.0));
        assert!(!canvas.add_row(other, &[]));
    }

    #[test]
    fn test_refused_table_ops_leave_no_undo_point() {
        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 1);
        assert!(canvas.undo());
        assert!(canvas.redo());
        assert!(!canvas.document.can_redo());

        assert!(!canvas.delete_row(table, &[], 0));
        assert!(!canvas.delete_column(table, &[], 0));
        assert!(canvas.merge_cells(table, &[], &[CellPos::new(0, 0)]).is_none());
        // Only the creation itself can be undone
        assert!(canvas.undo());
        assert!(!canvas.undo());
    }

    #[test]
    fn test_nested_table_ops() {
        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 300.0, 300.0), 2, 2);
        let outer = CellPos::new(1, 1);
        assert!(canvas.insert_nested_table(table, &[], outer, 2, 2));

        let path = [outer];
        assert!(canvas.add_row(table, &path));
        assert!(canvas.merge_cells(table, &path, &[CellPos::new(0, 0), CellPos::new(1, 1)]).is_some());
        let nested = canvas.document.grid(table, &path).unwrap();
        assert_eq!(nested.rows, 3);
        assert_eq!(nested.cells[0][0].row_span, 2);
        assert!(nested.cells[1][1].merged);

        assert!(canvas.split_cell(table, &path, CellPos::new(0, 0)));
        assert!(canvas.remove_nested_table(table, &[], outer));
        assert!(canvas.document.grid(table, &path).is_none());
    }

    #[test]
    fn test_transcript_stream_is_one_undo_step() {
        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 100.0, 100.0), 2, 2);
        let cell = CellPos::new(0, 1);

        assert!(canvas.apply_transcript(table, &[], cell, "hel", false));
        assert!(canvas.apply_transcript(table, &[], cell, "hello wor", false));
        assert!(canvas.apply_transcript(table, &[], cell, "hello world", true));
        let grid = canvas.document.grid(table, &[]).unwrap();
        assert_eq!(grid.cells[0][1].text, "hello world");

        assert!(canvas.undo());
        let grid = canvas.document.grid(table, &[]).unwrap();
        assert_eq!(grid.cells[0][1].text, "");
    }

    #[test]
    fn test_transcript_goes_to_audio_transcript() {
        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 1);
        let cell = CellPos::new(0, 0);
        let audio = CellContent::Audio {
            url: "memo.ogg".into(),
            transcript: None,
        };
        assert!(canvas.set_cell_content(table, &[], cell, audio));
        assert!(canvas.apply_transcript(table, &[], cell, "note to self", true));

        let c = &canvas.document.grid(table, &[]).unwrap().cells[0][0];
        assert_eq!(c.audio.as_deref(), Some("memo.ogg"));
        assert_eq!(c.transcript.as_deref(), Some("note to self"));
        assert!(c.text.is_empty());
    }

    #[test]
    fn test_transcript_refused_on_covered_cell() {
        let mut canvas = Canvas::new();
        let table = canvas.create_table(Rect::new(0.0, 0.0, 100.0, 100.0), 1, 2);
        canvas
            .merge_cells(table, &[], &[CellPos::new(0, 0), CellPos::new(0, 1)])
            .unwrap();
        assert!(!canvas.apply_transcript(table, &[], CellPos::new(0, 1), "x", true));
        assert!(!canvas.apply_transcript(table, &[], CellPos::new(5, 5), "x", true));
    }

    #[test]
    fn test_animations() {
        let mut canvas = Canvas::new();
        let a = canvas.document.add_object(rect(0.0, 0.0));
        let anim = canvas.add_animation(a, AnimationKind::Slide, 400, 100).unwrap();
        assert!(canvas.add_animation(999, AnimationKind::Fade, 1, 0).is_none());
        assert_eq!(canvas.document.animations_for(a).count(), 1);
        assert!(canvas.remove_animation(anim));
        assert!(!canvas.remove_animation(anim));
    }

    #[test]
    fn test_render_snapshot_skips_dangling_lines() {
        let mut canvas = Canvas::new();
        let a = canvas.document.add_object(rect(0.0, 0.0));
        let b = canvas.document.add_object(rect(200.0, 0.0));
        canvas.connect(a, b).unwrap();
        canvas.document.connections.push(Connection::new(500, a, 404));

        let snapshot = canvas.render_snapshot();
        assert_eq!(snapshot.connections.len(), 2);
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.tool, ToolKind::Select);
    }

    #[test]
    fn test_fit_to_content() {
        let mut canvas = Canvas::new();
        canvas.document.add_object(rect(1000.0, 1000.0));
        canvas.fit_to_content();
        let visible = canvas.viewport.visible_rect(canvas.viewport_size);
        assert!(visible.contains(Point::new(1050.0, 1050.0)));
    }

    #[test]
    fn test_from_parts_keeps_ids_fresh() {
        let mut objects = vec![rect(0.0, 0.0)];
        objects[0].set_id(7);
        let mut doc = CanvasDocument::from_parts(objects, vec![Connection::new(20, 7, 7)], vec![]);
        assert_eq!(doc.objects[0].id(), 7);
        assert!(doc.allocate_id() > 20);
    }
}
