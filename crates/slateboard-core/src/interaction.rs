//! Pointer state machine: turns pointer-down/move/up into object mutations.
//!
//! Positions arrive in device coordinates and are mapped through the
//! viewport before any hit-testing. Nothing is committed to the document
//! before pointer-up except drag and resize steps, which record a single
//! undo point on their first movement.

use crate::canvas::Canvas;
use crate::objects::{CanvasObject, Drawing, ObjectId, Shape};
use crate::selection::{apply_resize, hit_test, resize_handle};
use crate::tools::{InteractionState, ToolKind, creation_rect};
use kurbo::{Point, Rect, Vec2};

/// A value the caller has to supply before an operation can finish.
#[derive(Debug, Clone, PartialEq)]
pub enum InputRequest {
    /// Row and column counts for a table dragged out at `bounds`.
    /// Answer with [`Canvas::create_table`].
    TableDimensions { bounds: Rect },
    /// Text for drawing `id`, after recognition failed.
    /// Answer with [`Canvas::convert_drawing_to_text`].
    ManualText { id: ObjectId, reason: String },
}

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing changed.
    None,
    /// The view, a preview or an object changed; repaint.
    Changed,
    /// An object was selected.
    Selected(ObjectId),
    /// A new object was created.
    Created(ObjectId),
    /// The connect tool picked its source object.
    ConnectionStarted(ObjectId),
    /// A connection was created.
    Connected(ObjectId),
    /// The gesture needs more input from the caller.
    NeedInput(InputRequest),
}

impl Canvas {
    /// Handle a pointer press at a device position.
    ///
    /// `pan` is true while the pan modifier (middle button or held space)
    /// is active.
    pub fn pointer_down(&mut self, device: Point, pan: bool) -> PointerOutcome {
        let point = self.viewport.to_logical(device);
        let previous = std::mem::take(&mut self.tool_manager.state);

        let (state, outcome) = if pan {
            (InteractionState::Panning { last_device: device }, PointerOutcome::None)
        } else {
            match self.tool_manager.current_tool {
                ToolKind::Draw => (
                    InteractionState::DrawingPath { path: vec![point] },
                    PointerOutcome::Changed,
                ),
                ToolKind::Select => self.select_down(point),
                // The connect tool acts on release
                ToolKind::Connect => (previous, PointerOutcome::None),
                _ => (
                    InteractionState::PendingCreate {
                        anchor: point,
                        current: point,
                    },
                    PointerOutcome::None,
                ),
            }
        };

        log::trace!("pointer down at {point:?} -> {state:?}");
        self.tool_manager.state = state;
        outcome
    }

    fn select_down(&mut self, point: Point) -> (InteractionState, PointerOutcome) {
        let tolerance = self.config.handle_tolerance;
        let grabbed = self
            .selected_object()
            .and_then(|obj| Some((obj.id(), resize_handle(point, obj, tolerance)?)));
        if let Some((id, handle)) = grabbed {
            return (
                InteractionState::ResizingObject {
                    id,
                    handle,
                    last: point,
                    recorded: false,
                },
                PointerOutcome::None,
            );
        }

        match hit_test(point, &self.document.objects).map(CanvasObject::id) {
            Some(id) => {
                self.selection = Some(id);
                (
                    InteractionState::DraggingObject {
                        id,
                        last: point,
                        recorded: false,
                    },
                    PointerOutcome::Selected(id),
                )
            }
            None => (InteractionState::Idle, PointerOutcome::None),
        }
    }

    /// Handle pointer movement at a device position.
    pub fn pointer_move(&mut self, device: Point) -> PointerOutcome {
        let point = self.viewport.to_logical(device);
        let state = std::mem::take(&mut self.tool_manager.state);

        let (state, outcome) = match state {
            InteractionState::Panning { last_device } => {
                self.viewport.pan(device - last_device);
                (InteractionState::Panning { last_device: device }, PointerOutcome::Changed)
            }
            InteractionState::DrawingPath { mut path } => {
                path.push(point);
                (InteractionState::DrawingPath { path }, PointerOutcome::Changed)
            }
            InteractionState::ResizingObject {
                id,
                handle,
                last,
                recorded,
            } => {
                let delta = point - last;
                let min_size = self.config.min_object_size;
                let recorded = self.step_object(id, delta, recorded, |obj| {
                    apply_resize(obj, handle, delta, min_size);
                });
                (
                    InteractionState::ResizingObject {
                        id,
                        handle,
                        last: point,
                        recorded,
                    },
                    PointerOutcome::Changed,
                )
            }
            InteractionState::DraggingObject { id, last, recorded } => {
                let delta = point - last;
                let recorded = self.step_object(id, delta, recorded, |obj| obj.translate(delta));
                (
                    InteractionState::DraggingObject {
                        id,
                        last: point,
                        recorded,
                    },
                    PointerOutcome::Changed,
                )
            }
            InteractionState::PendingCreate { anchor, .. } => (
                InteractionState::PendingCreate {
                    anchor,
                    current: point,
                },
                PointerOutcome::Changed,
            ),
            other => (other, PointerOutcome::None),
        };

        self.tool_manager.state = state;
        outcome
    }

    /// Apply one drag/resize step, recording an undo point before the first
    /// real movement of the gesture. Returns the updated `recorded` flag.
    fn step_object(
        &mut self,
        id: ObjectId,
        delta: Vec2,
        recorded: bool,
        step: impl FnOnce(&mut CanvasObject),
    ) -> bool {
        if delta == Vec2::ZERO || self.document.get(id).is_none() {
            return recorded;
        }
        if !recorded {
            self.document.push_undo();
        }
        if let Some(obj) = self.document.get_mut(id) {
            step(obj);
        }
        true
    }

    /// Handle a pointer release at a device position.
    pub fn pointer_up(&mut self, device: Point) -> PointerOutcome {
        let point = self.viewport.to_logical(device);
        let state = std::mem::take(&mut self.tool_manager.state);

        if self.tool_manager.current_tool == ToolKind::Connect && !matches!(state, InteractionState::Panning { .. }) {
            return self.connect_up(point, state);
        }

        match state {
            InteractionState::Panning { last_device } => {
                self.viewport.pan(device - last_device);
                PointerOutcome::Changed
            }
            InteractionState::DrawingPath { mut path } => {
                if path.last() != Some(&point) {
                    path.push(point);
                }
                self.finish_drawing(path)
            }
            InteractionState::PendingCreate { anchor, .. } => self.finish_create(anchor, point),
            InteractionState::ResizingObject { recorded, .. } | InteractionState::DraggingObject { recorded, .. } => {
                if recorded {
                    PointerOutcome::Changed
                } else {
                    PointerOutcome::None
                }
            }
            InteractionState::Idle | InteractionState::ConnectingFrom { .. } => PointerOutcome::None,
        }
    }

    fn finish_drawing(&mut self, path: Vec<Point>) -> PointerOutcome {
        let style = self.tool_manager.current_stroke;
        let id = self.document.allocate_id();
        let Some(drawing) = Drawing::from_points(id, path) else {
            return PointerOutcome::None;
        };
        self.document.push_undo();
        let drawing = drawing.with_stroke(style.color, style.width);
        log::debug!("Created drawing {id} with {} point(s)", drawing.len());
        self.document.add_object(CanvasObject::Drawing(drawing));
        PointerOutcome::Created(id)
    }

    fn finish_create(&mut self, anchor: Point, end: Point) -> PointerOutcome {
        let tool = self.tool_manager.current_tool;
        let Some(bounds) = creation_rect(
            anchor,
            end,
            self.config.create_threshold,
            self.config.default_create_size,
        ) else {
            log::debug!("Discarded {tool:?} drag below the creation threshold");
            return PointerOutcome::None;
        };

        self.tool_manager.set_tool(ToolKind::Select);

        if tool == ToolKind::Table {
            return PointerOutcome::NeedInput(InputRequest::TableDimensions { bounds });
        }

        let id = self.document.allocate_id();
        let shape = Shape::new(id, bounds.origin(), bounds.width(), bounds.height());
        let object = match tool.shape_kind() {
            Some(kind) => CanvasObject::from_shape(kind, shape),
            None => CanvasObject::Text(shape),
        };
        self.document.push_undo();
        log::debug!("Created {:?} {id} at {bounds:?}", object.kind());
        self.document.add_object(object);
        self.selection = Some(id);
        PointerOutcome::Created(id)
    }

    fn connect_up(&mut self, point: Point, state: InteractionState) -> PointerOutcome {
        let Some(target) = hit_test(point, &self.document.objects).map(CanvasObject::id) else {
            self.tool_manager.state = state;
            return PointerOutcome::None;
        };

        match state {
            InteractionState::ConnectingFrom { source } if source == target => {
                self.tool_manager.state = state;
                PointerOutcome::None
            }
            InteractionState::ConnectingFrom { source } => match self.connect(source, target) {
                Some(id) => PointerOutcome::Connected(id),
                None => PointerOutcome::None,
            },
            _ => {
                self.tool_manager.state = InteractionState::ConnectingFrom { source: target };
                PointerOutcome::ConnectionStarted(target)
            }
        }
    }

    /// Abandon the gesture in progress and any pending connection.
    pub fn cancel_gesture(&mut self) -> bool {
        let was_busy = self.tool_manager.state != InteractionState::Idle;
        self.tool_manager.cancel();
        was_busy
    }
}
