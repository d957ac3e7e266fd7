//! Tool system for the whiteboard.

use crate::color::Rgba;
use crate::objects::{ObjectId, ShapeKind};
use crate::selection::ResizeHandle;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Rectangle,
    Circle,
    Triangle,
    Text,
    Draw,
    Table,
    Connect,
}

impl ToolKind {
    /// Whether this tool creates an object by drag-to-create.
    pub fn creates_by_drag(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Triangle | ToolKind::Text | ToolKind::Table
        )
    }

    /// The geometric shape this tool draws, if any.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Triangle => Some(ShapeKind::Triangle),
            _ => None,
        }
    }
}

/// Where the pointer state machine currently is.
///
/// Every variant except `Idle` and `ConnectingFrom` lives between a
/// pointer-down and the matching pointer-up.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Dragging the view; anchored at the last device position.
    Panning { last_device: Point },
    /// Capturing a freehand stroke (logical points).
    DrawingPath { path: Vec<Point> },
    /// Dragging a corner handle of the selected object.
    ResizingObject {
        id: ObjectId,
        handle: ResizeHandle,
        last: Point,
        /// Whether an undo point was recorded for this gesture.
        recorded: bool,
    },
    /// Moving the selected object.
    DraggingObject { id: ObjectId, last: Point, recorded: bool },
    /// Dragging out the box of a new object.
    PendingCreate { anchor: Point, current: Point },
    /// A connection source was picked; waiting for the target.
    ConnectingFrom { source: ObjectId },
}

impl InteractionState {
    /// Whether a pointer gesture is in progress.
    pub fn is_gesture(&self) -> bool {
        !matches!(self, InteractionState::Idle | InteractionState::ConnectingFrom { .. })
    }
}

/// Stroke style applied to new drawings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Rgba::black(),
            width: 2.0,
        }
    }
}

/// Manages the current tool and the pointer state machine's state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the interaction.
    pub state: InteractionState,
    /// Style applied to new drawings.
    pub current_stroke: StrokeStyle,
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, discarding any uncommitted gesture.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.current_tool != tool {
            log::debug!("Tool {:?} -> {:?}", self.current_tool, tool);
        }
        self.current_tool = tool;
        self.state = InteractionState::Idle;
    }

    /// Drop any in-progress gesture or pending connection.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Check if a pointer gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.state.is_gesture()
    }

    /// The source object of a pending connection.
    pub fn connection_source(&self) -> Option<ObjectId> {
        match self.state {
            InteractionState::ConnectingFrom { source } => Some(source),
            _ => None,
        }
    }

    /// The stroke being captured, for live preview.
    pub fn current_path(&self) -> Option<&[Point]> {
        match &self.state {
            InteractionState::DrawingPath { path } => Some(path),
            _ => None,
        }
    }

    /// The box being dragged out, for live preview.
    pub fn pending_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::PendingCreate { anchor, current } => Some(Rect::from_points(anchor, current)),
            _ => None,
        }
    }
}

/// Box for a drag-to-create gesture from `anchor` to `end`.
///
/// Returns `None` unless the drag exceeds `threshold` on at least one axis.
/// An axis that stayed within the threshold gets `default_size` instead.
pub fn creation_rect(anchor: Point, end: Point, threshold: f64, default_size: f64) -> Option<Rect> {
    let rect = Rect::from_points(anchor, end);
    let (width, height) = (rect.width(), rect.height());
    if width <= threshold && height <= threshold {
        return None;
    }
    let (width, height) = if width <= threshold || height <= threshold {
        (width.max(default_size), height.max(default_size))
    } else {
        (width, height)
    };
    Some(Rect::new(rect.x0, rect.y0, rect.x0 + width, rect.y0 + height))
}
