//! Replay scripts: a JSON list of steps driven through a [`Canvas`].
//!
//! ```json
//! { "steps": [
//!     { "step": "tool", "tool": "rectangle" },
//!     { "step": "pointer", "kind": "down", "position": { "x": 10, "y": 10 }, "button": "left" },
//!     { "step": "pointer", "kind": "up", "position": { "x": 120, "y": 140 }, "button": "left" },
//!     { "step": "key", "key": "z", "modifiers": { "ctrl": true } }
//! ] }
//! ```

use serde::Deserialize;
use slateboard_core::{
    Canvas, CellPos, InputRequest, KeyEvent, Modifiers, ObjectId, PointerEvent, PointerOutcome, ShapeKind,
    ToolKind,
};

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub viewport: Option<(f64, f64)>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Tool {
        tool: ToolKind,
    },
    Pointer(PointerEvent),
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Release {
        key: String,
    },
    /// Answer a pending table request. Missing dimensions use the config defaults.
    Table {
        rows: Option<usize>,
        cols: Option<usize>,
    },
    /// Turn a drawing into text. Without an id, the pending manual-text
    /// request or the last created object is used.
    Text {
        id: Option<ObjectId>,
        text: String,
    },
    Shape {
        id: Option<ObjectId>,
        shape: ShapeKind,
    },
    /// Stream transcription into a top-level table cell.
    Transcript {
        table: ObjectId,
        row: usize,
        col: usize,
        text: String,
        #[serde(default)]
        is_final: bool,
    },
    Undo,
    Redo,
    Fit,
}

/// What a replay did, for the summary line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplayStats {
    pub steps: usize,
    pub created: usize,
    pub connected: usize,
    pub refused: usize,
}

/// Drives a canvas through script steps, answering its input requests.
pub struct Replayer<'a> {
    canvas: &'a mut Canvas,
    pending: Option<InputRequest>,
    last_created: Option<ObjectId>,
    pub stats: ReplayStats,
}

impl<'a> Replayer<'a> {
    pub fn new(canvas: &'a mut Canvas) -> Self {
        Self {
            canvas,
            pending: None,
            last_created: None,
            stats: ReplayStats::default(),
        }
    }

    pub fn run(&mut self, script: &Script) {
        if let Some((width, height)) = script.viewport {
            self.canvas.set_viewport_size(width, height);
        }
        for (i, step) in script.steps.iter().enumerate() {
            if !self.apply(step.clone()) {
                log::debug!("Step {i} had no effect: {step:?}");
                self.stats.refused += 1;
            }
            self.stats.steps += 1;
        }
    }

    /// Apply one step. Returns false when the canvas refused it.
    pub fn apply(&mut self, step: Step) -> bool {
        match step {
            Step::Tool { tool } => {
                self.canvas.set_tool(tool);
                true
            }
            Step::Pointer(event) => {
                let outcome = self.canvas.handle_pointer_event(event);
                self.record(outcome)
            }
            Step::Key { key, modifiers } => {
                self.canvas.input.set_modifiers(modifiers);
                // Unbound keys still update the held-key state
                self.canvas.handle_key_event(KeyEvent::Pressed(key));
                true
            }
            Step::Release { key } => {
                self.canvas.handle_key_event(KeyEvent::Released(key));
                true
            }
            Step::Table { rows, cols } => self.answer_table(rows, cols),
            Step::Text { id, text } => {
                let id = match self.pending.take() {
                    Some(InputRequest::ManualText { id: asked, .. }) if id.is_none() => Some(asked),
                    other => {
                        self.pending = other;
                        id.or(self.last_created)
                    }
                };
                id.is_some_and(|id| self.canvas.convert_drawing_to_text(id, text))
            }
            Step::Shape { id, shape } => id
                .or(self.last_created)
                .is_some_and(|id| self.canvas.convert_drawing_to_shape(id, shape)),
            Step::Transcript {
                table,
                row,
                col,
                text,
                is_final,
            } => self
                .canvas
                .apply_transcript(table, &[], CellPos::new(row, col), &text, is_final),
            Step::Undo => self.canvas.undo(),
            Step::Redo => self.canvas.redo(),
            Step::Fit => {
                self.canvas.fit_to_content();
                true
            }
        }
    }

    /// Pointer events are never refused; their outcome only feeds the stats.
    fn record(&mut self, outcome: PointerOutcome) -> bool {
        match outcome {
            PointerOutcome::Created(id) => {
                self.stats.created += 1;
                self.last_created = Some(id);
            }
            PointerOutcome::Connected(_) => self.stats.connected += 1,
            PointerOutcome::NeedInput(request) => {
                log::info!("Canvas asks for input: {request:?}");
                self.pending = Some(request);
            }
            PointerOutcome::None
            | PointerOutcome::Changed
            | PointerOutcome::Selected(_)
            | PointerOutcome::ConnectionStarted(_) => {}
        }
        true
    }

    fn answer_table(&mut self, rows: Option<usize>, cols: Option<usize>) -> bool {
        let bounds = match self.pending.take() {
            Some(InputRequest::TableDimensions { bounds }) => bounds,
            other => {
                self.pending = other;
                log::warn!("No table request pending");
                return false;
            }
        };
        let config = &self.canvas.config;
        let rows = rows.unwrap_or(config.default_table_rows).max(1);
        let cols = cols.unwrap_or(config.default_table_cols).max(1);
        let id = self.canvas.create_table(bounds, rows, cols);
        self.stats.created += 1;
        self.last_created = Some(id);
        true
    }
}
