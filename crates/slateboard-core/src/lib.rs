//! Slateboard Core Library
//!
//! The canvas interaction engine of the Slateboard whiteboard: viewport
//! transform, scene object model, hit-testing, the pointer state machine,
//! drawing conversion and table editing. Rendering and persistence live
//! outside; they read [`RenderSnapshot`] and the [`ExportedCanvas`] format.

pub mod animation;
pub mod canvas;
pub mod color;
pub mod config;
pub mod connection;
pub mod convert;
pub mod error;
pub mod export;
pub mod grid;
pub mod input;
pub mod interaction;
pub mod objects;
pub mod selection;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use animation::{Animation, AnimationKind};
pub use canvas::{Canvas, CanvasDocument, RenderSnapshot};
pub use color::Rgba;
pub use config::EngineConfig;
pub use connection::Connection;
pub use convert::{ConvertOutcome, TextRecognizer};
pub use error::{ConfigError, ImportError, RecognitionError};
pub use export::ExportedCanvas;
pub use grid::{CellContent, CellPos, Grid, TableCell};
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use interaction::{InputRequest, PointerOutcome};
pub use objects::{CanvasObject, Drawing, ObjectId, ObjectKind, Shape, ShapeKind, Table};
pub use selection::ResizeHandle;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{InteractionState, ToolKind, ToolManager};
pub use viewport::{NudgeDirection, Viewport};
