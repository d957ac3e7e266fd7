//! Raw mouse/keyboard events and their routing into the canvas.

use crate::canvas::Canvas;
use crate::interaction::PointerOutcome;
use crate::viewport::NudgeDirection;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are device coordinates relative to the surface origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
    Scroll { position: Point, delta: Vec2 },
}

/// Keyboard event type. Keys use their DOM-style names
/// (`"ArrowLeft"`, `"Escape"`, `" "`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Tracks buttons, keys and modifiers across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position in device coordinates.
    pub pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    pressed_keys: HashSet<String>,
    pub modifiers: Modifiers,
    /// Whether the current press is a pan gesture.
    panning: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Space held down turns a left press into a pan.
    pub fn space_held(&self) -> bool {
        self.is_key_pressed(" ") || self.is_key_pressed("Space")
    }
}

impl Canvas {
    /// Route a pointer event into the state machine.
    ///
    /// The middle button, or the left button while space is held, pans.
    /// The right button is left to the surrounding UI.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> PointerOutcome {
        match event {
            PointerEvent::Down { position, button } => {
                self.input.pointer_position = position;
                self.input.pressed_buttons.insert(button);
                let pan = match button {
                    MouseButton::Middle => true,
                    MouseButton::Left => self.input.space_held(),
                    MouseButton::Right => return PointerOutcome::None,
                };
                self.input.panning = pan;
                self.pointer_down(position, pan)
            }
            PointerEvent::Up { position, button } => {
                self.input.pointer_position = position;
                self.input.pressed_buttons.remove(&button);
                let expected = if self.input.panning {
                    button != MouseButton::Right
                } else {
                    button == MouseButton::Left
                };
                if !expected {
                    return PointerOutcome::None;
                }
                self.input.panning = false;
                self.pointer_up(position)
            }
            PointerEvent::Move { position } => {
                self.input.pointer_position = position;
                self.pointer_move(position)
            }
            PointerEvent::Scroll { position, delta } => {
                self.input.pointer_position = position;
                // Wheel up (negative dy) zooms in
                if self.viewport.zoom(position, -delta.y, self.config.zoom_step) {
                    PointerOutcome::Changed
                } else {
                    PointerOutcome::None
                }
            }
        }
    }

    /// Route a key event. Returns true if the canvas changed.
    ///
    /// Arrows nudge the view, Delete/Backspace delete the selection, Escape
    /// cancels the gesture (or clears the selection when idle), `+`/`-` zoom
    /// around the surface centre, Ctrl+Z / Ctrl+Shift+Z / Ctrl+Y undo and redo.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> bool {
        let key = match event {
            KeyEvent::Pressed(key) => key,
            KeyEvent::Released(key) => {
                self.input.pressed_keys.remove(&key);
                return false;
            }
        };
        self.input.pressed_keys.insert(key.clone());

        let nudge = |canvas: &mut Canvas, direction| {
            canvas.viewport.nudge(direction, canvas.config.nudge_distance);
            true
        };
        let centre = Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0);
        let command = self.input.modifiers.command();

        match key.as_str() {
            "ArrowLeft" => nudge(self, NudgeDirection::Left),
            "ArrowRight" => nudge(self, NudgeDirection::Right),
            "ArrowUp" => nudge(self, NudgeDirection::Up),
            "ArrowDown" => nudge(self, NudgeDirection::Down),
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => {
                if self.cancel_gesture() {
                    true
                } else {
                    self.selection.take().is_some()
                }
            }
            "+" | "=" => self.viewport.zoom(centre, 1.0, self.config.zoom_step),
            "-" | "_" => self.viewport.zoom(centre, -1.0, self.config.zoom_step),
            "z" | "Z" if command && self.input.modifiers.shift => self.redo(),
            "z" | "Z" if command => self.undo(),
            "y" | "Y" if command => self.redo(),
            _ => false,
        }
    }
}
