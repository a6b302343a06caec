//! Input management system
//!
//! Surfaces report raw input in two ways: polled pressed state through
//! [`KeyState`] for keys and buttons, and queued [`InputEvent`]s (cursor
//! motion, close requests) pushed into an [`InputQueue`] during their
//! swap-and-poll step. The [`InputBinder`] turns both into [`Fired`]
//! actions once per tick.

mod binder;

pub use binder::{Fired, InputBinder, KeyBinding};

use crate::scene::NodeHandle;
use std::collections::VecDeque;

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// C key
    C,
    /// D key
    D,
    /// E key
    E,
    /// F key
    F,
    /// G key
    G,
    /// H key
    H,
    /// I key
    I,
    /// J key
    J,
    /// K key
    K,
    /// L key
    L,
    /// M key
    M,
    /// N key
    N,
    /// O key
    O,
    /// P key
    P,
    /// Q key
    Q,
    /// R key
    R,
    /// S key
    S,
    /// T key
    T,
    /// U key
    U,
    /// V key
    V,
    /// W key
    W,
    /// X key
    X,
    /// Y key
    Y,
    /// Z key
    Z,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Tab key
    Tab,
    /// Left shift
    LeftShift,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

/// Anything with a pressed/released state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(MouseButton),
}

impl From<KeyCode> for InputSource {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for InputSource {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

/// When a binding fires, given this tick's and last tick's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerMode {
    /// Every tick the source is down
    Held,
    /// Every tick the source is up
    Released,
    /// The tick the source goes down
    Pressed,
    /// The tick the source goes up
    ReleasedEdge,
}

impl TriggerMode {
    /// Whether a binding in this mode fires
    pub fn fires(self, pressed: bool, was_pressed: bool) -> bool {
        match self {
            Self::Held => pressed,
            Self::Released => !pressed,
            Self::Pressed => pressed && !was_pressed,
            Self::ReleasedEdge => !pressed && was_pressed,
        }
    }
}

/// Camera translation directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    /// Along the view direction
    Forward,
    /// Against the view direction
    Back,
    /// Strafe left
    Left,
    /// Strafe right
    Right,
}

/// What a key binding does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move the active camera
    MoveCamera(CameraMovement),
    /// Flip the camera flashlight's enable flag
    ToggleFlashlight,
    /// Flip a root node's wireframe flag
    ToggleWireframe(NodeHandle),
    /// Ask the surface to close
    RequestClose,
    /// Application-defined action
    Custom(u32),
}

/// Who receives cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseTarget {
    /// Yaw/pitch of the active camera
    CameraLook,
    /// Application-defined handler
    Custom(u32),
}

/// Raw input reported by a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Absolute cursor position in window pixels
    CursorMoved {
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
    /// The user asked to close the window
    CloseRequested,
}

/// FIFO of input events drained once per tick
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Take every queued event in arrival order
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Polled pressed state
pub trait KeyState {
    /// Whether `source` is currently down
    fn is_pressed(&self, source: InputSource) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_mode_truth_table() {
        // (pressed, was_pressed)
        let cases = [(false, false), (true, false), (true, true), (false, true)];
        let fired = |mode: TriggerMode| -> Vec<bool> {
            cases.iter().map(|(p, w)| mode.fires(*p, *w)).collect()
        };

        assert_eq!(fired(TriggerMode::Held), vec![false, true, true, false]);
        assert_eq!(fired(TriggerMode::Released), vec![true, false, false, true]);
        assert_eq!(fired(TriggerMode::Pressed), vec![false, true, false, false]);
        assert_eq!(fired(TriggerMode::ReleasedEdge), vec![false, false, false, true]);
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::CursorMoved { x: 1.0, y: 2.0 });
        queue.push(InputEvent::CloseRequested);
        let drained: Vec<InputEvent> = queue.drain().collect();
        assert_eq!(drained[1], InputEvent::CloseRequested);
        assert!(queue.is_empty());
    }
}
