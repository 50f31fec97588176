//! Pointer and keyboard events delivered to the editor.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in device (on-screen pixel) coordinates, relative to the
/// page surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up,
    /// Pointer left the surface; finishes a session like `Up`.
    Leave,
}

impl PointerEvent {
    /// Device position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position } | PointerEvent::Move { position } => Some(*position),
            PointerEvent::Up | PointerEvent::Leave => None,
        }
    }
}

/// Keyboard key for the text capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextKey {
    Character(String),
    Backspace,
    Enter,
    Escape,
}

/// Tracks the primary button between events.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    /// Whether the primary button is held.
    pub is_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event, returning whether the button was held before.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        let was_pressed = self.is_pressed;
        match event {
            PointerEvent::Down { .. } => self.is_pressed = true,
            PointerEvent::Up | PointerEvent::Leave => self.is_pressed = false,
            PointerEvent::Move { .. } => {}
        }
        was_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_tracking() {
        let mut input = InputState::new();
        assert!(!input.handle_pointer_event(PointerEvent::Down {
            position: Point::new(5.0, 6.0),
        }));
        assert!(input.is_pressed);
        assert!(input.handle_pointer_event(PointerEvent::Move {
            position: Point::new(7.0, 8.0),
        }));
        assert!(input.handle_pointer_event(PointerEvent::Leave));
        assert!(!input.is_pressed);
        assert!(!input.handle_pointer_event(PointerEvent::Up));
    }
}
