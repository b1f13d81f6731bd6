//! Raw per-frame input as delivered by the host.

use machinery_core::mode::Mode;
use serde::{Deserialize, Serialize};

/// Keys the dispatcher reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Number row digit.
    Digit(u8),
    /// Keypad digit.
    Numpad(u8),
    /// Rotate the held component.
    R,
}

impl Key {
    /// Mode bound to this key, if any.
    ///
    /// The number row follows [`Mode::from_hotkey`]. The keypad is laid out
    /// left to right: 1 Component, 2 Wire, 3 Pipe, 4 Selection, 5 Simulation.
    pub fn mode(self) -> Option<Mode> {
        match self {
            Key::Digit(d) => Mode::from_hotkey(d),
            Key::Numpad(1) => Some(Mode::ComponentPlacement),
            Key::Numpad(2) => Some(Mode::WirePlacement),
            Key::Numpad(3) => Some(Mode::PipePlacement),
            Key::Numpad(4) => Some(Mode::Selection),
            Key::Numpad(5) => Some(Mode::Simulation),
            Key::Numpad(_) | Key::R => None,
        }
    }
}

/// Everything the dispatcher needs from one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position in world units, if a pointer exists.
    pub pointer_world: Option<(f32, f32)>,
    /// Left button went down this frame.
    pub left_pressed: bool,
    /// Right button went down this frame.
    pub right_pressed: bool,
    /// Keys that went down this frame, in press order.
    pub keys_pressed: Vec<Key>,
    /// The pointer is over a UI element.
    pub pointer_over_ui: bool,
}

impl FrameInput {
    /// A frame with the pointer over the centre of cell (x, y).
    pub fn at_cell(x: i32, y: i32) -> Self {
        Self {
            pointer_world: Some((x as f32 + 0.5, y as f32 + 0.5)),
            ..Self::default()
        }
    }

    pub fn left_click(mut self) -> Self {
        self.left_pressed = true;
        self
    }

    pub fn right_click(mut self) -> Self {
        self.right_pressed = true;
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.keys_pressed.push(key);
        self
    }

    pub fn over_ui(mut self) -> Self {
        self.pointer_over_ui = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_row_and_keypad_bindings() {
        assert_eq!(Key::Digit(1).mode(), Some(Mode::Simulation));
        assert_eq!(Key::Digit(3).mode(), Some(Mode::WirePlacement));
        assert_eq!(Key::Numpad(1).mode(), Some(Mode::ComponentPlacement));
        assert_eq!(Key::Numpad(5).mode(), Some(Mode::Simulation));
        assert_eq!(Key::Digit(9).mode(), None);
        assert_eq!(Key::R.mode(), None);
    }

    #[test]
    fn frame_builder() {
        let f = FrameInput::at_cell(2, 3).left_click().key(Key::R);
        assert_eq!(f.pointer_world, Some((2.5, 3.5)));
        assert!(f.left_pressed);
        assert!(!f.right_pressed);
        assert_eq!(f.keys_pressed, vec![Key::R]);
    }
}
