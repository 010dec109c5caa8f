//! Keyboard handling: one key per frame, translated into a client action

use macroquad::prelude::*;
use shared::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Move(Direction),
    /// Anything else; shown to the user but never sent
    Unknown(char),
}

/// Maps a typed character to an action. `q`, Ctrl+C and Ctrl+D quit, and
/// `wasd` move. Letters are matched case-insensitively.
pub fn translate_key(c: char) -> KeyAction {
    match c.to_ascii_lowercase() {
        'q' | '\u{3}' | '\u{4}' => KeyAction::Quit,
        'w' => KeyAction::Move(Direction::Up),
        'a' => KeyAction::Move(Direction::Left),
        's' => KeyAction::Move(Direction::Down),
        'd' => KeyAction::Move(Direction::Right),
        other => KeyAction::Unknown(other),
    }
}

/// Reads the first key pressed since the last frame and discards the rest,
/// so a held or mashed key produces at most one action per frame.
pub fn poll_key() -> Option<KeyAction> {
    if is_key_pressed(KeyCode::Escape) {
        clear_pending();
        return Some(KeyAction::Quit);
    }

    let action = get_char_pressed().map(translate_key);
    clear_pending();
    action
}

fn clear_pending() {
    while get_char_pressed().is_some() {}
}
