// SPDX-License-Identifier: MIT
//
// Input event vocabulary.
//
// The full set of events a terminal application deals with: keys, text,
// paste, mouse, resize and focus changes. The event source in this crate
// only ever produces `Event::Text`: it hands raw input over as text and
// leaves decoding of key and mouse escape sequences to whoever sits above
// it. The other variants exist so hosts that do decode (or synthesize
// resize events from SIGWINCH) share one type.

use bitflags::bitflags;

/// Maximum number of raw input bytes behind a single [`Event::Text`].
///
/// One poll reads at most this many bytes. Longer input arrives as several
/// consecutive text events. The limit applies to the bytes read, not the
/// decoded string: each invalid byte decodes to U+FFFD, which takes three
/// bytes in UTF-8.
pub const TEXT_CAPACITY: usize = 63;

// ─── Event ───────────────────────────────────────────────────────────────────

/// A terminal input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A decoded key press.
    Key(KeyEvent),
    /// Raw input text, decoded from at most [`TEXT_CAPACITY`] input bytes.
    Text(String),
    /// Bracketed paste content.
    Paste(String),
    /// A mouse report.
    Mouse(MouseEvent),
    /// The terminal was resized to `width × height` cells.
    Resize { width: u16, height: u16 },
    /// The terminal window gained focus.
    FocusIn,
    /// The terminal window lost focus.
    FocusOut,
}

impl Event {
    /// The text payload of a `Text` or `Paste` event.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Paste(s) => Some(s),
            _ => None,
        }
    }
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A key with its active modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key pressed.
    pub code: KeyCode,
    /// Modifier keys held with it.
    pub modifiers: Modifiers,
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F35.
    F(u8),
}

bitflags! {
    /// Modifier keys held during a key or mouse event.
    ///
    /// Uses the xterm bitmask (`param = 1 + bitmask` on the wire).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        const SUPER = 0b0000_1000;
    }
}

// ─── Mouse ───────────────────────────────────────────────────────────────────

/// A mouse report: which button, where, and what happened to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// The button involved.
    pub button: MouseButton,
    /// 1-based column.
    pub x: i32,
    /// 1-based row.
    pub y: i32,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    /// What happened to the button.
    pub state: ButtonState,
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    /// Motion with no button held.
    None,
}

/// What the button did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Press,
    Release,
    Drag,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
