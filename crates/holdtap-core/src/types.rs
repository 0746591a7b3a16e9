use crate::keycode::{KeyCode, Modifier};
use std::fmt;

/// Layer index. Layer 0 is the default layer and is always active.
pub type LayerId = u8;

/// Row and column in the key matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for KeyPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

/// A physical press or release delivered by the scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub pos: KeyPos,
    pub edge: KeyEdge,
}

impl KeyEvent {
    pub const fn press(pos: KeyPos) -> Self {
        Self {
            pos,
            edge: KeyEdge::Down,
        }
    }

    pub const fn release(pos: KeyPos) -> Self {
        Self {
            pos,
            edge: KeyEdge::Up,
        }
    }
}

/// A single effect a key can have on the host-visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Plain HID key code.
    Key(KeyCode),
    /// Modifier held in the report's modifier byte.
    Modifier(Modifier),
    /// Momentary layer select.
    Layer(LayerId),
}

impl Action {
    /// Modifiers and layer selects change how other keys are interpreted,
    /// so their releases are held back while a tap-hold key is undecided.
    pub fn is_stateful(&self) -> bool {
        matches!(self, Action::Modifier(_) | Action::Layer(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Key(code) => write!(f, "{}", code),
            Action::Modifier(m) => write!(f, "{}", m.keycode()),
            Action::Layer(layer) => write!(f, "MO({})", layer),
        }
    }
}

/// What a position resolves to on a given layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// Nothing happens (`KC_NO`).
    None,
    /// Fall through to the next lower active layer.
    #[default]
    Transparent,
    /// Ordinary single-action key.
    Press(Action),
    /// Dual-action key decided by press duration.
    TapHold { tap: Action, hold: Action },
}
