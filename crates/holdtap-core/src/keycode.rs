use std::fmt;

/// HID keyboard usage id (usage page 0x07).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u8);

impl KeyCode {
    pub const NO: KeyCode = KeyCode(0x00);
    pub const A: KeyCode = KeyCode(0x04);
    pub const B: KeyCode = KeyCode(0x05);
    pub const C: KeyCode = KeyCode(0x06);
    pub const D: KeyCode = KeyCode(0x07);
    pub const E: KeyCode = KeyCode(0x08);
    pub const F: KeyCode = KeyCode(0x09);
    pub const G: KeyCode = KeyCode(0x0A);
    pub const H: KeyCode = KeyCode(0x0B);
    pub const I: KeyCode = KeyCode(0x0C);
    pub const J: KeyCode = KeyCode(0x0D);
    pub const K: KeyCode = KeyCode(0x0E);
    pub const L: KeyCode = KeyCode(0x0F);
    pub const M: KeyCode = KeyCode(0x10);
    pub const N: KeyCode = KeyCode(0x11);
    pub const O: KeyCode = KeyCode(0x12);
    pub const P: KeyCode = KeyCode(0x13);
    pub const Q: KeyCode = KeyCode(0x14);
    pub const R: KeyCode = KeyCode(0x15);
    pub const S: KeyCode = KeyCode(0x16);
    pub const T: KeyCode = KeyCode(0x17);
    pub const U: KeyCode = KeyCode(0x18);
    pub const V: KeyCode = KeyCode(0x19);
    pub const W: KeyCode = KeyCode(0x1A);
    pub const X: KeyCode = KeyCode(0x1B);
    pub const Y: KeyCode = KeyCode(0x1C);
    pub const Z: KeyCode = KeyCode(0x1D);
    pub const N1: KeyCode = KeyCode(0x1E);
    pub const N0: KeyCode = KeyCode(0x27);
    pub const ENTER: KeyCode = KeyCode(0x28);
    pub const ESCAPE: KeyCode = KeyCode(0x29);
    pub const BSPACE: KeyCode = KeyCode(0x2A);
    pub const TAB: KeyCode = KeyCode(0x2B);
    pub const SPACE: KeyCode = KeyCode(0x2C);
    pub const LCTRL: KeyCode = KeyCode(0xE0);
    pub const LSHIFT: KeyCode = KeyCode(0xE1);
    pub const LALT: KeyCode = KeyCode(0xE2);
    pub const LGUI: KeyCode = KeyCode(0xE3);
    pub const RCTRL: KeyCode = KeyCode(0xE4);
    pub const RSHIFT: KeyCode = KeyCode(0xE5);
    pub const RALT: KeyCode = KeyCode(0xE6);
    pub const RGUI: KeyCode = KeyCode(0xE7);

    /// Looks up a `KC_*` name (the prefix is optional, case-insensitive).
    pub fn from_name(name: &str) -> Option<KeyCode> {
        let name = name.trim();
        let bare = name
            .strip_prefix("KC_")
            .or_else(|| name.strip_prefix("kc_"))
            .unwrap_or(name);
        KEYCODE_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(bare))
            .map(|(_, code)| *code)
    }

    /// Short display name (first table entry for this code).
    pub fn name(self) -> Option<&'static str> {
        KEYCODE_NAMES
            .iter()
            .find(|(_, code)| *code == self)
            .map(|(n, _)| *n)
    }

    pub fn modifier(self) -> Option<Modifier> {
        Modifier::from_keycode(self)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(n) => f.write_str(n),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// The eight HID modifiers, in report bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    LCtrl,
    LShift,
    LAlt,
    LGui,
    RCtrl,
    RShift,
    RAlt,
    RGui,
}

impl Modifier {
    const ALL: [Modifier; 8] = [
        Modifier::LCtrl,
        Modifier::LShift,
        Modifier::LAlt,
        Modifier::LGui,
        Modifier::RCtrl,
        Modifier::RShift,
        Modifier::RAlt,
        Modifier::RGui,
    ];

    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn keycode(self) -> KeyCode {
        KeyCode(0xE0 + self as u8)
    }

    pub fn from_keycode(code: KeyCode) -> Option<Modifier> {
        match code.0 {
            0xE0..=0xE7 => Some(Self::ALL[(code.0 - 0xE0) as usize]),
            _ => None,
        }
    }

    /// Modifiers set in a report bitmask, lowest bit first.
    pub fn iter_bits(mask: u8) -> impl Iterator<Item = Modifier> {
        Self::ALL.into_iter().filter(move |m| mask & m.bit() != 0)
    }

    /// Parses the `XXX_T` mod-tap prefix (`CTL`, `LSFT`, `RALT`, ...).
    pub fn from_mod_tap_prefix(prefix: &str) -> Option<Modifier> {
        let m = match prefix.to_ascii_uppercase().as_str() {
            "CTL" | "LCTL" => Modifier::LCtrl,
            "SFT" | "LSFT" => Modifier::LShift,
            "ALT" | "LALT" | "OPT" | "LOPT" => Modifier::LAlt,
            "GUI" | "LGUI" | "CMD" | "LCMD" => Modifier::LGui,
            "RCTL" => Modifier::RCtrl,
            "RSFT" => Modifier::RShift,
            "RALT" | "ROPT" => Modifier::RAlt,
            "RGUI" | "RCMD" => Modifier::RGui,
            _ => return None,
        };
        Some(m)
    }
}

/// Key names accepted by the keymap parser. The first name listed for a
/// code is the one used for display.
pub const KEYCODE_NAMES: &[(&str, KeyCode)] = &[
    ("NO", KeyCode::NO),
    ("A", KeyCode::A),
    ("B", KeyCode::B),
    ("C", KeyCode::C),
    ("D", KeyCode::D),
    ("E", KeyCode::E),
    ("F", KeyCode::F),
    ("G", KeyCode::G),
    ("H", KeyCode::H),
    ("I", KeyCode::I),
    ("J", KeyCode::J),
    ("K", KeyCode::K),
    ("L", KeyCode::L),
    ("M", KeyCode::M),
    ("N", KeyCode::N),
    ("O", KeyCode::O),
    ("P", KeyCode::P),
    ("Q", KeyCode::Q),
    ("R", KeyCode::R),
    ("S", KeyCode::S),
    ("T", KeyCode::T),
    ("U", KeyCode::U),
    ("V", KeyCode::V),
    ("W", KeyCode::W),
    ("X", KeyCode::X),
    ("Y", KeyCode::Y),
    ("Z", KeyCode::Z),
    ("1", KeyCode::N1),
    ("2", KeyCode(0x1F)),
    ("3", KeyCode(0x20)),
    ("4", KeyCode(0x21)),
    ("5", KeyCode(0x22)),
    ("6", KeyCode(0x23)),
    ("7", KeyCode(0x24)),
    ("8", KeyCode(0x25)),
    ("9", KeyCode(0x26)),
    ("0", KeyCode::N0),
    ("ENT", KeyCode::ENTER),
    ("ENTER", KeyCode::ENTER),
    ("ESC", KeyCode::ESCAPE),
    ("ESCAPE", KeyCode::ESCAPE),
    ("BSPC", KeyCode::BSPACE),
    ("BACKSPACE", KeyCode::BSPACE),
    ("TAB", KeyCode::TAB),
    ("SPC", KeyCode::SPACE),
    ("SPACE", KeyCode::SPACE),
    ("MINS", KeyCode(0x2D)),
    ("EQL", KeyCode(0x2E)),
    ("LBRC", KeyCode(0x2F)),
    ("RBRC", KeyCode(0x30)),
    ("BSLS", KeyCode(0x31)),
    ("SCLN", KeyCode(0x33)),
    ("QUOT", KeyCode(0x34)),
    ("GRV", KeyCode(0x35)),
    ("COMM", KeyCode(0x36)),
    ("DOT", KeyCode(0x37)),
    ("SLSH", KeyCode(0x38)),
    ("CAPS", KeyCode(0x39)),
    ("F1", KeyCode(0x3A)),
    ("F2", KeyCode(0x3B)),
    ("F3", KeyCode(0x3C)),
    ("F4", KeyCode(0x3D)),
    ("F5", KeyCode(0x3E)),
    ("F6", KeyCode(0x3F)),
    ("F7", KeyCode(0x40)),
    ("F8", KeyCode(0x41)),
    ("F9", KeyCode(0x42)),
    ("F10", KeyCode(0x43)),
    ("F11", KeyCode(0x44)),
    ("F12", KeyCode(0x45)),
    ("INS", KeyCode(0x49)),
    ("HOME", KeyCode(0x4A)),
    ("PGUP", KeyCode(0x4B)),
    ("DEL", KeyCode(0x4C)),
    ("END", KeyCode(0x4D)),
    ("PGDN", KeyCode(0x4E)),
    ("RGHT", KeyCode(0x4F)),
    ("RIGHT", KeyCode(0x4F)),
    ("LEFT", KeyCode(0x50)),
    ("DOWN", KeyCode(0x51)),
    ("UP", KeyCode(0x52)),
    ("LCTL", KeyCode::LCTRL),
    ("LCTRL", KeyCode::LCTRL),
    ("LSFT", KeyCode::LSHIFT),
    ("LSHIFT", KeyCode::LSHIFT),
    ("LALT", KeyCode::LALT),
    ("LGUI", KeyCode::LGUI),
    ("RCTL", KeyCode::RCTRL),
    ("RCTRL", KeyCode::RCTRL),
    ("RSFT", KeyCode::RSHIFT),
    ("RSHIFT", KeyCode::RSHIFT),
    ("RALT", KeyCode::RALT),
    ("RGUI", KeyCode::RGUI),
];
