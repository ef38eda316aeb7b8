//! Abstract keys and their VT escape sequence mappings.
//!
//! Key encoding is a table lookup keyed by the key, the relevant key mode
//! (cursor keys and the numeric keypad track their own Normal/Application
//! mode) and whether a modifier is held.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modifier::Modifier;

/// Abstract keyboard key, independent of any windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    // function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,

    // cursor keys
    UpArrow,
    DownArrow,
    LeftArrow,
    RightArrow,

    // 6-key editing pad
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    // numeric keypad
    NumpadNumLock,
    NumpadDivide,
    NumpadMultiply,
    NumpadSubtract,
    NumpadCapsLock,
    NumpadAdd,
    NumpadDecimal,
    NumpadEnter,
    NumpadEqual,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Key::F1 => "F1",
            Key::F2 => "F2",
            Key::F3 => "F3",
            Key::F4 => "F4",
            Key::F5 => "F5",
            Key::F6 => "F6",
            Key::F7 => "F7",
            Key::F8 => "F8",
            Key::F9 => "F9",
            Key::F10 => "F10",
            Key::F11 => "F11",
            Key::F12 => "F12",
            Key::F13 => "F13",
            Key::F14 => "F14",
            Key::F15 => "F15",
            Key::F16 => "F16",
            Key::F17 => "F17",
            Key::F18 => "F18",
            Key::F19 => "F19",
            Key::F20 => "F20",
            Key::UpArrow => "UpArrow",
            Key::DownArrow => "DownArrow",
            Key::LeftArrow => "LeftArrow",
            Key::RightArrow => "RightArrow",
            Key::Insert => "Insert",
            Key::Delete => "Delete",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::NumpadNumLock => "Numpad_NumLock",
            Key::NumpadDivide => "Numpad_Divide",
            Key::NumpadMultiply => "Numpad_Multiply",
            Key::NumpadSubtract => "Numpad_Subtract",
            Key::NumpadCapsLock => "Numpad_CapsLock",
            Key::NumpadAdd => "Numpad_Add",
            Key::NumpadDecimal => "Numpad_Decimal",
            Key::NumpadEnter => "Numpad_Enter",
            Key::NumpadEqual => "Numpad_Equal",
            Key::Numpad0 => "Numpad_0",
            Key::Numpad1 => "Numpad_1",
            Key::Numpad2 => "Numpad_2",
            Key::Numpad3 => "Numpad_3",
            Key::Numpad4 => "Numpad_4",
            Key::Numpad5 => "Numpad_5",
            Key::Numpad6 => "Numpad_6",
            Key::Numpad7 => "Numpad_7",
            Key::Numpad8 => "Numpad_8",
            Key::Numpad9 => "Numpad_9",
        })
    }
}

/// Input mode for cursor keys (DECCKM) or the numeric keypad (DECPAM/DECPNM).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyMode {
    #[default]
    Normal,
    Application,
}

/// Shape of a modified key sequence; the virtual-terminal parameter is
/// spliced in as the second CSI parameter.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ModifiedKey {
    /// `CSI <code> ; <param> ~`
    Tilde(u8),
    /// `CSI 1 ; <param> <final>`
    Final(char),
}

impl ModifiedKey {
    pub(crate) fn encode(self, modifier: Modifier) -> String {
        let param = modifier.vt_parameter();
        match self {
            ModifiedKey::Tilde(code) => format!("\x1b[{};{}~", code, param),
            ModifiedKey::Final(ch) => format!("\x1b[1;{}{}", param, ch),
        }
    }
}

/// Mapping used when any modifier is held, regardless of key modes.
///
/// F1..F4 use the CSI form here (`CSI 1;P P..S`) rather than their
/// unmodified SS3 form, matching what xterm emits for modified PF keys.
pub(crate) fn modified_mapping(key: Key) -> Option<ModifiedKey> {
    use ModifiedKey::{Final, Tilde};
    Some(match key {
        Key::F1 => Final('P'),
        Key::F2 => Final('Q'),
        Key::F3 => Final('R'),
        Key::F4 => Final('S'),
        Key::F5 => Tilde(15),
        Key::F6 => Tilde(17),
        Key::F7 => Tilde(18),
        Key::F8 => Tilde(19),
        Key::F9 => Tilde(20),
        Key::F10 => Tilde(21),
        Key::F11 => Tilde(23),
        Key::F12 => Tilde(24),
        Key::F13 => Tilde(25),
        Key::F14 => Tilde(26),
        Key::F15 => Tilde(28),
        Key::F16 => Tilde(29),
        Key::F17 => Tilde(31),
        Key::F18 => Tilde(32),
        Key::F19 => Tilde(33),
        Key::F20 => Tilde(34),
        Key::UpArrow => Final('A'),
        Key::DownArrow => Final('B'),
        Key::RightArrow => Final('C'),
        Key::LeftArrow => Final('D'),
        Key::Insert => Tilde(2),
        Key::Delete => Tilde(3),
        Key::Home => Final('H'),
        Key::End => Final('F'),
        Key::PageUp => Tilde(5),
        Key::PageDown => Tilde(6),
        _ => return None,
    })
}

/// Unmodified mappings when both key modes are Normal.
pub(crate) fn standard_mapping(key: Key) -> Option<&'static str> {
    Some(match key {
        Key::UpArrow => "\x1b[A",
        Key::DownArrow => "\x1b[B",
        Key::RightArrow => "\x1b[C",
        Key::LeftArrow => "\x1b[D",
        Key::Insert => "\x1b[2~",
        Key::Delete => "\x1b[3~",
        Key::Home => "\x1b[H",
        Key::End => "\x1b[F",
        Key::PageUp => "\x1b[5~",
        Key::PageDown => "\x1b[6~",
        Key::F1 => "\x1bOP",
        Key::F2 => "\x1bOQ",
        Key::F3 => "\x1bOR",
        Key::F4 => "\x1bOS",
        Key::F5 => "\x1b[15~",
        Key::F6 => "\x1b[17~",
        Key::F7 => "\x1b[18~",
        Key::F8 => "\x1b[19~",
        Key::F9 => "\x1b[20~",
        Key::F10 => "\x1b[21~",
        Key::F11 => "\x1b[23~",
        Key::F12 => "\x1b[24~",
        Key::F13 => "\x1b[25~",
        Key::F14 => "\x1b[26~",
        Key::F15 => "\x1b[28~",
        Key::F16 => "\x1b[29~",
        Key::F17 => "\x1b[31~",
        Key::F18 => "\x1b[32~",
        Key::F19 => "\x1b[33~",
        Key::F20 => "\x1b[34~",
        _ => return None,
    })
}

/// Cursor key mappings in application mode (DECCKM set).
pub(crate) fn application_cursor_mapping(key: Key) -> Option<&'static str> {
    Some(match key {
        Key::UpArrow => "\x1bOA",
        Key::DownArrow => "\x1bOB",
        Key::RightArrow => "\x1bOC",
        Key::LeftArrow => "\x1bOD",
        Key::Home => "\x1bOH",
        Key::End => "\x1bOF",
        _ => return None,
    })
}

/// Numeric keypad mappings in application mode (DECPAM set).
pub(crate) fn application_keypad_mapping(key: Key) -> Option<&'static str> {
    Some(match key {
        Key::NumpadNumLock => "\x1bOP",
        Key::NumpadDivide => "\x1bOQ",
        Key::NumpadMultiply => "\x1bOQ",
        Key::NumpadSubtract => "\x1bOQ",
        Key::NumpadCapsLock => "\x1bOm",
        Key::NumpadAdd => "\x1bOl",
        Key::NumpadDecimal => "\x1bOn",
        Key::NumpadEnter => "\x1bOM",
        Key::NumpadEqual => "\x1bOX",
        Key::Numpad0 => "\x1bOp",
        Key::Numpad1 => "\x1bOq",
        Key::Numpad2 => "\x1bOr",
        Key::Numpad3 => "\x1bOs",
        Key::Numpad4 => "\x1bOt",
        Key::Numpad5 => "\x1bOu",
        Key::Numpad6 => "\x1bOv",
        Key::Numpad7 => "\x1bOw",
        Key::Numpad8 => "\x1bOx",
        Key::Numpad9 => "\x1bOy",
        Key::PageUp => "\x1b[5~",
        Key::PageDown => "\x1b[6~",
        _ => return None,
    })
}

/// Numeric keypad mappings in Normal (numeric) mode: plain ASCII.
///
/// NumLock and CapsLock have no numeric-mode emission.
pub(crate) fn numeric_keypad_mapping(key: Key) -> Option<&'static str> {
    Some(match key {
        Key::NumpadDivide => "/",
        Key::NumpadMultiply => "*",
        Key::NumpadSubtract => "-",
        Key::NumpadAdd => "+",
        Key::NumpadDecimal => ".",
        Key::NumpadEnter => "\r",
        Key::NumpadEqual => "=",
        Key::Numpad0 => "0",
        Key::Numpad1 => "1",
        Key::Numpad2 => "2",
        Key::Numpad3 => "3",
        Key::Numpad4 => "4",
        Key::Numpad5 => "5",
        Key::Numpad6 => "6",
        Key::Numpad7 => "7",
        Key::Numpad8 => "8",
        Key::Numpad9 => "9",
        _ => return None,
    })
}
