//! Mouse reporting types and button arithmetic.
//!
//! A host enables at most one protocol (what gets reported) and one
//! transport (how it is framed on the wire) at a time.

use serde::{Deserialize, Serialize};

use crate::modifier::Modifier;

/// Mouse buttons, including the wheel pseudo-buttons and the legacy
/// "release" marker used by non-SGR transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
    Release,
}

impl MouseButton {
    /// Base button number as used by every transport.
    pub(crate) const fn number(self) -> u8 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Release => 3,
            MouseButton::WheelUp => 4,
            MouseButton::WheelDown => 5,
        }
    }

    pub const fn is_wheel(self) -> bool {
        matches!(self, MouseButton::WheelUp | MouseButton::WheelDown)
    }
}

/// What classes of mouse events the host asked to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseProtocol {
    /// Mode 9: button presses only.
    X10,
    /// Mode 1000: presses and releases.
    NormalTracking,
    /// Mode 1002: presses, releases, and drags.
    ButtonTracking,
    /// Mode 1003: every motion event.
    AnyEventTracking,
}

/// Wire framing for mouse reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseTransport {
    /// `CSI M Cb Cx Cy`, single bytes, coordinates clamped to 223.
    #[default]
    Default,
    /// Mode 1005: like Default but coordinates above 127 are UTF-8 encoded.
    Extended,
    /// Mode 1006: `CSI < b ; x ; y M|m` with decimal parameters.
    Sgr,
    /// Mode 1015: `CSI b+32 ; x ; y M` with decimal parameters.
    Urxvt,
    /// Mode 1016: SGR framing with pixel coordinates.
    SgrPixels,
}

/// What the mouse wheel generates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseWheelMode {
    /// Wheel events go through the mouse protocol + transport.
    #[default]
    Default,
    /// Wheel generates normal cursor key sequences (`CSI A`/`CSI B`).
    NormalCursorKeys,
    /// Wheel generates application cursor key sequences (`SS3 A`/`SS3 B`).
    ApplicationCursorKeys,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MouseEventType {
    Press,
    Drag,
    Release,
}

/// Grid position of a mouse event, 0-based; emitted 1-based on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellLocation {
    pub line: u32,
    pub column: u32,
}

impl CellLocation {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Pixel position of a mouse event; only the SGR-Pixels transport uses it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MousePixelPosition {
    pub x: u32,
    pub y: u32,
}

impl MousePixelPosition {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Modifier bits folded into the button byte: Shift 4, Alt 8, Control 16.
pub(crate) const fn modifier_bits(modifier: Modifier) -> u8 {
    let mut bits = 0;
    if modifier.shift() {
        bits |= 4;
    }
    if modifier.alt() {
        bits |= 8;
    }
    if modifier.control() {
        bits |= 16;
    }
    bits
}

/// X10-style button code: wheel buttons report as 64/65.
pub(crate) const fn button_x10(button: MouseButton) -> u8 {
    if button.is_wheel() {
        button.number() + 0x3c
    } else {
        button.number()
    }
}

/// Button code for legacy transports, where a release always reports 3.
pub(crate) const fn button_normal(button: MouseButton, event: MouseEventType) -> u8 {
    match event {
        MouseEventType::Release => 3,
        _ => button_x10(button),
    }
}
