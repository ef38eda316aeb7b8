//! Input event encoding for terminal emulators.
//!
//! This crate translates high-level user input events into the byte
//! sequences a VT-style host expects:
//! - Character input with Alt/Control combining ("meta sends escape", C0 codes)
//! - Function, cursor and keypad keys under DEC application modes
//! - Mouse reporting across the X10, normal, button and any-event protocols
//!   and the legacy, UTF-8, SGR, URXVT and SGR-Pixels transports
//! - Bracketed paste framing and focus in/out events
//!
//! The encoder is deterministic: the same events under the same modes always
//! produce the same bytes. Generated bytes accumulate in an internal buffer
//! that the frontend drains with `peek`/`consume` before writing to the pty.

mod encoder;
mod key;
mod modifier;
mod mouse;

pub use encoder::{InputEncoder, PendingInput};
pub use key::{Key, KeyMode};
pub use modifier::Modifier;
pub use mouse::{
    CellLocation, MouseButton, MousePixelPosition, MouseProtocol, MouseTransport, MouseWheelMode,
};
