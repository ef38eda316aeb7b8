//! The input encoder: translates keyboard, mouse, focus and paste events
//! into the byte stream a VT host expects.
//!
//! All state lives behind one internal mutex; every operation holds it for
//! its full duration. Generated bytes accumulate in a pending buffer that
//! the frontend drains with [`InputEncoder::peek`] and
//! [`InputEncoder::consume`] before writing to the pty.

use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};

use crate::key::{self, Key, KeyMode};
use crate::modifier::Modifier;
use crate::mouse::{
    button_normal, button_x10, modifier_bits, CellLocation, MouseButton, MouseEventType,
    MousePixelPosition, MouseProtocol, MouseTransport, MouseWheelMode,
};

const PASTE_BEGIN: &[u8] = b"\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// Largest cell coordinate the single-byte Default transport can carry
/// (255 minus the +32 offset).
const LEGACY_COORD_MAX: u32 = 223;

#[derive(Debug)]
struct EncoderState {
    cursor_keys_mode: KeyMode,
    numpad_keys_mode: KeyMode,
    bracketed_paste: bool,
    generate_focus_events: bool,
    mouse_protocol: Option<MouseProtocol>,
    mouse_transport: MouseTransport,
    mouse_wheel_mode: MouseWheelMode,
    pending: Vec<u8>,
    consumed: usize,
    pressed_buttons: BTreeSet<MouseButton>,
    last_mouse_position: CellLocation,
    // Last emitted motion report, for suppressing duplicates.
    last_motion_report: Option<(CellLocation, u8)>,
}

impl Default for EncoderState {
    fn default() -> Self {
        Self {
            cursor_keys_mode: KeyMode::Normal,
            numpad_keys_mode: KeyMode::Normal,
            bracketed_paste: false,
            generate_focus_events: false,
            mouse_protocol: None,
            mouse_transport: MouseTransport::Default,
            mouse_wheel_mode: MouseWheelMode::Default,
            pending: Vec::new(),
            consumed: 0,
            pressed_buttons: BTreeSet::new(),
            last_mouse_position: CellLocation::default(),
            last_motion_report: None,
        }
    }
}

/// Encodes user input events into VT byte sequences.
///
/// The VT parser toggles the encoder's modes in response to host DECSET/DECRST
/// sequences (DECCKM, DECPAM/DECPNM, 2004, 1004, 9/1000/1002/1003,
/// 1005/1006/1015/1016); the UI frontend feeds events in and drains the
/// resulting bytes out.
#[derive(Debug, Default)]
pub struct InputEncoder {
    state: Mutex<EncoderState>,
}

/// Borrowed view over the encoder's unconsumed bytes.
///
/// The view holds the encoder's lock, so no bytes can be appended while it
/// is alive. Drop it (or call [`PendingInput::consume`]) before invoking any
/// other encoder operation; the lock is not reentrant.
pub struct PendingInput<'a> {
    guard: MutexGuard<'a, EncoderState>,
}

impl PendingInput<'_> {
    pub fn as_bytes(&self) -> &[u8] {
        &self.guard.pending[self.guard.consumed..]
    }

    pub fn len(&self) -> usize {
        self.guard.pending.len() - self.guard.consumed
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks `n` bytes as written out and releases the view.
    pub fn consume(mut self, n: usize) {
        self.guard.consume(n);
    }
}

impl Deref for PendingInput<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl InputEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, EncoderState> {
        self.state.lock().expect("input encoder mutex poisoned")
    }

    // --- mode setters -----------------------------------------------------

    /// Changes the input mode for cursor keys (DECCKM).
    pub fn set_cursor_keys_mode(&self, mode: KeyMode) {
        log::debug!("set cursor keys mode: {:?}", mode);
        self.lock().cursor_keys_mode = mode;
    }

    /// Changes the input mode for the numeric keypad (DECPAM/DECPNM).
    pub fn set_numpad_keys_mode(&self, mode: KeyMode) {
        log::debug!("set numpad keys mode: {:?}", mode);
        self.lock().numpad_keys_mode = mode;
    }

    pub fn set_application_keypad_mode(&self, enable: bool) {
        self.set_numpad_keys_mode(if enable {
            KeyMode::Application
        } else {
            KeyMode::Normal
        });
    }

    pub fn set_bracketed_paste(&self, enable: bool) {
        self.lock().bracketed_paste = enable;
    }

    pub fn set_generate_focus_events(&self, enable: bool) {
        self.lock().generate_focus_events = enable;
    }

    /// Enables or disables a mouse protocol. Enabling one replaces any
    /// previously active protocol and resets the wheel mode to Default.
    pub fn set_mouse_protocol(&self, protocol: MouseProtocol, enabled: bool) {
        log::debug!("set mouse protocol: {:?} enabled={}", protocol, enabled);
        let mut state = self.lock();
        if enabled {
            state.mouse_wheel_mode = MouseWheelMode::Default;
            state.mouse_protocol = Some(protocol);
        } else {
            state.mouse_protocol = None;
        }
    }

    pub fn set_mouse_transport(&self, transport: MouseTransport) {
        self.lock().mouse_transport = transport;
    }

    pub fn set_mouse_wheel_mode(&self, mode: MouseWheelMode) {
        self.lock().mouse_wheel_mode = mode;
    }

    // --- mode getters -----------------------------------------------------

    pub fn cursor_keys_mode(&self) -> KeyMode {
        self.lock().cursor_keys_mode
    }

    pub fn application_cursor_keys(&self) -> bool {
        self.lock().cursor_keys_mode == KeyMode::Application
    }

    pub fn application_keypad(&self) -> bool {
        self.lock().numpad_keys_mode == KeyMode::Application
    }

    pub fn bracketed_paste(&self) -> bool {
        self.lock().bracketed_paste
    }

    pub fn focus_events_enabled(&self) -> bool {
        self.lock().generate_focus_events
    }

    pub fn mouse_protocol(&self) -> Option<MouseProtocol> {
        self.lock().mouse_protocol
    }

    pub fn mouse_transport(&self) -> MouseTransport {
        self.lock().mouse_transport
    }

    pub fn mouse_wheel_mode(&self) -> MouseWheelMode {
        self.lock().mouse_wheel_mode
    }

    /// Buttons currently held down, in ascending order.
    pub fn currently_pressed_buttons(&self) -> Vec<MouseButton> {
        self.lock().pressed_buttons.iter().copied().collect()
    }

    /// Resets all modes, the pending buffer and the pressed-button set, as
    /// required by the RIS (hard reset) VT sequence. A reset encoder is
    /// indistinguishable from a freshly constructed one.
    pub fn reset(&self) {
        *self.lock() = EncoderState::default();
    }

    // --- event encoding ---------------------------------------------------

    /// Encodes a single character event. Returns `true` iff bytes were
    /// appended.
    pub fn generate_char(&self, ch: char, modifier: Modifier) -> bool {
        self.lock().generate_char(ch, modifier)
    }

    /// Encodes a string of character events with the same modifier.
    pub fn generate_str(&self, text: &str, modifier: Modifier) -> bool {
        let mut state = self.lock();
        let mut any = false;
        for ch in text.chars() {
            any |= state.generate_char(ch, modifier);
        }
        any
    }

    /// Encodes a function/cursor/keypad key event.
    pub fn generate_key(&self, key: Key, modifier: Modifier) -> bool {
        self.lock().generate_key(key, modifier)
    }

    /// Encodes pasted text, wrapped in bracketed-paste markers when the host
    /// enabled mode 2004. Any end marker embedded in the text is stripped so
    /// the paste cannot break out of the bracket.
    pub fn generate_paste(&self, text: &str) -> bool {
        self.lock().generate_paste(text)
    }

    pub fn generate_mouse_press(
        &self,
        modifier: Modifier,
        button: MouseButton,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        self.lock()
            .generate_mouse_press(modifier, button, position, pixel_position)
    }

    pub fn generate_mouse_release(
        &self,
        modifier: Modifier,
        button: MouseButton,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        self.lock()
            .generate_mouse_release(modifier, button, position, pixel_position)
    }

    pub fn generate_mouse_move(
        &self,
        modifier: Modifier,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        self.lock()
            .generate_mouse_move(modifier, position, pixel_position)
    }

    /// Emits `CSI I` when focus reporting is enabled.
    pub fn generate_focus_in(&self) -> bool {
        let mut state = self.lock();
        if state.generate_focus_events {
            state.append(b"\x1b[I");
            return true;
        }
        false
    }

    /// Emits `CSI O` when focus reporting is enabled.
    pub fn generate_focus_out(&self) -> bool {
        let mut state = self.lock();
        if state.generate_focus_events {
            state.append(b"\x1b[O");
            return true;
        }
        false
    }

    /// Appends raw bytes verbatim, usually VT reply sequences. Always
    /// succeeds.
    pub fn generate_raw(&self, raw: &[u8]) -> bool {
        self.lock().append(raw);
        true
    }

    // --- draining ---------------------------------------------------------

    /// Returns a view over the not-yet-consumed bytes.
    ///
    /// The view holds the internal lock; the contract is peek → write →
    /// consume, with nothing appended in between.
    pub fn peek(&self) -> PendingInput<'_> {
        PendingInput { guard: self.lock() }
    }

    /// Marks `n` peeked bytes as written out. Once everything is consumed
    /// the buffer is cleared and the drain pointer reset.
    pub fn consume(&self, n: usize) {
        self.lock().consume(n);
    }
}

impl EncoderState {
    fn append(&mut self, bytes: &[u8]) -> bool {
        self.pending.extend_from_slice(bytes);
        !bytes.is_empty()
    }

    fn append_byte(&mut self, byte: u8) -> bool {
        self.pending.push(byte);
        true
    }

    fn append_char(&mut self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.append(ch.encode_utf8(&mut buf).as_bytes())
    }

    fn consume(&mut self, n: usize) {
        debug_assert!(
            self.consumed + n <= self.pending.len(),
            "consumed more bytes than pending"
        );
        self.consumed = (self.consumed + n).min(self.pending.len());
        if self.consumed == self.pending.len() {
            self.consumed = 0;
            self.pending.clear();
        }
    }

    fn generate_char(&mut self, ch: char, modifier: Modifier) -> bool {
        // "Meta sends escape": Alt prefixes ESC before whatever follows.
        if modifier.alt() {
            self.append_byte(0x1b);
        }
        let effective = modifier.without(Modifier::ALT);

        // Backspace emits DEL; Ctrl+Backspace emits BS.
        if ch == '\u{8}' {
            return if effective.control() {
                self.append_byte(0x08)
            } else {
                self.append_byte(0x7f)
            };
        }

        if effective == Modifier::SHIFT && ch == '\t' {
            return self.append(b"\x1b[Z");
        }

        if effective.control() {
            // Pre-encoded C0 codes pass through.
            if (ch as u32) < 0x20 {
                return self.append_byte(ch as u8);
            }
            if ch == ' ' {
                return self.append_byte(0x00);
            }
            if ch.is_ascii_alphabetic() {
                return self.append_byte(ch.to_ascii_uppercase() as u8 - b'A' + 1);
            }
            // '[' '\' ']' '^' '_' map onto 0x1B..0x1F.
            if ('['..='_').contains(&ch) {
                return self.append_byte(ch as u8 - b'A' + 1);
            }
        }

        self.append_char(ch)
    }

    fn generate_key(&mut self, key: Key, modifier: Modifier) -> bool {
        if modifier.some() {
            if let Some(mapping) = key::modified_mapping(key) {
                return self.append(mapping.encode(modifier).as_bytes());
            }
        }

        if self.cursor_keys_mode == KeyMode::Application {
            if let Some(mapping) = key::application_cursor_mapping(key) {
                return self.append(mapping.as_bytes());
            }
        }

        if self.numpad_keys_mode == KeyMode::Application {
            if let Some(mapping) = key::application_keypad_mapping(key) {
                return self.append(mapping.as_bytes());
            }
        } else if let Some(mapping) = key::numeric_keypad_mapping(key) {
            return self.append(mapping.as_bytes());
        }

        if let Some(mapping) = key::standard_mapping(key) {
            return self.append(mapping.as_bytes());
        }

        log::trace!("dropping key event without mapping: {}", key);
        false
    }

    fn generate_paste(&mut self, text: &str) -> bool {
        log::debug!("pasting {} bytes", text.len());
        if self.bracketed_paste {
            self.append(PASTE_BEGIN);
            if text.contains(PASTE_END) {
                self.append(text.replace(PASTE_END, "").as_bytes());
            } else {
                self.append(text.as_bytes());
            }
            self.append(PASTE_END.as_bytes());
            true
        } else {
            self.append(text.as_bytes())
        }
    }

    fn generate_mouse_press(
        &mut self,
        modifier: Modifier,
        button: MouseButton,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        self.last_mouse_position = position;
        self.last_motion_report = None;

        if button.is_wheel() {
            match self.mouse_wheel_mode {
                MouseWheelMode::NormalCursorKeys => {
                    return match button {
                        MouseButton::WheelUp => self.append(b"\x1b[A"),
                        _ => self.append(b"\x1b[B"),
                    };
                }
                MouseWheelMode::ApplicationCursorKeys => {
                    return match button {
                        MouseButton::WheelUp => self.append(b"\x1bOA"),
                        _ => self.append(b"\x1bOB"),
                    };
                }
                MouseWheelMode::Default => {}
            }
        } else {
            self.pressed_buttons.insert(button);
        }

        self.generate_mouse(
            MouseEventType::Press,
            modifier,
            button,
            self.last_mouse_position,
            pixel_position,
        )
    }

    fn generate_mouse_release(
        &mut self,
        modifier: Modifier,
        button: MouseButton,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        self.last_mouse_position = position;
        self.last_motion_report = None;
        self.pressed_buttons.remove(&button);

        self.generate_mouse(
            MouseEventType::Release,
            modifier,
            button,
            self.last_mouse_position,
            pixel_position,
        )
    }

    fn generate_mouse_move(
        &mut self,
        modifier: Modifier,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        self.last_mouse_position = position;

        let Some(protocol) = self.mouse_protocol else {
            return false;
        };

        let buttons_pressed = !self.pressed_buttons.is_empty();
        let report = match protocol {
            MouseProtocol::ButtonTracking => buttons_pressed,
            MouseProtocol::AnyEventTracking => true,
            _ => false,
        };
        if !report {
            return false;
        }

        let button = self
            .pressed_buttons
            .iter()
            .next()
            .copied()
            .unwrap_or(MouseButton::Release);

        self.generate_mouse(
            MouseEventType::Drag,
            modifier,
            button,
            self.last_mouse_position,
            pixel_position,
        )
    }

    /// Computes the button byte for the active protocol/transport and
    /// forwards to the transport encoding. Returns `false` for events below
    /// the protocol's interest set and for suppressed duplicate motions.
    fn generate_mouse(
        &mut self,
        event: MouseEventType,
        modifier: Modifier,
        button: MouseButton,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        let Some(protocol) = self.mouse_protocol else {
            return false;
        };

        let interested = match protocol {
            MouseProtocol::X10 => event == MouseEventType::Press,
            MouseProtocol::NormalTracking => {
                matches!(event, MouseEventType::Press | MouseEventType::Release)
            }
            MouseProtocol::ButtonTracking | MouseProtocol::AnyEventTracking => true,
        };
        if !interested {
            log::trace!("dropping mouse {:?} below {:?} interest", event, protocol);
            return false;
        }

        // SGR transports keep the released button's own number; legacy
        // transports substitute 3 for any release.
        let sgr = matches!(
            self.mouse_transport,
            MouseTransport::Sgr | MouseTransport::SgrPixels
        );
        let base = if sgr || protocol == MouseProtocol::X10 {
            button_x10(button)
        } else {
            button_normal(button, event)
        };
        let drag_bit = if event == MouseEventType::Drag { 0x20 } else { 0 };
        let code = (base + drag_bit) | modifier_bits(modifier);

        if event == MouseEventType::Drag {
            if self.last_motion_report == Some((position, code)) {
                return false;
            }
            self.last_motion_report = Some((position, code));
        }

        self.emit_mouse_transport(event, code, position, pixel_position)
    }

    fn emit_mouse_transport(
        &mut self,
        event: MouseEventType,
        code: u8,
        position: CellLocation,
        pixel_position: MousePixelPosition,
    ) -> bool {
        // Wire coordinates are 1-based.
        let column = position.column + 1;
        let line = position.line + 1;

        match self.mouse_transport {
            MouseTransport::Default => {
                self.append(b"\x1b[M");
                self.append_byte(32 + code);
                self.append_byte((32 + column.min(LEGACY_COORD_MAX)) as u8);
                self.append_byte((32 + line.min(LEGACY_COORD_MAX)) as u8);
                true
            }
            MouseTransport::Extended => {
                self.append(b"\x1b[M");
                self.append_byte(32 + code);
                self.append_coord_utf8(32 + column);
                self.append_coord_utf8(32 + line);
                true
            }
            MouseTransport::Sgr => {
                let final_byte = match event {
                    MouseEventType::Release => 'm',
                    _ => 'M',
                };
                self.append(format!("\x1b[<{};{};{}{}", code, column, line, final_byte).as_bytes())
            }
            MouseTransport::SgrPixels => {
                let final_byte = match event {
                    MouseEventType::Release => 'm',
                    _ => 'M',
                };
                self.append(
                    format!(
                        "\x1b[<{};{};{}{}",
                        code, pixel_position.x, pixel_position.y, final_byte
                    )
                    .as_bytes(),
                )
            }
            MouseTransport::Urxvt => {
                self.append(format!("\x1b[{};{};{}M", code as u32 + 32, column, line).as_bytes())
            }
        }
    }

    /// Encodes one mouse coordinate for the Extended (mode 1005) transport:
    /// values up to 127 are single bytes, larger ones use UTF-8 framing.
    fn append_coord_utf8(&mut self, value: u32) {
        if value < 0x80 {
            self.append_byte(value as u8);
        } else if value < 0x800 {
            self.append_byte(0xc0 | (value >> 6) as u8);
            self.append_byte(0x80 | (value & 0x3f) as u8);
        } else {
            self.append_byte(0xe0 | (value >> 12) as u8);
            self.append_byte(0x80 | ((value >> 6) & 0x3f) as u8);
            self.append_byte(0x80 | (value & 0x3f) as u8);
        }
    }
}
