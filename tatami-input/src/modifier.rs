//! Keyboard modifier state.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bitmask over the four modifier keys a VT host cares about.
///
/// The numeric values match the xterm convention, so the mask can be
/// embedded directly into escape sequence parameters.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Modifier(u8);

impl Modifier {
    pub const NONE: Modifier = Modifier(0);
    pub const SHIFT: Modifier = Modifier(1);
    pub const ALT: Modifier = Modifier(2);
    pub const CONTROL: Modifier = Modifier(4);
    pub const META: Modifier = Modifier(8);

    /// Raw bitmask value.
    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn none(self) -> bool {
        self.0 == 0
    }

    pub const fn some(self) -> bool {
        self.0 != 0
    }

    pub const fn shift(self) -> bool {
        self.0 & Self::SHIFT.0 != 0
    }

    pub const fn alt(self) -> bool {
        self.0 & Self::ALT.0 != 0
    }

    pub const fn control(self) -> bool {
        self.0 & Self::CONTROL.0 != 0
    }

    pub const fn meta(self) -> bool {
        self.0 & Self::META.0 != 0
    }

    /// True if every flag in `other` is also set in `self`.
    pub const fn contains(self, other: Modifier) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of both masks.
    pub const fn with(self, other: Modifier) -> Modifier {
        Modifier(self.0 | other.0)
    }

    /// `self` with every flag in `other` removed.
    pub const fn without(self, other: Modifier) -> Modifier {
        Modifier(self.0 & !other.0)
    }

    /// CSI parameter for modified key sequences: `1 + bitmask`.
    ///
    /// E.g. Shift alone yields 2, as in `CSI 1;2 A`.
    pub const fn vt_parameter(self) -> u8 {
        1 + self.0
    }
}

impl BitOr for Modifier {
    type Output = Modifier;

    fn bitor(self, rhs: Modifier) -> Modifier {
        self.with(rhs)
    }
}

impl BitOrAssign for Modifier {
    fn bitor_assign(&mut self, rhs: Modifier) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.none() {
            return f.write_str("None");
        }
        let mut first = true;
        for (set, name) in [
            (self.shift(), "Shift"),
            (self.alt(), "Alt"),
            (self.control(), "Control"),
            (self.meta(), "Meta"),
        ] {
            if set {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
