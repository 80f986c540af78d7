//! Destination flags and routing mask constants
//!
//! A [`Destinations`] value is chosen at the call site and says where a single
//! message goes. The routing mask is a separate `u32` category tag that the
//! worker tests against the logger's enabled mask.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Every routing bit set.
pub const MASK_ALL: u32 = 0xffff_ffff;

/// Routing bit used by the default shorthand entry points.
pub const MASK_SYS: u32 = 0x0000_0001;

/// Bit set of output channels a message should be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destinations(u8);

impl Destinations {
    pub const NONE: Destinations = Destinations(0);
    pub const FILE: Destinations = Destinations(1);
    pub const DEBUGGER: Destinations = Destinations(2);
    pub const CONSOLE: Destinations = Destinations(4);
    pub const ALL: Destinations = Destinations(1 | 2 | 4);

    /// Build from raw bits; unknown bits are discarded.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Destinations(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Destinations) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Destinations) -> bool {
        self.0 & other.0 != 0
    }

    /// Single-flag destinations set in `self`, in write order (file, debugger, console).
    pub fn iter(self) -> impl Iterator<Item = Destinations> {
        [Self::FILE, Self::DEBUGGER, Self::CONSOLE]
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl BitOr for Destinations {
    type Output = Destinations;

    fn bitor(self, rhs: Self) -> Self::Output {
        Destinations(self.0 | rhs.0)
    }
}

impl BitOrAssign for Destinations {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Destinations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self
            .iter()
            .map(|flag| match flag {
                Destinations::FILE => "file",
                Destinations::DEBUGGER => "debugger",
                _ => "console",
            })
            .collect();
        f.write_str(&names.join("|"))
    }
}
