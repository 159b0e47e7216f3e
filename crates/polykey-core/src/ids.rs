//! Strongly-typed table identifiers.
//!
//! Buttons and voices are both small integers on the device, which makes it
//! easy to index the voice table with a button number by accident. Each table
//! in polykey is indexed by its own id type; cross-indexing is a type error.
//!
//! ```rust
//! use polykey_core::{ButtonId, VoiceId};
//!
//! let key = ButtonId::new(3);
//! let slot = VoiceId::new(0);
//! assert_eq!(key.index(), 3);
//! assert_eq!(slot.index(), 0);
//! ```

use core::fmt;

/// Identifier of one physical key in the button matrix.
///
/// A `ButtonId` carries no bound of its own; tables check it against their
/// capacity in their accessors and return `None` for ids out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ButtonId(u8);

impl ButtonId {
    /// Creates a button id from its matrix position.
    #[inline]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the matrix position as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw matrix position.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Iterates the ids of a matrix with `count` buttons, in scan order.
    pub fn all(count: usize) -> impl Iterator<Item = ButtonId> {
        (0..count.min(u8::MAX as usize + 1)).map(|i| ButtonId(i as u8))
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one voice slot in the voice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VoiceId(u8);

impl VoiceId {
    /// Creates a voice id from its slot number.
    #[inline]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the slot number as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw slot number.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
