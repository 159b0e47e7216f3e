//! Voice slots.
//!
//! A voice is one physical sound-generation channel. Each slot is either
//! `Free` or `Active` with the key, octave and note it captured when the key
//! went down. The captured note never changes while the voice is active, so
//! turning the octave pot only affects later presses.

use polykey_core::{ButtonId, VoiceId};

use crate::octave_table::midi_to_freq;

/// The note a voice captured at key-press time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActiveNote {
    /// Key holding this voice.
    pub button: ButtonId,
    /// Octave row selected when the key went down.
    pub octave: u8,
    /// MIDI note looked up from the octave table.
    pub note: u8,
    /// Allocation order; lower is older.
    pub age: u64,
}

impl ActiveNote {
    /// Frequency of the captured note in Hz.
    #[inline]
    pub fn frequency(&self) -> f32 {
        midi_to_freq(self.note)
    }
}

/// State of one voice slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum VoiceState {
    /// Available for allocation.
    #[default]
    Free,
    /// Sounding a note for a held key.
    Active(ActiveNote),
}

/// One slot of the voice table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Voice {
    id: VoiceId,
    state: VoiceState,
}

impl Voice {
    /// Creates a free voice.
    pub const fn new(id: VoiceId) -> Self {
        Self {
            id,
            state: VoiceState::Free,
        }
    }

    /// Slot id.
    #[inline]
    pub const fn id(&self) -> VoiceId {
        self.id
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> VoiceState {
        self.state
    }

    /// Check if the voice is sounding.
    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active(_))
    }

    /// Check if the voice is available.
    #[inline]
    pub const fn is_free(&self) -> bool {
        !self.is_active()
    }

    /// The captured note, if active.
    #[inline]
    pub const fn active_note(&self) -> Option<&ActiveNote> {
        match &self.state {
            VoiceState::Active(note) => Some(note),
            VoiceState::Free => None,
        }
    }

    /// Key holding this voice, if active.
    #[inline]
    pub fn button(&self) -> Option<ButtonId> {
        self.active_note().map(|n| n.button)
    }

    /// Captured MIDI note, if active.
    #[inline]
    pub fn note(&self) -> Option<u8> {
        self.active_note().map(|n| n.note)
    }

    /// Captured octave row, if active.
    #[inline]
    pub fn octave(&self) -> Option<u8> {
        self.active_note().map(|n| n.octave)
    }

    /// Allocation age, if active.
    #[inline]
    pub fn age(&self) -> Option<u64> {
        self.active_note().map(|n| n.age)
    }

    pub(crate) fn start(&mut self, note: ActiveNote) {
        self.state = VoiceState::Active(note);
    }

    pub(crate) fn free(&mut self) {
        self.state = VoiceState::Free;
    }
}
