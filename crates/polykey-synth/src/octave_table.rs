//! Octave table: the fixed mapping from (octave, button) to a note.
//!
//! The keyboard has one octave of physical keys. The octave pot selects a
//! row of this table, and a key press captures `table[octave][button]` into
//! the allocated voice. The table is built once at start-up and never
//! written afterwards.

use core::fmt;

use polykey_core::{ButtonId, NUM_BUTTONS, NUM_OCTAVES};

/// Highest valid MIDI note number.
const MIDI_NOTE_MAX: u8 = 127;

/// Semitones per octave.
const SEMITONES: u8 = 12;

/// Octave table sized for the device keyboard.
pub type DeviceOctaveTable = OctaveTable<NUM_OCTAVES, NUM_BUTTONS>;

/// Fixed 2D lookup from (octave, button) to a MIDI note number.
///
/// # Type Parameters
///
/// - `OCTAVES`: Number of rows (selectable octaves)
/// - `BUTTONS`: Number of columns (physical keys)
///
/// # Example
///
/// ```rust
/// use polykey_core::ButtonId;
/// use polykey_synth::OctaveTable;
///
/// let table = OctaveTable::from_rows([[60, 62, 64], [72, 74, 76]]);
/// assert_eq!(table.note(0, ButtonId::new(2)), Some(64));
/// assert_eq!(table.note(1, ButtonId::new(0)), Some(72));
/// assert_eq!(table.note(2, ButtonId::new(0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctaveTable<const OCTAVES: usize, const BUTTONS: usize> {
    rows: [[u8; BUTTONS]; OCTAVES],
}

impl<const OCTAVES: usize, const BUTTONS: usize> OctaveTable<OCTAVES, BUTTONS> {
    /// Builds a table from explicit rows. Notes above 127 are clamped.
    pub fn from_rows(rows: [[u8; BUTTONS]; OCTAVES]) -> Self {
        let mut rows = rows;
        for note in rows.iter_mut().flatten() {
            *note = (*note).min(MIDI_NOTE_MAX);
        }
        Self { rows }
    }

    /// Builds a chromatic layout: button `b` of octave `o` plays
    /// `lowest_note + 12 * o + b`, saturating at MIDI note 127.
    pub fn chromatic(lowest_note: u8) -> Self {
        let rows = core::array::from_fn(|octave| {
            core::array::from_fn(|button| {
                let note = lowest_note as usize + octave * SEMITONES as usize + button;
                note.min(MIDI_NOTE_MAX as usize) as u8
            })
        });
        Self { rows }
    }

    /// Number of selectable octaves.
    #[inline]
    pub const fn octaves(&self) -> usize {
        OCTAVES
    }

    /// Number of keys per octave.
    #[inline]
    pub const fn buttons(&self) -> usize {
        BUTTONS
    }

    /// Looks up the note for a key in an octave.
    ///
    /// Returns `None` if either index is out of range.
    #[inline]
    pub fn note(&self, octave: u8, button: ButtonId) -> Option<u8> {
        self.rows
            .get(octave as usize)
            .and_then(|row| row.get(button.index()))
            .copied()
    }

    /// Looks up the frequency in Hz for a key in an octave.
    #[inline]
    pub fn frequency(&self, octave: u8, button: ButtonId) -> Option<f32> {
        self.note(octave, button).map(midi_to_freq)
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[[u8; BUTTONS]; OCTAVES] {
        &self.rows
    }
}

impl<const OCTAVES: usize, const BUTTONS: usize> Default for OctaveTable<OCTAVES, BUTTONS> {
    /// Chromatic layout starting at C3 (MIDI 48).
    fn default() -> Self {
        Self::chromatic(48)
    }
}

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (note as f32 - 69.0) / 12.0)
}

/// Scientific pitch name of a MIDI note (`60` → `C4`).
///
/// ```rust
/// use polykey_synth::note_name;
///
/// assert_eq!(note_name(60).to_string(), "C4");
/// assert_eq!(note_name(70).to_string(), "A#4");
/// assert_eq!(note_name(0).to_string(), "C-1");
/// ```
pub fn note_name(note: u8) -> NoteName {
    NoteName(note)
}

/// Display adapter returned by [`note_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteName(u8);

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let pitch_class = (self.0 % SEMITONES) as usize;
        let octave = (self.0 / SEMITONES) as i8 - 1;
        write!(f, "{}{}", NAMES[pitch_class], octave)
    }
}
