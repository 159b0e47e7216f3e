//! Diagnostic dump of a [`Snapshot`] in the device console layout.
//!
//! ```text
//! ==========
//! --BUTTONS-------
//! Button 0 : 1
//! ...
//! ---------
//! --VOICES-------
//! Voice 0 : button 0 octave 1 note 60 (C4)
//! Voice 1 : free
//! ...
//! ---------
//! --POTS----------
//! MODULATION (pin 0): 512
//! ...
//! ---------
//! --CONTROLS------
//! modulation : 0.50
//! ...
//! ---------
//! ==========
//! ```

use core::fmt;

use polykey_synth::{VoiceState, note_name};

use crate::store::Snapshot;

const FRAME: &str = "==========";
const SECTION_END: &str = "---------";

/// Borrowing [`Display`](fmt::Display) adapter over a snapshot.
///
/// Formatting only reads the snapshot, which is itself a detached copy of
/// the store, so printing a report can never change engine state.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a, const V: usize, const B: usize>(&'a Snapshot<V, B>);

impl<'a, const V: usize, const B: usize> Report<'a, V, B> {
    /// Wraps a snapshot for display.
    pub fn new(snapshot: &'a Snapshot<V, B>) -> Self {
        Self(snapshot)
    }
}

impl<const V: usize, const B: usize> Snapshot<V, B> {
    /// Diagnostic report of this snapshot.
    pub fn report(&self) -> Report<'_, V, B> {
        Report(self)
    }
}

impl<const V: usize, const B: usize> fmt::Display for Report<'_, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "{FRAME}")?;

        writeln!(f, "--BUTTONS-------")?;
        for (index, state) in snapshot.buttons.iter().enumerate() {
            writeln!(f, "Button {index} : {}", u8::from(state.current))?;
        }
        writeln!(f, "{SECTION_END}")?;

        writeln!(f, "--VOICES-------")?;
        for voice in &snapshot.voices {
            match voice.state() {
                VoiceState::Active(active) => writeln!(
                    f,
                    "Voice {} : button {} octave {} note {} ({})",
                    voice.id(),
                    active.button,
                    active.octave,
                    active.note,
                    note_name(active.note),
                )?,
                VoiceState::Free => writeln!(f, "Voice {} : free", voice.id())?,
            }
        }
        writeln!(f, "{SECTION_END}")?;

        writeln!(f, "--POTS----------")?;
        for (channel, reading) in snapshot.pots.iter() {
            writeln!(
                f,
                "{} (pin {}): {}",
                channel.label(),
                reading.pin,
                reading.smoothed
            )?;
        }
        writeln!(f, "{SECTION_END}")?;

        let controls = &snapshot.controls;
        writeln!(f, "--CONTROLS------")?;
        writeln!(f, "modulation : {:.2}", controls.modulation())?;
        writeln!(f, "pitch bend : {:+.2} st", controls.pitch_bend())?;
        writeln!(f, "waveform : {}", controls.waveform())?;
        writeln!(f, "octave : {}", controls.octave())?;
        writeln!(f, "{SECTION_END}")?;

        write!(f, "{FRAME}")
    }
}
