//! Polykey Synth - voice allocation for a polyphonic key instrument
//!
//! This crate decides *which* sound-generation voice plays *which* key. It
//! does not generate audio: the audio collaborator reads the voice table and
//! drives its oscillators from it.
//!
//! # Core Components
//!
//! ## Octave Table
//!
//! - [`OctaveTable`] - Fixed (octave, button) → MIDI note lookup
//! - [`midi_to_freq`] / [`note_name`] - Pitch helpers
//!
//! ```rust
//! use polykey_core::ButtonId;
//! use polykey_synth::OctaveTable;
//!
//! let table: OctaveTable<4, 12> = OctaveTable::chromatic(48);
//! assert_eq!(table.note(1, ButtonId::new(0)), Some(60)); // C4
//! ```
//!
//! ## Voice Allocation
//!
//! - [`VoiceAllocator`] - Fixed pool of voices assigned on key press
//! - [`Voice`] / [`VoiceState`] - One slot, `Free` or `Active`
//! - [`OverflowPolicy`] - What happens when every voice is busy
//! - [`Allocation`] - Outcome of a key press
//!
//! ```rust
//! use polykey_core::ButtonId;
//! use polykey_synth::{Allocation, VoiceAllocator};
//!
//! let mut voices: VoiceAllocator<4> = VoiceAllocator::new();
//! let outcome = voices.press(ButtonId::new(2), 1, 62);
//! assert!(matches!(outcome, Allocation::Assigned(_)));
//! assert_eq!(voices.active_count(), 1);
//!
//! voices.release(ButtonId::new(2));
//! assert_eq!(voices.active_count(), 0);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! polykey-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod allocator;
pub mod octave_table;
pub mod voice;

pub use allocator::{Allocation, OverflowPolicy, VoiceAllocator};
pub use octave_table::{DeviceOctaveTable, NoteName, OctaveTable, midi_to_freq, note_name};
pub use voice::{ActiveNote, Voice, VoiceState};

// Re-export the id types every caller of this crate needs
pub use polykey_core::{ButtonId, VoiceId};
