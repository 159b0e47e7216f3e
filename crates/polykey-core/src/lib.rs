//! Polykey Core - input primitives for a polyphonic key instrument
//!
//! This crate provides the foundational building blocks shared by every other
//! polykey crate, designed for a single-threaded control loop with zero
//! allocation on the scan path.
//!
//! # Core Abstractions
//!
//! ## Identifiers
//!
//! Tables are indexed by strongly-typed ids rather than raw integers:
//!
//! - [`ButtonId`] - One physical key of the button matrix
//! - [`VoiceId`] - One sound-generation voice slot
//!
//! ## Input Filtering
//!
//! - [`Debouncer`] - Integrating debounce filter for mechanical contacts
//! - [`PotSmoother`] - One-pole exponential smoothing for pot readings
//!
//! ## ADC Helpers
//!
//! - [`clamp_sample`] - Clamp a raw sample to the converter range
//! - [`normalize_sample`] - Map a raw sample to 0.0..=1.0
//! - [`bucket`] - Split the converter range into equal bands
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for firmware builds.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! polykey-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use polykey_core::{Debouncer, PotSmoother};
//!
//! let mut key = Debouncer::new(3);
//! assert!(!key.update(true));
//! assert!(!key.update(true));
//! assert!(key.update(true)); // accepted after three stable samples
//!
//! let mut pot = PotSmoother::new(1000.0, 10.0);
//! assert_eq!(pot.update(0), 0);
//! let next = pot.update(1023);
//! assert!(next > 0 && next < 1023);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod adc;
pub mod debounce;
pub mod ids;
pub mod smoothing;

pub use adc::{ADC_MAX, ADC_MID, bucket, clamp_sample, normalize_sample};
pub use debounce::Debouncer;
pub use ids::{ButtonId, VoiceId};
pub use smoothing::PotSmoother;

/// Number of sound-generation voices on the device.
pub const NUM_VOICES: usize = 4;

/// Number of keys in the button matrix (one chromatic octave).
pub const NUM_BUTTONS: usize = 12;

/// Number of rows in the octave table.
pub const NUM_OCTAVES: usize = 4;

/// Number of waveforms selectable from the waveform pot.
pub const NUM_WAVEFORMS: usize = 4;

/// Number of analog potentiometer channels.
pub const NUM_POTS: usize = 4;
