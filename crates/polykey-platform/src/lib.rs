//! Polykey Platform - input scanning and the control cycle
//!
//! This crate connects the physical controls of the instrument (a key matrix
//! and four potentiometers) to the voice allocator, and owns the state that
//! downstream collaborators observe.
//!
//! # Core Abstractions
//!
//! ## Hardware Boundary
//!
//! - [`HardwareInputs`] - Trait implemented by board support (or a simulator)
//! - [`PotChannel`] / [`PotPins`] - Logical pot names and their analog pins
//!
//! ## Cycle Components
//!
//! - [`InputScanner`] - Debounces keys and smooths pots
//! - [`ControlMapper`] - Turns smoothed pots into semantic parameters
//! - [`Engine`] - Runs scan → map → allocate once per cycle
//!
//! ## Observed State
//!
//! - [`StateStore`] - Button, pot, control and voice tables
//! - [`Snapshot`] - Owned copy of the store for consumers
//! - [`Report`] - Human-readable diagnostic dump of a snapshot
//!
//! # Ownership
//!
//! Each table has exactly one writer: the scanner writes buttons and pots,
//! the mapper writes control values, the allocator writes voices. Mutable
//! access to the store never leaves this crate; everything public is `&self`.
//!
//! # Cycle
//!
//! ```text
//!  HardwareInputs ──▶ InputScanner ──▶ ButtonTable ──────────────▶ VoiceAllocator
//!                          │                                          ▲
//!                          └──────▶ PotTable ──▶ ControlMapper ──▶ octave
//! ```
//!
//! # Example
//!
//! ```rust
//! use polykey_core::ButtonId;
//! use polykey_platform::{DeviceEngine, EngineSettings, HardwareInputs};
//! use polykey_synth::DeviceOctaveTable;
//!
//! struct Board { held: Option<ButtonId> }
//!
//! impl HardwareInputs for Board {
//!     fn read_button(&mut self, button: ButtonId) -> bool {
//!         self.held == Some(button)
//!     }
//!     fn read_analog(&mut self, _pin: u8) -> u16 {
//!         300
//!     }
//! }
//!
//! let mut engine = DeviceEngine::new(EngineSettings::default(), DeviceOctaveTable::default());
//! let mut board = Board { held: Some(ButtonId::new(4)) };
//! for _ in 0..10 {
//!     engine.cycle(&mut board);
//! }
//! assert_eq!(engine.store().voices().active_count(), 1);
//! println!("{}", engine.snapshot().report());
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for firmware builds.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! polykey-platform = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod engine;
pub mod mapper;
pub mod report;
pub mod scanner;
pub mod store;

pub use engine::{DeviceEngine, Engine, EngineSettings};
pub use mapper::{ControlMapper, MapperConfig};
pub use report::Report;
pub use scanner::{InputScanner, ScanConfig};
pub use store::{
    ButtonState, ButtonTable, ControlState, ControlValues, PotReading, PotTable, Snapshot,
    StateStore,
};

use polykey_core::{ButtonId, NUM_POTS};

/// Logical potentiometer channels.
///
/// # Example
///
/// ```rust
/// use polykey_platform::PotChannel;
///
/// assert_eq!(PotChannel::Octave.index(), 3);
/// assert_eq!(PotChannel::PitchBend.label(), "PITCHBEND");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PotChannel {
    /// Modulation depth.
    Modulation,
    /// Pitch bend, centered at rest.
    PitchBend,
    /// Waveform selection.
    Waveform,
    /// Octave selection.
    Octave,
}

impl PotChannel {
    /// All channels in table order.
    pub const ALL: [PotChannel; NUM_POTS] = [
        PotChannel::Modulation,
        PotChannel::PitchBend,
        PotChannel::Waveform,
        PotChannel::Octave,
    ];

    /// Position of this channel in pot tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PotChannel::Modulation => 0,
            PotChannel::PitchBend => 1,
            PotChannel::Waveform => 2,
            PotChannel::Octave => 3,
        }
    }

    /// Console label used by the diagnostic report.
    pub const fn label(self) -> &'static str {
        match self {
            PotChannel::Modulation => "MODULATION",
            PotChannel::PitchBend => "PITCHBEND",
            PotChannel::Waveform => "WAVEFORM",
            PotChannel::Octave => "OCTAVE",
        }
    }
}

/// Analog pin assignment for each pot channel.
///
/// ```rust
/// use polykey_platform::{PotChannel, PotPins};
///
/// let pins = PotPins::new(14, 15, 16, 17);
/// assert_eq!(pins.pin(PotChannel::Waveform), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotPins([u8; NUM_POTS]);

impl PotPins {
    /// Assigns a pin to each channel.
    pub const fn new(modulation: u8, pitch_bend: u8, waveform: u8, octave: u8) -> Self {
        Self([modulation, pitch_bend, waveform, octave])
    }

    /// Pin wired to a channel.
    #[inline]
    pub const fn pin(&self, channel: PotChannel) -> u8 {
        self.0[channel.index()]
    }
}

impl Default for PotPins {
    /// Channels on analog pins 0-3 in table order.
    fn default() -> Self {
        Self::new(0, 1, 2, 3)
    }
}

/// Trait for board-specific input implementations.
///
/// Implement this for the target board's GPIO/ADC drivers, or for a
/// simulator. The scanner calls it once per key and once per pot every
/// cycle, so implementations must not block.
///
/// # Thread Safety
///
/// The control loop is single-threaded; this trait does not require `Send`
/// or `Sync`.
///
/// # Example
///
/// ```rust
/// use polykey_core::ButtonId;
/// use polykey_platform::HardwareInputs;
///
/// struct Bench {
///     keys: [bool; 12],
///     pots: [u16; 4],
/// }
///
/// impl HardwareInputs for Bench {
///     fn read_button(&mut self, button: ButtonId) -> bool {
///         self.keys.get(button.index()).copied().unwrap_or(false)
///     }
///
///     fn read_analog(&mut self, pin: u8) -> u16 {
///         self.pots.get(pin as usize).copied().unwrap_or(0)
///     }
/// }
/// ```
pub trait HardwareInputs {
    /// Raw (undebounced) contact state of a key; `true` = closed.
    fn read_button(&mut self, button: ButtonId) -> bool;

    /// Raw converter sample of an analog pin.
    ///
    /// Values above [`ADC_MAX`](polykey_core::ADC_MAX) are accepted and
    /// clamped by the scanner.
    fn read_analog(&mut self, pin: u8) -> u16;
}

impl<H: HardwareInputs + ?Sized> HardwareInputs for &mut H {
    fn read_button(&mut self, button: ButtonId) -> bool {
        (**self).read_button(button)
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        (**self).read_analog(pin)
    }
}
