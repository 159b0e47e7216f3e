//! The scan, map, allocate cycle.
//!
//! [`Engine`] owns the scanner, the mapper, the octave table and the state
//! store. One call to [`Engine::cycle`] runs every stage exactly once:
//!
//! 1. **Scan** - debounce keys and smooth pots into the button and pot tables
//! 2. **Map** - turn smoothed pots into control values
//! 3. **Allocate** - free voices for released keys, then assign voices to
//!    pressed keys at the octave the mapper selected this cycle
//!
//! Releases are handled before presses so a key released and another pressed
//! in the same cycle can share the freed slot. Within each pass keys are
//! visited in ascending id order, so a cycle's outcome depends only on the
//! inputs it reads.

use polykey_core::{ButtonId, NUM_BUTTONS, NUM_OCTAVES, NUM_VOICES};
use polykey_synth::{OctaveTable, OverflowPolicy, VoiceAllocator};

use crate::HardwareInputs;
use crate::mapper::{ControlMapper, MapperConfig};
use crate::scanner::{InputScanner, ScanConfig};
use crate::store::{Snapshot, StateStore};

/// Everything an [`Engine`] needs besides its octave table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineSettings {
    /// Scanner timing and wiring.
    pub scan: ScanConfig,
    /// Pot mapping ranges.
    pub controls: MapperConfig,
    /// What a press does when every voice is busy.
    pub overflow: OverflowPolicy,
}

/// Engine sized for the production board: 4 voices, 12 keys, 4 octaves.
pub type DeviceEngine = Engine<NUM_VOICES, NUM_BUTTONS, NUM_OCTAVES>;

/// Runs the control cycle and owns its state.
///
/// # Type Parameters
///
/// - `V`: Number of voice slots
/// - `B`: Number of keys
/// - `O`: Number of octave rows
///
/// # Example
///
/// ```rust
/// use polykey_core::ButtonId;
/// use polykey_platform::{Engine, EngineSettings, HardwareInputs};
/// use polykey_synth::OctaveTable;
///
/// struct Held(u8);
/// impl HardwareInputs for Held {
///     fn read_button(&mut self, button: ButtonId) -> bool { button.raw() == self.0 }
///     fn read_analog(&mut self, _: u8) -> u16 { 0 }
/// }
///
/// let mut engine: Engine<2, 4, 1> =
///     Engine::new(EngineSettings::default(), OctaveTable::chromatic(60));
/// let mut board = Held(3);
/// for _ in 0..5 {
///     engine.cycle(&mut board);
/// }
///
/// let voice = engine.store().voices().voices()[0];
/// assert_eq!(voice.note(), Some(63));
/// ```
#[derive(Debug, Clone)]
pub struct Engine<const V: usize, const B: usize, const O: usize> {
    scanner: InputScanner<B>,
    mapper: ControlMapper,
    table: OctaveTable<O, B>,
    store: StateStore<V, B>,
}

impl<const V: usize, const B: usize, const O: usize> Engine<V, B, O> {
    /// Creates an engine with every key released and every voice free.
    pub fn new(settings: EngineSettings, table: OctaveTable<O, B>) -> Self {
        debug_assert!(O <= u8::MAX as usize, "octave rows are selected by u8");
        Self {
            scanner: InputScanner::new(&settings.scan),
            mapper: ControlMapper::new(settings.controls, O as u8),
            table,
            store: StateStore::new(
                settings.scan.pins,
                VoiceAllocator::with_policy(settings.overflow),
            ),
        }
    }

    /// Runs one scan, map, allocate cycle and returns the updated store.
    pub fn cycle<H>(&mut self, hw: &mut H) -> &StateStore<V, B>
    where
        H: HardwareInputs + ?Sized,
    {
        let (buttons, pots) = self.store.scanner_tables();
        self.scanner.scan(hw, buttons, pots);

        let (pots, controls) = self.store.mapper_tables();
        self.mapper.apply(pots, controls);

        let (buttons, controls, voices) = self.store.allocator_tables();
        for (button, state) in buttons.iter() {
            if state.falling_edge() {
                voices.release(button);
            }
        }

        let octave = controls.octave();
        for (button, state) in buttons.iter() {
            if state.rising_edge() {
                Self::press(&self.table, voices, button, octave);
            }
        }

        self.store.finish_cycle();
        &self.store
    }

    fn press(
        table: &OctaveTable<O, B>,
        voices: &mut VoiceAllocator<V>,
        button: ButtonId,
        octave: u8,
    ) {
        let Some(note) = table.note(octave, button) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(%button, octave, "no note mapped for key");
            return;
        };
        voices.press(button, octave, note);
    }

    /// Read access to the state store.
    pub fn store(&self) -> &StateStore<V, B> {
        &self.store
    }

    /// Owned copy of the state store.
    pub fn snapshot(&self) -> Snapshot<V, B> {
        self.store.snapshot()
    }

    /// Returns to the power-on state: keys released, voices free, cycle 0.
    pub fn reset(&mut self) {
        self.scanner.reset();
        self.store.reset();
    }
}
