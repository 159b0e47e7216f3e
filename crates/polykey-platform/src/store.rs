//! The state store: tables written by the cycle and read by everyone else.
//!
//! [`StateStore`] groups the button table, pot table, semantic control values
//! and the voice allocator. Its public API is read-only; the `pub(crate)`
//! mutable accessors are used by [`Engine`](crate::Engine) to hand each table
//! to its single writer.
//!
//! Observers that need the state beyond a borrow (the audio collaborator,
//! the diagnostic dump, a test) take a [`Snapshot`], an owned `Copy` of every
//! table.

use polykey_core::{ButtonId, NUM_POTS};
use polykey_synth::{Voice, VoiceAllocator};

use crate::{PotChannel, PotPins};

/// Debounced state of one key for the current and previous cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ButtonState {
    /// Accepted state this cycle.
    pub current: bool,
    /// Accepted state last cycle.
    pub previous: bool,
}

impl ButtonState {
    /// Key went down this cycle.
    #[inline]
    pub const fn rising_edge(&self) -> bool {
        self.current && !self.previous
    }

    /// Key came up this cycle.
    #[inline]
    pub const fn falling_edge(&self) -> bool {
        !self.current && self.previous
    }
}

/// Debounced state of every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTable<const B: usize> {
    states: [ButtonState; B],
}

impl<const B: usize> ButtonTable<B> {
    /// Creates a table with every key released.
    pub fn new() -> Self {
        Self {
            states: [ButtonState::default(); B],
        }
    }

    /// State of one key, or `None` if the id is out of range.
    #[inline]
    pub fn get(&self, button: ButtonId) -> Option<ButtonState> {
        self.states.get(button.index()).copied()
    }

    /// True if the key is currently held (false for unknown ids).
    #[inline]
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.get(button).is_some_and(|s| s.current)
    }

    /// Number of held keys.
    pub fn pressed_count(&self) -> usize {
        self.states.iter().filter(|s| s.current).count()
    }

    /// Iterates `(id, state)` in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (ButtonId, ButtonState)> + '_ {
        ButtonId::all(B).zip(self.states.iter().copied())
    }

    /// Raw state array.
    pub fn states(&self) -> &[ButtonState; B] {
        &self.states
    }

    /// Records this cycle's accepted state, shifting the old one to `previous`.
    pub(crate) fn record(&mut self, button: ButtonId, current: bool) {
        if let Some(state) = self.states.get_mut(button.index()) {
            state.previous = state.current;
            state.current = current;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.states = [ButtonState::default(); B];
    }
}

impl<const B: usize> Default for ButtonTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// One pot's latest reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PotReading {
    /// Analog pin the pot is wired to.
    pub pin: u8,
    /// Last sample, clamped to the converter range.
    pub raw: u16,
    /// Smoothed value, rounded to converter counts.
    pub smoothed: u16,
}

/// Latest reading of every pot, indexed by [`PotChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotTable {
    readings: [PotReading; NUM_POTS],
}

impl PotTable {
    /// Creates a table of zero readings on the given pins.
    pub fn new(pins: PotPins) -> Self {
        Self {
            readings: PotChannel::ALL.map(|channel| PotReading {
                pin: pins.pin(channel),
                raw: 0,
                smoothed: 0,
            }),
        }
    }

    /// Reading of one channel.
    #[inline]
    pub fn get(&self, channel: PotChannel) -> PotReading {
        self.readings[channel.index()]
    }

    /// Smoothed value of one channel.
    #[inline]
    pub fn smoothed(&self, channel: PotChannel) -> u16 {
        self.readings[channel.index()].smoothed
    }

    /// Iterates `(channel, reading)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (PotChannel, PotReading)> + '_ {
        PotChannel::ALL.into_iter().zip(self.readings.iter().copied())
    }

    pub(crate) fn record(&mut self, channel: PotChannel, raw: u16, smoothed: u16) {
        let reading = &mut self.readings[channel.index()];
        reading.raw = raw;
        reading.smoothed = smoothed;
    }
}

impl Default for PotTable {
    fn default() -> Self {
        Self::new(PotPins::default())
    }
}

/// A control value with a flag telling whether it changed this cycle.
///
/// # Example
///
/// ```rust
/// use polykey_platform::ControlState;
///
/// let state = ControlState::new(3u8);
/// assert_eq!(state.value, 3);
/// assert!(!state.changed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlState<T> {
    /// Current value.
    pub value: T,
    /// True if `value` differs from the previous cycle.
    pub changed: bool,
}

impl<T: Copy + PartialEq> ControlState<T> {
    /// Creates a state with the given value (not marked as changed).
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }

    /// Sets this cycle's value, marking the state changed if it differs.
    #[inline]
    pub fn set(&mut self, value: T) {
        self.changed = self.value != value;
        self.value = value;
    }
}

/// Semantic control values produced by the [`ControlMapper`](crate::ControlMapper).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlValues {
    pub(crate) modulation: ControlState<f32>,
    pub(crate) pitch_bend: ControlState<f32>,
    pub(crate) waveform: ControlState<u8>,
    pub(crate) octave: ControlState<u8>,
}

impl ControlValues {
    /// Modulation depth, `0.0..=depth_max`.
    #[inline]
    pub fn modulation(&self) -> f32 {
        self.modulation.value
    }

    /// Pitch bend in semitones; exactly `0.0` inside the dead zone.
    #[inline]
    pub fn pitch_bend(&self) -> f32 {
        self.pitch_bend.value
    }

    /// Selected waveform index.
    #[inline]
    pub fn waveform(&self) -> u8 {
        self.waveform.value
    }

    /// Selected octave row.
    #[inline]
    pub fn octave(&self) -> u8 {
        self.octave.value
    }

    /// Full state (value and changed flag) of the modulation control.
    pub fn modulation_state(&self) -> ControlState<f32> {
        self.modulation
    }

    /// Full state of the pitch-bend control.
    pub fn pitch_bend_state(&self) -> ControlState<f32> {
        self.pitch_bend
    }

    /// Full state of the waveform control.
    pub fn waveform_state(&self) -> ControlState<u8> {
        self.waveform
    }

    /// Full state of the octave control.
    pub fn octave_state(&self) -> ControlState<u8> {
        self.octave
    }
}

impl Default for ControlValues {
    fn default() -> Self {
        Self {
            modulation: ControlState::new(0.0),
            pitch_bend: ControlState::new(0.0),
            waveform: ControlState::new(0),
            octave: ControlState::new(0),
        }
    }
}

/// Every table the cycle produces.
///
/// # Type Parameters
///
/// - `V`: Number of voice slots
/// - `B`: Number of keys
#[derive(Debug, Clone)]
pub struct StateStore<const V: usize, const B: usize> {
    buttons: ButtonTable<B>,
    pots: PotTable,
    controls: ControlValues,
    voices: VoiceAllocator<V>,
    cycle: u64,
}

impl<const V: usize, const B: usize> StateStore<V, B> {
    pub(crate) fn new(pins: PotPins, voices: VoiceAllocator<V>) -> Self {
        Self {
            buttons: ButtonTable::new(),
            pots: PotTable::new(pins),
            controls: ControlValues::default(),
            voices,
            cycle: 0,
        }
    }

    /// Button table (written by the scanner).
    pub fn buttons(&self) -> &ButtonTable<B> {
        &self.buttons
    }

    /// Pot table (written by the scanner).
    pub fn pots(&self) -> &PotTable {
        &self.pots
    }

    /// Semantic controls (written by the mapper).
    pub fn controls(&self) -> &ControlValues {
        &self.controls
    }

    /// Voice table (written by the allocator).
    pub fn voices(&self) -> &VoiceAllocator<V> {
        &self.voices
    }

    /// Number of completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Owned copy of every table.
    pub fn snapshot(&self) -> Snapshot<V, B> {
        Snapshot {
            cycle: self.cycle,
            buttons: *self.buttons.states(),
            voices: *self.voices.voices(),
            pots: self.pots,
            controls: self.controls,
        }
    }

    pub(crate) fn scanner_tables(&mut self) -> (&mut ButtonTable<B>, &mut PotTable) {
        (&mut self.buttons, &mut self.pots)
    }

    pub(crate) fn mapper_tables(&mut self) -> (&PotTable, &mut ControlValues) {
        (&self.pots, &mut self.controls)
    }

    pub(crate) fn allocator_tables(
        &mut self,
    ) -> (&ButtonTable<B>, &ControlValues, &mut VoiceAllocator<V>) {
        (&self.buttons, &self.controls, &mut self.voices)
    }

    pub(crate) fn finish_cycle(&mut self) {
        self.cycle += 1;
    }

    pub(crate) fn reset(&mut self) {
        self.buttons.clear();
        self.controls = ControlValues::default();
        self.voices.reset();
        self.cycle = 0;
    }
}

/// Owned copy of the state store at the end of a cycle.
///
/// This is what downstream consumers read. It cannot reach back into the
/// store, so reading it can never alter engine state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot<const V: usize, const B: usize> {
    /// Cycles completed when the snapshot was taken.
    pub cycle: u64,
    /// Button table.
    pub buttons: [ButtonState; B],
    /// Voice table.
    pub voices: [Voice; V],
    /// Pot readings.
    pub pots: PotTable,
    /// Semantic controls.
    pub controls: ControlValues,
}

impl<const V: usize, const B: usize> Snapshot<V, B> {
    /// Number of active voices.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Held state of one key (false for unknown ids).
    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.buttons.get(button.index()).is_some_and(|s| s.current)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PotTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(NUM_POTS))?;
        for (channel, reading) in self.iter() {
            map.serialize_entry(&channel, &reading)?;
        }
        map.end()
    }
}

// Derive cannot see through const-generic arrays, so the tables go out as
// sequences.
#[cfg(feature = "serde")]
impl<const V: usize, const B: usize> serde::Serialize for Snapshot<V, B> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Snapshot", 5)?;
        state.serialize_field("cycle", &self.cycle)?;
        state.serialize_field("buttons", &self.buttons[..])?;
        state.serialize_field("voices", &self.voices[..])?;
        state.serialize_field("pots", &self.pots)?;
        state.serialize_field("controls", &self.controls)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_record_order() {
        let mut table: ButtonTable<3> = ButtonTable::new();
        let key = ButtonId::new(1);

        table.record(key, true);
        assert!(table.get(key).unwrap().rising_edge());

        table.record(key, true);
        let held = table.get(key).unwrap();
        assert!(!held.rising_edge() && !held.falling_edge());

        table.record(key, false);
        assert!(table.get(key).unwrap().falling_edge());
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let mut table: ButtonTable<2> = ButtonTable::new();
        table.record(ButtonId::new(5), true);
        assert_eq!(table.get(ButtonId::new(5)), None);
        assert!(!table.is_pressed(ButtonId::new(5)));
        assert_eq!(table.pressed_count(), 0);
    }

    #[test]
    fn control_state_tracks_changes() {
        let mut state = ControlState::new(1u8);
        state.set(1);
        assert!(!state.changed);
        state.set(2);
        assert!(state.changed);
        state.set(2);
        assert!(!state.changed);
    }

    #[test]
    fn pot_table_keeps_pin_assignment() {
        let mut pots = PotTable::new(PotPins::new(7, 6, 5, 4));
        pots.record(PotChannel::Waveform, 900, 880);
        let reading = pots.get(PotChannel::Waveform);
        assert_eq!(reading.pin, 5);
        assert_eq!(reading.raw, 900);
        assert_eq!(pots.smoothed(PotChannel::Waveform), 880);
    }

    #[test]
    fn snapshot_is_detached_from_store() {
        let mut store: StateStore<2, 4> =
            StateStore::new(PotPins::default(), VoiceAllocator::new());
        let before = store.snapshot();

        store.scanner_tables().0.record(ButtonId::new(0), true);
        store.finish_cycle();

        assert!(!before.is_pressed(ButtonId::new(0)));
        assert_eq!(before.cycle, 0);
        assert!(store.snapshot().is_pressed(ButtonId::new(0)));
    }
}
