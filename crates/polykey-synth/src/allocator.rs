//! Voice allocation for the key matrix.
//!
//! [`VoiceAllocator`] owns the voice table and is its only writer. It turns
//! debounced key edges into voice assignments:
//!
//! ```text
//!            press(b) & free slot            release(b)
//!   FREE ───────────────────────────▶ ACTIVE(b, octave) ──────────▶ FREE
//! ```
//!
//! When every slot is active a press is resolved by the [`OverflowPolicy`].
//! A key that already holds a voice is never given a second one: the
//! allocator looks the key up before it assigns, so two slots can never
//! claim the same key.

use polykey_core::{ButtonId, VoiceId};

use crate::voice::{ActiveNote, Voice};

/// What to do with a key press when every voice is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum OverflowPolicy {
    /// Ignore the new press; the voice table is unchanged (default)
    #[default]
    Drop,
    /// Reassign the voice that has been active the longest
    StealOldest,
}

/// Outcome of [`VoiceAllocator::press`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// A free voice now plays the key.
    Assigned(VoiceId),
    /// The oldest voice was taken from another key.
    Stolen {
        /// Voice now playing the key.
        voice: VoiceId,
        /// Note the voice was playing before.
        evicted: ActiveNote,
    },
    /// No voice was free and the policy dropped the press.
    Dropped,
    /// The key already holds this voice; nothing changed.
    AlreadySounding(VoiceId),
}

impl Allocation {
    /// Voice now playing the key, if any.
    pub fn voice(&self) -> Option<VoiceId> {
        match *self {
            Allocation::Assigned(voice)
            | Allocation::Stolen { voice, .. }
            | Allocation::AlreadySounding(voice) => Some(voice),
            Allocation::Dropped => None,
        }
    }
}

/// Fixed pool of voices assigned to held keys.
///
/// # Type Parameter
///
/// - `N`: Number of voice slots (at most 256)
///
/// # Example
///
/// ```rust
/// use polykey_core::{ButtonId, VoiceId};
/// use polykey_synth::{Allocation, OverflowPolicy, VoiceAllocator};
///
/// let mut voices: VoiceAllocator<2> = VoiceAllocator::with_policy(OverflowPolicy::StealOldest);
/// voices.press(ButtonId::new(0), 0, 48);
/// voices.press(ButtonId::new(1), 0, 49);
///
/// // Pool is full: the oldest voice (key 0) is reassigned
/// let outcome = voices.press(ButtonId::new(2), 0, 50);
/// assert!(matches!(outcome, Allocation::Stolen { voice, .. } if voice == VoiceId::new(0)));
/// assert_eq!(voices.voice_for(ButtonId::new(0)), None);
/// ```
#[derive(Debug, Clone)]
pub struct VoiceAllocator<const N: usize> {
    voices: [Voice; N],
    policy: OverflowPolicy,
    /// Global allocation counter
    age_counter: u64,
}

impl<const N: usize> VoiceAllocator<N> {
    /// Create an allocator with every voice free and the `Drop` policy.
    pub fn new() -> Self {
        Self::with_policy(OverflowPolicy::default())
    }

    /// Create an allocator with the given overflow policy.
    pub fn with_policy(policy: OverflowPolicy) -> Self {
        debug_assert!(N <= u8::MAX as usize + 1, "voice ids are u8");
        Self {
            voices: core::array::from_fn(|i| Voice::new(VoiceId::new(i as u8))),
            policy,
            age_counter: 0,
        }
    }

    /// Set the overflow policy. Active voices are unaffected.
    pub fn set_policy(&mut self, policy: OverflowPolicy) {
        self.policy = policy;
    }

    /// Get the overflow policy.
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Get number of active voices.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Get read access to the voice table.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Get one voice slot.
    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(id.index())
    }

    /// Find the voice held by a key.
    pub fn voice_for(&self, button: ButtonId) -> Option<VoiceId> {
        self.voices
            .iter()
            .find(|v| v.button() == Some(button))
            .map(|v| v.id())
    }

    /// Handle a key press edge.
    ///
    /// `octave` and `note` are captured into the voice and stay fixed until
    /// the key is released.
    pub fn press(&mut self, button: ButtonId, octave: u8, note: u8) -> Allocation {
        if let Some(voice) = self.voice_for(button) {
            return Allocation::AlreadySounding(voice);
        }

        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            let voice = self.start(idx, button, octave, note);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "button {button} pressed, playing [octave: {octave}, button: {button}, voice: {voice}] = {note}"
            );
            return Allocation::Assigned(voice);
        }

        match self.policy {
            OverflowPolicy::Drop => {
                #[cfg(feature = "tracing")]
                tracing::debug!("button {button} pressed, no free voice, press dropped");
                Allocation::Dropped
            }
            OverflowPolicy::StealOldest => {
                let Some(idx) = self.oldest_active() else {
                    return Allocation::Dropped;
                };
                let Some(evicted) = self.voices[idx].active_note().copied() else {
                    return Allocation::Dropped;
                };
                let voice = self.start(idx, button, octave, note);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "button {button} pressed, stole voice {voice} from button {}, now = {note}",
                    evicted.button
                );
                Allocation::Stolen { voice, evicted }
            }
        }
    }

    /// Handle a key release edge.
    ///
    /// Frees the voice held by the key and returns it. A key without a voice
    /// (its press was dropped, or its voice was stolen) is a no-op.
    pub fn release(&mut self, button: ButtonId) -> Option<VoiceId> {
        let voice = self.voice_for(button)?;
        self.voices[voice.index()].free();
        #[cfg(feature = "tracing")]
        tracing::debug!("button {button} released, voice {voice} free");
        Some(voice)
    }

    /// Free every voice.
    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            voice.free();
        }
    }

    /// Free every voice and restart the age counter.
    pub fn reset(&mut self) {
        self.release_all();
        self.age_counter = 0;
    }

    fn start(&mut self, idx: usize, button: ButtonId, octave: u8, note: u8) -> VoiceId {
        self.age_counter += 1;
        let voice = &mut self.voices[idx];
        voice.start(ActiveNote {
            button,
            octave,
            note,
            age: self.age_counter,
        });
        voice.id()
    }

    fn oldest_active(&self) -> Option<usize> {
        self.voices
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.age().map(|age| (i, age)))
            .min_by_key(|&(_, age)| age)
            .map(|(i, _)| i)
    }
}

impl<const N: usize> Default for VoiceAllocator<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(i: u8) -> ButtonId {
        ButtonId::new(i)
    }

    #[test]
    fn test_allocation_fills_lowest_free_slot() {
        let mut voices: VoiceAllocator<4> = VoiceAllocator::new();
        assert_eq!(voices.press(b(5), 0, 53), Allocation::Assigned(VoiceId::new(0)));
        assert_eq!(voices.press(b(2), 0, 50), Allocation::Assigned(VoiceId::new(1)));

        voices.release(b(5));
        assert_eq!(voices.press(b(9), 0, 57), Allocation::Assigned(VoiceId::new(0)));
    }

    #[test]
    fn test_repeated_press_does_not_double_allocate() {
        let mut voices: VoiceAllocator<4> = VoiceAllocator::new();
        let first = voices.press(b(3), 0, 51);
        let again = voices.press(b(3), 2, 75);
        assert_eq!(again, Allocation::AlreadySounding(first.voice().unwrap()));
        assert_eq!(voices.active_count(), 1);
        // Captured note is untouched by the second press
        assert_eq!(voices.voices()[0].note(), Some(51));
    }

    #[test]
    fn test_drop_policy_leaves_table_unchanged() {
        let mut voices: VoiceAllocator<2> = VoiceAllocator::new();
        voices.press(b(0), 0, 48);
        voices.press(b(1), 0, 49);
        let before = *voices.voices();

        assert_eq!(voices.press(b(2), 0, 50), Allocation::Dropped);
        assert_eq!(*voices.voices(), before);
    }

    #[test]
    fn test_steal_oldest_takes_earliest_press() {
        let mut voices: VoiceAllocator<3> =
            VoiceAllocator::with_policy(OverflowPolicy::StealOldest);
        voices.press(b(0), 0, 48);
        voices.press(b(1), 0, 49);
        voices.press(b(2), 0, 50);
        // Free and refill slot 0: key 3 is now the newest
        voices.release(b(0));
        voices.press(b(3), 0, 51);

        match voices.press(b(4), 0, 52) {
            Allocation::Stolen { voice, evicted } => {
                assert_eq!(voice, VoiceId::new(1));
                assert_eq!(evicted.button, b(1));
            }
            other => panic!("expected steal, got {other:?}"),
        }
        assert_eq!(voices.voice_for(b(4)), Some(VoiceId::new(1)));
        assert_eq!(voices.voice_for(b(1)), None);
    }

    #[test]
    fn test_release_of_stolen_key_is_noop() {
        let mut voices: VoiceAllocator<1> =
            VoiceAllocator::with_policy(OverflowPolicy::StealOldest);
        voices.press(b(0), 0, 48);
        voices.press(b(1), 0, 49);

        assert_eq!(voices.release(b(0)), None);
        assert_eq!(voices.voice_for(b(1)), Some(VoiceId::new(0)));
    }

    #[test]
    fn test_release_unknown_key_is_noop() {
        let mut voices: VoiceAllocator<4> = VoiceAllocator::new();
        assert_eq!(voices.release(b(7)), None);
    }

    #[test]
    fn test_reset_frees_everything() {
        let mut voices: VoiceAllocator<4> = VoiceAllocator::new();
        voices.press(b(0), 0, 48);
        voices.press(b(1), 0, 49);
        voices.reset();
        assert_eq!(voices.active_count(), 0);
        assert_eq!(voices.press(b(2), 0, 50), Allocation::Assigned(VoiceId::new(0)));
        assert_eq!(voices.voices()[0].age(), Some(1));
    }

    #[test]
    fn test_policy_switch_applies_to_next_overflow() {
        let mut voices: VoiceAllocator<1> = VoiceAllocator::new();
        voices.press(b(0), 0, 48);
        assert_eq!(voices.press(b(1), 0, 49), Allocation::Dropped);

        voices.set_policy(OverflowPolicy::StealOldest);
        assert_eq!(voices.policy(), OverflowPolicy::StealOldest);
        // The held voice survived the switch
        assert_eq!(voices.voice_for(b(0)), Some(VoiceId::new(0)));
        assert!(matches!(voices.press(b(1), 0, 49), Allocation::Stolen { .. }));
    }

    #[test]
    fn test_release_all_keeps_age_order() {
        let mut voices: VoiceAllocator<2> =
            VoiceAllocator::with_policy(OverflowPolicy::StealOldest);
        voices.press(b(0), 0, 48);
        voices.press(b(1), 0, 49);
        voices.release_all();
        assert_eq!(voices.active_count(), 0);

        // Ages keep counting, unlike reset
        voices.press(b(2), 0, 50);
        assert_eq!(voices.voices()[0].age(), Some(3));
    }

    #[test]
    fn test_zero_voice_pool_always_drops() {
        let mut voices: VoiceAllocator<0> =
            VoiceAllocator::with_policy(OverflowPolicy::StealOldest);
        assert_eq!(voices.press(b(0), 0, 48), Allocation::Dropped);
    }
}
