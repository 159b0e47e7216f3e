//! Property-based tests for the voice allocator.
//!
//! Random press/release sequences are replayed against both overflow
//! policies and the voice table invariants are checked after every event.

use polykey_synth::{Allocation, ButtonId, OverflowPolicy, VoiceAllocator};
use proptest::prelude::*;

const VOICES: usize = 4;
const KEYS: u8 = 12;

#[derive(Debug, Clone, Copy)]
enum KeyEvent {
    Press(u8, u8),
    Release(u8),
}

fn key_event() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        (0..KEYS, 0u8..4).prop_map(|(k, o)| KeyEvent::Press(k, o)),
        (0..KEYS).prop_map(KeyEvent::Release),
    ]
}

fn policy() -> impl Strategy<Value = OverflowPolicy> {
    prop_oneof![Just(OverflowPolicy::Drop), Just(OverflowPolicy::StealOldest)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Active voices never exceed the pool and no key holds two voices.
    #[test]
    fn table_invariants_hold(
        policy in policy(),
        events in prop::collection::vec(key_event(), 0..200),
    ) {
        let mut voices: VoiceAllocator<VOICES> = VoiceAllocator::with_policy(policy);
        for event in events {
            match event {
                KeyEvent::Press(k, o) => { voices.press(ButtonId::new(k), o, 48 + k); }
                KeyEvent::Release(k) => { voices.release(ButtonId::new(k)); }
            }

            prop_assert!(voices.active_count() <= VOICES);
            for key in 0..KEYS {
                let holders = voices
                    .voices()
                    .iter()
                    .filter(|v| v.button() == Some(ButtonId::new(key)))
                    .count();
                prop_assert!(holders <= 1, "key {} held by {} voices", key, holders);
            }
        }
    }

    /// Releasing a key frees exactly its own slot.
    #[test]
    fn release_touches_only_its_slot(
        policy in policy(),
        events in prop::collection::vec(key_event(), 0..100),
        released in 0..KEYS,
    ) {
        let mut voices: VoiceAllocator<VOICES> = VoiceAllocator::with_policy(policy);
        for event in events {
            match event {
                KeyEvent::Press(k, o) => { voices.press(ButtonId::new(k), o, 48 + k); }
                KeyEvent::Release(k) => { voices.release(ButtonId::new(k)); }
            }
        }

        let before = *voices.voices();
        let freed = voices.release(ButtonId::new(released));
        for (slot, (old, new)) in before.iter().zip(voices.voices()).enumerate() {
            if Some(slot) == freed.map(|v| v.index()) {
                prop_assert!(new.is_free());
                prop_assert_eq!(old.button(), Some(ButtonId::new(released)));
            } else {
                prop_assert_eq!(old, new);
            }
        }
    }

    /// Captured notes never change while a key is held.
    #[test]
    fn captured_note_is_stable(
        events in prop::collection::vec(key_event(), 0..200),
    ) {
        let mut voices: VoiceAllocator<VOICES> = VoiceAllocator::new();
        for event in events {
            let before = *voices.voices();
            match event {
                KeyEvent::Press(k, o) => {
                    let outcome = voices.press(ButtonId::new(k), o, 48 + 12 * o + k);
                    if let Allocation::AlreadySounding(v) = outcome {
                        prop_assert_eq!(before[v.index()], voices.voices()[v.index()]);
                    }
                }
                KeyEvent::Release(k) => { voices.release(ButtonId::new(k)); }
            }
            for (old, new) in before.iter().zip(voices.voices()) {
                if old.is_active() && new.button() == old.button() {
                    prop_assert_eq!(old.note(), new.note());
                    prop_assert_eq!(old.octave(), new.octave());
                }
            }
        }
    }

    /// The same event sequence always produces the same voice table.
    #[test]
    fn allocation_is_deterministic(
        policy in policy(),
        events in prop::collection::vec(key_event(), 0..100),
    ) {
        let replay = || {
            let mut voices: VoiceAllocator<VOICES> = VoiceAllocator::with_policy(policy);
            for event in &events {
                match *event {
                    KeyEvent::Press(k, o) => { voices.press(ButtonId::new(k), o, 48 + k); }
                    KeyEvent::Release(k) => { voices.release(ButtonId::new(k)); }
                }
            }
            *voices.voices()
        };
        prop_assert_eq!(replay(), replay());
    }
}
