//! Scripted input sequences for the simulator.
//!
//! A script is a TOML file listing timed events:
//!
//! ```toml
//! cycles = 60            # optional; defaults to the last event plus settle time
//!
//! [[events]]
//! at = 0
//! action = "pot"
//! pot = "octave"
//! value = 300
//!
//! [[events]]
//! at = 2
//! action = "press"
//! key = 0
//!
//! [[events]]
//! at = 20
//! action = "bounce"
//! key = 5
//! toggles = 3
//!
//! [[events]]
//! at = 30
//! action = "release"
//! key = 0
//! ```
//!
//! `at` is the cycle the event takes effect. A `bounce` makes the key's
//! contact chatter (inverting on alternate cycles) for `toggles` cycles, then
//! return to its scripted state.

use std::path::Path;

use anyhow::Context;
use polykey_core::{ADC_MID, ButtonId, NUM_BUTTONS, NUM_POTS};
use polykey_platform::{HardwareInputs, PotChannel, PotPins};
use serde::Deserialize;
use thiserror::Error;

/// Errors in a script's contents.
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    /// Event names a key the board does not have.
    #[error("event {index}: key {key} does not exist (board has {NUM_BUTTONS} keys)")]
    UnknownKey {
        /// Position of the event in the script.
        index: usize,
        /// Offending key.
        key: u8,
    },

    /// Bounce with no chatter.
    #[error("event {index}: bounce needs at least one toggle")]
    EmptyBounce {
        /// Position of the event in the script.
        index: usize,
    },
}

/// One timed input change.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ScriptEvent {
    /// Close a key's contact.
    Press {
        /// Cycle the event takes effect.
        at: u64,
        /// Key index.
        key: u8,
    },
    /// Open a key's contact.
    Release {
        /// Cycle the event takes effect.
        at: u64,
        /// Key index.
        key: u8,
    },
    /// Chatter a key's contact.
    Bounce {
        /// First chattering cycle.
        at: u64,
        /// Key index.
        key: u8,
        /// Number of chattering cycles.
        #[serde(default = "default_toggles")]
        toggles: u64,
    },
    /// Set a pot's raw converter value.
    Pot {
        /// Cycle the event takes effect.
        at: u64,
        /// Channel name.
        pot: PotChannel,
        /// Raw sample; values above the converter range are clamped.
        value: u16,
    },
}

fn default_toggles() -> u64 {
    4
}

impl ScriptEvent {
    /// Cycle the event takes effect.
    pub fn at(&self) -> u64 {
        match *self {
            ScriptEvent::Press { at, .. }
            | ScriptEvent::Release { at, .. }
            | ScriptEvent::Bounce { at, .. }
            | ScriptEvent::Pot { at, .. } => at,
        }
    }

    /// Last cycle the event influences.
    fn end(&self) -> u64 {
        match *self {
            ScriptEvent::Bounce { at, toggles, .. } => at.saturating_add(toggles),
            other => other.at(),
        }
    }

    fn key(&self) -> Option<u8> {
        match *self {
            ScriptEvent::Press { key, .. }
            | ScriptEvent::Release { key, .. }
            | ScriptEvent::Bounce { key, .. } => Some(key),
            ScriptEvent::Pot { .. } => None,
        }
    }
}

/// A parsed input script.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    /// Total cycles to run, if fixed by the script.
    pub cycles: Option<u64>,
    /// Events in file order.
    pub events: Vec<ScriptEvent>,
}

impl Script {
    /// Load and check a script file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script '{}'", path.display()))?;
        let script = Self::from_toml(&content)
            .with_context(|| format!("in script '{}'", path.display()))?;
        Ok(script)
    }

    /// Parse and check a script.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut script: Script = toml::from_str(content)?;
        script.check()?;
        // Stable: same-cycle events keep file order
        script.events.sort_by_key(ScriptEvent::at);
        Ok(script)
    }

    fn check(&self) -> Result<(), ScriptError> {
        for (index, event) in self.events.iter().enumerate() {
            if let Some(key) = event.key()
                && usize::from(key) >= NUM_BUTTONS
            {
                return Err(ScriptError::UnknownKey { index, key });
            }
            if let ScriptEvent::Bounce { toggles: 0, .. } = event {
                return Err(ScriptError::EmptyBounce { index });
            }
        }
        Ok(())
    }

    /// Number of cycles to run: the script's own count, or long enough for
    /// the last event to settle.
    pub fn duration(&self, settle: u64) -> u64 {
        self.cycles.unwrap_or_else(|| {
            self.events
                .iter()
                .map(|e| e.end().saturating_add(1))
                .max()
                .unwrap_or(0)
                .saturating_add(settle)
        })
    }

    /// Events taking effect on `cycle`.
    pub fn events_at(&self, cycle: u64) -> impl Iterator<Item = &ScriptEvent> + '_ {
        self.events.iter().filter(move |e| e.at() == cycle)
    }
}

/// Simulated board driven by script events.
#[derive(Debug, Clone)]
pub struct ScriptedInputs {
    keys: [bool; NUM_BUTTONS],
    /// `(first, end)` cycle range of chatter per key.
    chatter: [Option<(u64, u64)>; NUM_BUTTONS],
    pots: [u16; NUM_POTS],
    pins: PotPins,
    cycle: u64,
}

impl ScriptedInputs {
    /// A board at rest: keys open, pitch bend centered, other pots at zero.
    pub fn new(pins: PotPins) -> Self {
        let mut pots = [0; NUM_POTS];
        pots[PotChannel::PitchBend.index()] = ADC_MID;
        Self {
            keys: [false; NUM_BUTTONS],
            chatter: [None; NUM_BUTTONS],
            pots,
            pins,
            cycle: 0,
        }
    }

    /// Sets the cycle the next reads belong to.
    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }

    /// Applies one event.
    pub fn apply(&mut self, event: &ScriptEvent) {
        tracing::debug!(cycle = self.cycle, ?event, "script event");
        match *event {
            ScriptEvent::Press { key, .. } => self.set_key(key, true),
            ScriptEvent::Release { key, .. } => self.set_key(key, false),
            ScriptEvent::Bounce { at, key, toggles } => {
                if let Some(slot) = self.chatter.get_mut(usize::from(key)) {
                    *slot = Some((at, at.saturating_add(toggles)));
                }
            }
            ScriptEvent::Pot { pot, value, .. } => self.pots[pot.index()] = value,
        }
    }

    fn set_key(&mut self, key: u8, closed: bool) {
        if let Some(state) = self.keys.get_mut(usize::from(key)) {
            *state = closed;
        }
    }
}

impl HardwareInputs for ScriptedInputs {
    fn read_button(&mut self, button: ButtonId) -> bool {
        let index = button.index();
        let Some(&closed) = self.keys.get(index) else {
            return false;
        };
        match self.chatter[index] {
            Some((first, end)) if (first..end).contains(&self.cycle) => {
                // Inverted on the first chatter cycle and every other one after
                closed ^ ((self.cycle - first) % 2 == 0)
            }
            _ => closed,
        }
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        PotChannel::ALL
            .into_iter()
            .find(|&channel| self.pins.pin(channel) == pin)
            .map_or(0, |channel| self.pots[channel.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = r#"
[[events]]
at = 4
action = "release"
key = 0

[[events]]
at = 0
action = "press"
key = 0

[[events]]
at = 2
action = "pot"
pot = "pitch_bend"
value = 1023

[[events]]
at = 6
action = "bounce"
key = 3
"#;

    #[test]
    fn parses_and_orders_events() {
        let script = Script::from_toml(DEMO).unwrap();
        let order: Vec<u64> = script.events.iter().map(ScriptEvent::at).collect();
        assert_eq!(order, [0, 2, 4, 6]);
        assert_eq!(
            script.events[3],
            ScriptEvent::Bounce {
                at: 6,
                key: 3,
                toggles: 4
            }
        );
    }

    #[test]
    fn duration_covers_last_event() {
        let script = Script::from_toml(DEMO).unwrap();
        // Bounce ends at 10, plus one, plus settle
        assert_eq!(script.duration(6), 17);

        let fixed = Script::from_toml("cycles = 3").unwrap();
        assert_eq!(fixed.duration(6), 3);
        assert_eq!(Script::default().duration(6), 6);
    }

    #[test]
    fn duration_saturates_on_huge_cycles() {
        let script = Script::from_toml(
            "[[events]]\nat = 9223372036854775807\naction = \"bounce\"\nkey = 1\n\
             toggles = 9223372036854775807\n",
        )
        .unwrap();
        assert_eq!(script.duration(6), u64::MAX);
    }

    #[test]
    fn rejects_unknown_key() {
        let err = Script::from_toml("[[events]]\nat = 0\naction = \"press\"\nkey = 12\n")
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScriptError>(),
            Some(&ScriptError::UnknownKey { index: 0, key: 12 })
        );
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(Script::from_toml("[[events]]\nat = 0\naction = \"tap\"\nkey = 1\n").is_err());
    }

    #[test]
    fn bounce_inverts_alternate_cycles() {
        let mut inputs = ScriptedInputs::new(PotPins::default());
        inputs.apply(&ScriptEvent::Bounce {
            at: 10,
            key: 2,
            toggles: 3,
        });

        let key = ButtonId::new(2);
        let mut seen = Vec::new();
        for cycle in 9..14 {
            inputs.set_cycle(cycle);
            seen.push(inputs.read_button(key));
        }
        assert_eq!(seen, [false, true, false, true, false]);
    }

    #[test]
    fn pots_follow_pin_assignment() {
        let mut inputs = ScriptedInputs::new(PotPins::new(14, 15, 16, 17));
        inputs.apply(&ScriptEvent::Pot {
            at: 0,
            pot: PotChannel::Waveform,
            value: 700,
        });
        assert_eq!(inputs.read_analog(16), 700);
        assert_eq!(inputs.read_analog(15), ADC_MID);
        assert_eq!(inputs.read_analog(3), 0);
    }
}
