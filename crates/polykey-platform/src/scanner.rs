//! Input scanner: one pass over every key and pot per cycle.
//!
//! The scanner reads raw states through [`HardwareInputs`], debounces keys
//! with a [`Debouncer`] each, smooths pots with a [`PotSmoother`] each, and
//! records the results in the button and pot tables. It never touches the
//! voice table; the allocator reacts to the edges it leaves behind.

use polykey_core::{ButtonId, Debouncer, NUM_POTS, PotSmoother, clamp_sample};

use crate::store::{ButtonTable, PotTable};
use crate::{HardwareInputs, PotChannel, PotPins};

/// Scanner timing and wiring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Scan cycles per second.
    pub cycle_rate_hz: f32,
    /// Consecutive disagreeing samples before a key changes state.
    pub debounce_samples: u8,
    /// Pot smoothing time constant in milliseconds (0 disables).
    pub smoothing_ms: f32,
    /// Analog pin of each pot.
    pub pins: PotPins,
}

impl ScanConfig {
    /// Time a key must be stable before it is accepted, in milliseconds.
    pub fn debounce_window_ms(&self) -> f32 {
        if self.cycle_rate_hz <= 0.0 {
            return 0.0;
        }
        self.debounce_samples.max(1) as f32 * 1000.0 / self.cycle_rate_hz
    }
}

impl Default for ScanConfig {
    /// 1 kHz scan, 5 ms debounce, 20 ms pot smoothing.
    fn default() -> Self {
        Self {
            cycle_rate_hz: 1000.0,
            debounce_samples: 5,
            smoothing_ms: 20.0,
            pins: PotPins::default(),
        }
    }
}

/// Debouncing and smoothing front end for `B` keys and the four pots.
///
/// # Example
///
/// ```rust
/// use polykey_core::ButtonId;
/// use polykey_platform::{ButtonTable, HardwareInputs, InputScanner, PotTable, ScanConfig};
///
/// struct AllDown;
/// impl HardwareInputs for AllDown {
///     fn read_button(&mut self, _: ButtonId) -> bool { true }
///     fn read_analog(&mut self, _: u8) -> u16 { 0 }
/// }
///
/// let config = ScanConfig { debounce_samples: 2, ..ScanConfig::default() };
/// let mut scanner: InputScanner<8> = InputScanner::new(&config);
/// let mut buttons = ButtonTable::new();
/// let mut pots = PotTable::new(config.pins);
///
/// scanner.scan(&mut AllDown, &mut buttons, &mut pots);
/// assert_eq!(buttons.pressed_count(), 0);
/// scanner.scan(&mut AllDown, &mut buttons, &mut pots);
/// assert_eq!(buttons.pressed_count(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct InputScanner<const B: usize> {
    debouncers: [Debouncer; B],
    pots: [PotSmoother; NUM_POTS],
    pins: PotPins,
}

impl<const B: usize> InputScanner<B> {
    /// Creates a scanner with every key released.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            debouncers: [Debouncer::new(config.debounce_samples); B],
            pots: [PotSmoother::new(config.cycle_rate_hz, config.smoothing_ms); NUM_POTS],
            pins: config.pins,
        }
    }

    /// Reads every input once and records the filtered results.
    pub fn scan<H>(&mut self, hw: &mut H, buttons: &mut ButtonTable<B>, pots: &mut PotTable)
    where
        H: HardwareInputs + ?Sized,
    {
        for (button, debouncer) in ButtonId::all(B).zip(self.debouncers.iter_mut()) {
            let accepted = debouncer.update(hw.read_button(button));
            #[cfg(feature = "tracing")]
            if accepted != buttons.is_pressed(button) {
                tracing::trace!(%button, pressed = accepted, "key accepted");
            }
            buttons.record(button, accepted);
        }

        for channel in PotChannel::ALL {
            let pin = self.pins.pin(channel);
            let sample = hw.read_analog(pin);
            let raw = clamp_sample(sample);
            #[cfg(feature = "tracing")]
            if raw != sample {
                tracing::trace!(pin, sample, "analog sample clamped");
            }

            let smoothed = self.pots[channel.index()].update(raw);
            pots.record(channel, raw, smoothed);
        }
    }

    /// Returns every key to released and re-primes the pot smoothers.
    pub fn reset(&mut self) {
        for debouncer in &mut self.debouncers {
            debouncer.reset();
        }
        for pot in &mut self.pots {
            pot.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Board {
        keys: [bool; 4],
        pots: [u16; 4],
        reads: usize,
    }

    impl HardwareInputs for Board {
        fn read_button(&mut self, button: ButtonId) -> bool {
            self.reads += 1;
            self.keys[button.index()]
        }

        fn read_analog(&mut self, pin: u8) -> u16 {
            self.pots[pin as usize]
        }
    }

    fn board() -> Board {
        Board {
            keys: [false; 4],
            pots: [0; 4],
            reads: 0,
        }
    }

    #[test]
    fn every_key_is_read_once_per_scan() {
        let mut scanner: InputScanner<4> = InputScanner::new(&ScanConfig::default());
        let mut hw = board();
        let mut buttons = ButtonTable::new();
        let mut pots = PotTable::default();

        scanner.scan(&mut hw, &mut buttons, &mut pots);
        assert_eq!(hw.reads, 4);
    }

    #[test]
    fn key_needs_full_debounce_window() {
        let config = ScanConfig {
            debounce_samples: 3,
            ..ScanConfig::default()
        };
        let mut scanner: InputScanner<4> = InputScanner::new(&config);
        let mut hw = board();
        let mut buttons = ButtonTable::new();
        let mut pots = PotTable::default();

        hw.keys[2] = true;
        scanner.scan(&mut hw, &mut buttons, &mut pots);
        scanner.scan(&mut hw, &mut buttons, &mut pots);
        assert!(!buttons.is_pressed(ButtonId::new(2)));

        scanner.scan(&mut hw, &mut buttons, &mut pots);
        let state = buttons.get(ButtonId::new(2)).unwrap();
        assert!(state.current && state.rising_edge());
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let mut scanner: InputScanner<4> = InputScanner::new(&ScanConfig::default());
        let mut hw = board();
        hw.pots[PotChannel::Octave.index()] = 5000;
        let mut buttons = ButtonTable::new();
        let mut pots = PotTable::default();

        scanner.scan(&mut hw, &mut buttons, &mut pots);
        let reading = pots.get(PotChannel::Octave);
        assert_eq!(reading.raw, 1023);
        assert_eq!(reading.smoothed, 1023);
    }

    #[test]
    fn first_sample_primes_smoother() {
        let mut scanner: InputScanner<4> = InputScanner::new(&ScanConfig::default());
        let mut hw = board();
        hw.pots = [100, 200, 300, 400];
        let mut buttons = ButtonTable::new();
        let mut pots = PotTable::default();

        scanner.scan(&mut hw, &mut buttons, &mut pots);
        assert_eq!(pots.smoothed(PotChannel::Modulation), 100);
        assert_eq!(pots.smoothed(PotChannel::Octave), 400);

        // Later steps are smoothed, not immediate
        hw.pots[0] = 900;
        scanner.scan(&mut hw, &mut buttons, &mut pots);
        let smoothed = pots.smoothed(PotChannel::Modulation);
        assert!(smoothed > 100 && smoothed < 900, "got {smoothed}");
        assert_eq!(pots.get(PotChannel::Modulation).raw, 900);
    }

    #[test]
    fn reset_reprimes_smoothers() {
        let mut scanner: InputScanner<4> = InputScanner::new(&ScanConfig::default());
        let mut hw = board();
        let mut buttons = ButtonTable::new();
        let mut pots = PotTable::default();

        scanner.scan(&mut hw, &mut buttons, &mut pots);
        scanner.reset();
        hw.pots[PotChannel::Waveform.index()] = 800;
        scanner.scan(&mut hw, &mut buttons, &mut pots);
        assert_eq!(pots.smoothed(PotChannel::Waveform), 800);
    }

    #[test]
    fn pins_route_channels() {
        let config = ScanConfig {
            pins: PotPins::new(3, 2, 1, 0),
            ..ScanConfig::default()
        };
        let mut scanner: InputScanner<4> = InputScanner::new(&config);
        let mut hw = board();
        hw.pots = [10, 20, 30, 40];
        let mut buttons = ButtonTable::new();
        let mut pots = PotTable::new(config.pins);

        scanner.scan(&mut hw, &mut buttons, &mut pots);
        assert_eq!(pots.get(PotChannel::Modulation).raw, 40);
        assert_eq!(pots.get(PotChannel::Octave).raw, 10);
    }

    #[test]
    fn debounce_window_ms() {
        let config = ScanConfig::default();
        assert!((config.debounce_window_ms() - 5.0).abs() < 1e-6);
    }
}
