//! Exponential smoothing for potentiometer readings.
//!
//! Pot wipers and cheap converters jitter by a few counts on every sample.
//! Fed straight into octave or waveform selection, that jitter makes the
//! selection flicker at band boundaries. [`PotSmoother`] is a one-pole
//! lowpass stepped once per scan cycle, working directly in converter
//! counts:
//!
//! ```text
//! y[n] = y[n-1] + a * (x[n] - y[n-1])      a = 1 - exp(-1 / (tau * rate))
//! ```
//!
//! The first sample after construction or [`reset`](PotSmoother::reset) is
//! taken as-is, so a pot resting at mid-travel does not ramp up from zero.

use libm::expf;

use crate::adc::{ADC_MAX, clamp_sample};

/// One-pole smoother for a single analog channel.
///
/// # Example
///
/// ```rust
/// use polykey_core::PotSmoother;
///
/// // 1 kHz scan, 20 ms time constant
/// let mut pot = PotSmoother::new(1000.0, 20.0);
/// assert_eq!(pot.update(300), 300);
///
/// let mut out = 300;
/// for _ in 0..100 {
///     out = pot.update(800);
/// }
/// assert!((795..=800).contains(&out));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotSmoother {
    /// Filter output in counts, `None` until the first sample.
    state: Option<f32>,
    /// Step coefficient; 1.0 passes samples straight through.
    coeff: f32,
}

impl PotSmoother {
    /// Creates a smoother stepped `update_rate_hz` times per second with a
    /// time constant of `time_constant_ms`.
    ///
    /// A time constant or rate of zero disables smoothing.
    pub fn new(update_rate_hz: f32, time_constant_ms: f32) -> Self {
        let steps = time_constant_ms * update_rate_hz / 1000.0;
        let coeff = if steps > 0.0 {
            1.0 - expf(-1.0 / steps)
        } else {
            1.0
        };
        Self { state: None, coeff }
    }

    /// Feeds one raw sample and returns the smoothed reading in counts.
    ///
    /// Samples above full scale are clamped before filtering.
    #[inline]
    pub fn update(&mut self, raw: u16) -> u16 {
        let x = f32::from(clamp_sample(raw));
        let y = match self.state {
            Some(y) => y + self.coeff * (x - y),
            None => x,
        };
        self.state = Some(y);
        (y + 0.5).clamp(0.0, f32::from(ADC_MAX)) as u16
    }

    /// Forgets the filter state; the next sample primes it again.
    pub fn reset(&mut self) {
        self.state = None;
    }
}
