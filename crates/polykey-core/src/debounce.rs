//! Debouncing for mechanical key contacts.
//!
//! A key switch bounces for a few milliseconds when it closes or opens. The
//! scanner samples each key once per cycle, so a naive edge detector would
//! see several presses for one keystroke. [`Debouncer`] accepts a new state
//! only after the raw signal has disagreed with the accepted state for a
//! configured number of consecutive samples.
//!
//! ## Algorithm
//!
//! An integrating counter per key:
//!
//! ```text
//! raw == accepted  →  counter = 0
//! raw != accepted  →  counter += 1
//!                     counter == stable_samples  →  accepted = raw, counter = 0
//! ```
//!
//! Any sample that agrees with the accepted state restarts the count, so a
//! signal toggling faster than the window never changes the accepted state.
//!
//! ## Latency
//!
//! The accepted state lags the raw signal by exactly `stable_samples` scan
//! cycles. At a 1 kHz scan rate a window of 5 samples adds 5 ms, which keeps
//! key-to-voice latency well under the audible threshold.

/// Integrating debounce filter for one digital input.
///
/// # Example
///
/// ```rust
/// use polykey_core::Debouncer;
///
/// let mut key = Debouncer::new(2);
///
/// // Contact bounce: closed, open, closed...
/// assert!(!key.update(true));
/// assert!(!key.update(false));
/// assert!(!key.update(true));
/// // ...then settles closed.
/// assert!(key.update(true));
/// assert!(key.is_pressed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    /// Accepted (logical) state.
    state: bool,
    /// Consecutive samples that disagreed with `state`.
    counter: u8,
    /// Disagreeing samples required before `state` flips.
    stable_samples: u8,
}

impl Debouncer {
    /// Creates a released debouncer that needs `stable_samples` consecutive
    /// disagreeing samples to change state.
    ///
    /// A window of 0 or 1 accepts every change on the first sample.
    pub const fn new(stable_samples: u8) -> Self {
        Self {
            state: false,
            counter: 0,
            stable_samples,
        }
    }

    /// Feeds one raw sample and returns the accepted state.
    #[inline]
    pub fn update(&mut self, raw: bool) -> bool {
        if raw == self.state {
            self.counter = 0;
            return self.state;
        }

        self.counter = self.counter.saturating_add(1);
        if self.counter >= self.stable_samples.max(1) {
            self.state = raw;
            self.counter = 0;
        }
        self.state
    }

    /// Returns the accepted state without sampling.
    #[inline]
    pub const fn is_pressed(&self) -> bool {
        self.state
    }

    /// Returns to the released state and clears any count in progress.
    pub fn reset(&mut self) {
        self.state = false;
        self.counter = 0;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(5)
    }
}
