//! Analog-to-digital converter range helpers.
//!
//! Potentiometers are sampled by a 10-bit converter, so every raw reading
//! lives in `0..=ADC_MAX`. Readings outside that range (a glitching driver,
//! a simulator feeding garbage) are clamped here and never reported as errors.

/// Full-scale value of a 10-bit converter sample.
pub const ADC_MAX: u16 = 1023;

/// Midpoint of the converter range, the rest position of a centered pot.
pub const ADC_MID: u16 = ADC_MAX / 2;

/// Clamps a raw converter sample to `0..=ADC_MAX`.
#[inline]
pub const fn clamp_sample(raw: u16) -> u16 {
    if raw > ADC_MAX { ADC_MAX } else { raw }
}

/// Maps a raw sample to the normalized range 0.0..=1.0.
///
/// ```rust
/// use polykey_core::{ADC_MAX, normalize_sample};
///
/// assert_eq!(normalize_sample(0), 0.0);
/// assert_eq!(normalize_sample(ADC_MAX), 1.0);
/// assert_eq!(normalize_sample(u16::MAX), 1.0);
/// ```
#[inline]
pub fn normalize_sample(raw: u16) -> f32 {
    clamp_sample(raw) as f32 / ADC_MAX as f32
}

/// Splits the converter range into `bands` equal bands and returns the band
/// containing `raw`.
///
/// Band `i` covers `[i * 1024 / bands, (i + 1) * 1024 / bands)`. The result
/// is always `< bands`; a `bands` of zero is treated as one band.
///
/// ```rust
/// use polykey_core::{ADC_MAX, bucket};
///
/// assert_eq!(bucket(0, 4), 0);
/// assert_eq!(bucket(255, 4), 0);
/// assert_eq!(bucket(256, 4), 1);
/// assert_eq!(bucket(ADC_MAX, 4), 3);
/// ```
#[inline]
pub const fn bucket(raw: u16, bands: u8) -> u8 {
    if bands <= 1 {
        return 0;
    }
    let span = ADC_MAX as u32 + 1;
    let band = clamp_sample(raw) as u32 * bands as u32 / span;
    if band >= bands as u32 {
        bands - 1
    } else {
        band as u8
    }
}
