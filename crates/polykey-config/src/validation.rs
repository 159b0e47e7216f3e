//! Range and consistency checks for [`EngineConfig`].
//!
//! Every rule runs, so a config with several mistakes reports all of them at
//! once (wrapped in [`ValidationError::Multiple`]).
//!
//! # Example
//!
//! ```rust
//! use polykey_config::{EngineConfig, ValidationError, validate_config};
//!
//! let mut config = EngineConfig::default();
//! validate_config(&config).expect("factory config is valid");
//!
//! config.scan.debounce_samples = 40;
//! assert!(matches!(
//!     validate_config(&config),
//!     Err(ValidationError::InvalidValue { .. })
//! ));
//! ```

use polykey_core::{NUM_BUTTONS, NUM_OCTAVES};
use polykey_platform::{PotChannel, PotPins, ScanConfig};
use thiserror::Error;

use crate::engine_config::{ControlsSection, EngineConfig, KeyboardSection, PinsSection};

/// Longest debounce window the latency budget allows, in milliseconds.
pub const MAX_DEBOUNCE_WINDOW_MS: f32 = 10.0;

/// Highest MIDI note number.
pub const MIDI_NOTE_MAX: u8 = 127;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value out of range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field.
        field: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Value with the wrong shape or meaning.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// Two pots wired to the same analog pin.
    #[error("pin {pin} assigned to both '{first}' and '{second}'")]
    DuplicatePin {
        /// The shared pin.
        pin: u8,
        /// First channel using the pin.
        first: String,
        /// Second channel using the pin.
        second: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", join_errors(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    /// Flattens into the list of individual errors.
    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors,
            other => vec![other],
        }
    }

    fn from_errors(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

/// Checks every section of a configuration.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();
    // Pins are checked on their own
    validate_scan(&config.scan.to_scan_config(PotPins::default()), &mut errors);
    validate_controls(&config.controls, &mut errors);
    validate_keyboard(&config.keyboard, &mut errors);
    validate_pins(&config.pins, &mut errors);
    ValidationError::from_errors(errors)
}

fn check_range(errors: &mut Vec<ValidationError>, field: &str, value: f32, min: f32, max: f32) {
    // NaN fails both comparisons and is rejected too
    if !(value >= min && value <= max) {
        errors.push(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
}

fn validate_scan(scan: &ScanConfig, errors: &mut Vec<ValidationError>) {
    check_range(errors, "scan.cycle_rate_hz", scan.cycle_rate_hz, 100.0, 20_000.0);
    check_range(errors, "scan.smoothing_ms", scan.smoothing_ms, 0.0, 1000.0);

    if scan.debounce_samples == 0 {
        errors.push(ValidationError::InvalidValue {
            field: "scan.debounce_samples".to_string(),
            reason: "must be at least 1".to_string(),
        });
    } else {
        let window_ms = scan.debounce_window_ms();
        // NaN from a broken rate fails the comparison
        if !(window_ms <= MAX_DEBOUNCE_WINDOW_MS) {
            errors.push(ValidationError::InvalidValue {
                field: "scan.debounce_samples".to_string(),
                reason: format!(
                    "{} samples at {} Hz is a {window_ms:.1} ms window, over the \
                     {MAX_DEBOUNCE_WINDOW_MS} ms limit",
                    scan.debounce_samples, scan.cycle_rate_hz
                ),
            });
        }
    }
}

fn validate_controls(controls: &ControlsSection, errors: &mut Vec<ValidationError>) {
    check_range(errors, "controls.modulation_depth_max", controls.modulation_depth_max, 0.0, 1.0);
    check_range(errors, "controls.bend_range_semitones", controls.bend_range_semitones, 0.0, 24.0);
    check_range(
        errors,
        "controls.bend_dead_zone",
        f32::from(controls.bend_dead_zone),
        0.0,
        256.0,
    );
    check_range(errors, "controls.waveform_count", f32::from(controls.waveform_count), 1.0, 16.0);
}

fn validate_keyboard(keyboard: &KeyboardSection, errors: &mut Vec<ValidationError>) {
    let Some(rows) = &keyboard.rows else {
        // Chromatic layout: the top key of the top octave must be a MIDI note
        let span = (NUM_OCTAVES - 1) * 12 + (NUM_BUTTONS - 1);
        let max_lowest = usize::from(MIDI_NOTE_MAX) - span;
        check_range(
            errors,
            "keyboard.lowest_note",
            f32::from(keyboard.lowest_note),
            0.0,
            max_lowest as f32,
        );
        return;
    };

    if rows.len() != NUM_OCTAVES {
        errors.push(ValidationError::InvalidValue {
            field: "keyboard.rows".to_string(),
            reason: format!("expected {NUM_OCTAVES} rows, found {}", rows.len()),
        });
    }
    for (octave, row) in rows.iter().enumerate() {
        if row.len() != NUM_BUTTONS {
            errors.push(ValidationError::InvalidValue {
                field: format!("keyboard.rows[{octave}]"),
                reason: format!("expected {NUM_BUTTONS} notes, found {}", row.len()),
            });
        }
        if let Some(&note) = row.iter().find(|&&n| n > MIDI_NOTE_MAX) {
            errors.push(ValidationError::OutOfRange {
                field: format!("keyboard.rows[{octave}]"),
                value: f32::from(note),
                min: 0.0,
                max: f32::from(MIDI_NOTE_MAX),
            });
        }
    }
}

fn validate_pins(pins: &PinsSection, errors: &mut Vec<ValidationError>) {
    let assigned: Vec<(PotChannel, u8)> = PotChannel::ALL
        .into_iter()
        .map(|channel| (channel, pins.pin(channel)))
        .collect();

    for (i, &(first, pin)) in assigned.iter().enumerate() {
        if let Some(&(second, _)) = assigned[i + 1..].iter().find(|&&(_, p)| p == pin) {
            errors.push(ValidationError::DuplicatePin {
                pin,
                first: PinsSection::field_name(first).to_string(),
                second: PinsSection::field_name(second).to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_of(config: &EngineConfig) -> Vec<ValidationError> {
        validate_config(config).err().map(ValidationError::into_errors).unwrap_or_default()
    }

    #[test]
    fn factory_config_is_valid() {
        assert_eq!(validate_config(&EngineConfig::default()), Ok(()));
    }

    #[test]
    fn debounce_window_over_budget_is_rejected() {
        let mut config = EngineConfig::default();
        config.scan.cycle_rate_hz = 1000.0;
        config.scan.debounce_samples = 11;
        let errors = errors_of(&config);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "invalid value for 'scan.debounce_samples': 11 samples at 1000 Hz is a 11.0 ms \
             window, over the 10 ms limit"
        );

        // Exactly at the limit is allowed
        config.scan.debounce_samples = 10;
        assert_eq!(validate_config(&config), Ok(()));

        // Same count at a faster rate fits the window
        config.scan.debounce_samples = 11;
        config.scan.cycle_rate_hz = 2000.0;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn zero_debounce_is_invalid() {
        let mut config = EngineConfig::default();
        config.scan.debounce_samples = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { field, .. }) if field == "scan.debounce_samples"
        ));
    }

    #[test]
    fn nan_is_out_of_range() {
        let mut config = EngineConfig::default();
        config.controls.bend_range_semitones = f32::NAN;
        assert_eq!(errors_of(&config).len(), 1);
    }

    #[test]
    fn all_errors_are_reported() {
        let mut config = EngineConfig::default();
        config.controls.waveform_count = 0;
        config.controls.modulation_depth_max = 2.0;
        config.keyboard.lowest_note = 120;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(&err, ValidationError::Multiple(errors) if errors.len() == 3));
        assert!(err.to_string().starts_with("multiple validation errors: "));
    }

    #[test]
    fn chromatic_range_tops_out_at_midi_127() {
        let mut config = EngineConfig::default();
        config.keyboard.lowest_note = 80;
        assert_eq!(validate_config(&config), Ok(()));
        config.keyboard.lowest_note = 81;
        assert_eq!(errors_of(&config).len(), 1);
    }

    #[test]
    fn explicit_rows_need_device_shape() {
        let mut config = EngineConfig::default();
        config.keyboard.rows = Some(vec![vec![60; NUM_BUTTONS]; 3]);
        let errors = errors_of(&config);
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidValue { field, .. } if field == "keyboard.rows"
        ));

        let mut rows = vec![vec![60; NUM_BUTTONS]; NUM_OCTAVES];
        rows[2].pop();
        rows[3][0] = 200;
        config.keyboard.rows = Some(rows);
        let errors = errors_of(&config);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn duplicate_pins_are_named() {
        let mut config = EngineConfig::default();
        config.pins.octave = config.pins.modulation;
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicatePin {
                pin: 0,
                first: "modulation".to_string(),
                second: "octave".to_string(),
            }
        );
        assert_eq!(err.to_string(), "pin 0 assigned to both 'modulation' and 'octave'");
    }
}
