//! The `polykey.toml` file format.

use std::path::Path;

use polykey_core::{NUM_BUTTONS, NUM_OCTAVES};
use polykey_platform::{
    DeviceEngine, EngineSettings, MapperConfig, PotChannel, PotPins, ScanConfig,
};
use polykey_synth::{DeviceOctaveTable, OverflowPolicy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationError, ValidationResult, validate_config};

/// Complete controller configuration.
///
/// Every section and field is optional in TOML; missing values take the
/// factory default, so an empty file is the factory configuration.
///
/// # Example TOML
///
/// ```toml
/// [scan]
/// cycle_rate_hz = 1000.0
/// debounce_samples = 5
/// smoothing_ms = 20.0
///
/// [controls]
/// bend_range_semitones = 12.0
///
/// [voices]
/// overflow = "steal-oldest"
///
/// [keyboard]
/// lowest_note = 36
///
/// [pins]
/// modulation = 14
/// pitch_bend = 15
/// waveform = 16
/// octave = 17
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Scanner timing.
    pub scan: ScanSection,
    /// Pot mapping ranges.
    pub controls: ControlsSection,
    /// Voice pool behavior.
    pub voices: VoicesSection,
    /// Note layout.
    pub keyboard: KeyboardSection,
    /// Analog pin per pot.
    pub pins: PinsSection,
}

/// `[scan]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    /// Scan cycles per second.
    pub cycle_rate_hz: f32,
    /// Consecutive disagreeing samples before a key changes state.
    pub debounce_samples: u8,
    /// Pot smoothing time constant in milliseconds.
    pub smoothing_ms: f32,
}

impl ScanSection {
    /// Scanner settings for this section, reading pots on `pins`.
    pub fn to_scan_config(&self, pins: PotPins) -> ScanConfig {
        ScanConfig {
            cycle_rate_hz: self.cycle_rate_hz,
            debounce_samples: self.debounce_samples,
            smoothing_ms: self.smoothing_ms,
            pins,
        }
    }
}

impl Default for ScanSection {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            cycle_rate_hz: scan.cycle_rate_hz,
            debounce_samples: scan.debounce_samples,
            smoothing_ms: scan.smoothing_ms,
        }
    }
}

/// `[controls]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsSection {
    /// Modulation depth at full rotation.
    pub modulation_depth_max: f32,
    /// Bend in semitones at either end of the pitch-bend pot.
    pub bend_range_semitones: f32,
    /// Counts either side of center that read as zero bend.
    pub bend_dead_zone: u16,
    /// Number of selectable waveforms.
    pub waveform_count: u8,
}

impl Default for ControlsSection {
    fn default() -> Self {
        let mapper = MapperConfig::default();
        Self {
            modulation_depth_max: mapper.modulation_depth_max,
            bend_range_semitones: mapper.bend_range_semitones,
            bend_dead_zone: mapper.bend_dead_zone,
            waveform_count: mapper.waveform_count,
        }
    }
}

/// `[voices]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoicesSection {
    /// `"drop"` or `"steal-oldest"`.
    pub overflow: OverflowPolicy,
}

/// `[keyboard]` section.
///
/// With `rows` unset the layout is chromatic from `lowest_note`, one octave
/// per row. Explicit `rows` replace it and must have one row per octave and
/// one note per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyboardSection {
    /// MIDI note of key 0 in octave 0.
    pub lowest_note: u8,
    /// Explicit MIDI notes, `rows[octave][key]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Vec<u8>>>,
}

impl Default for KeyboardSection {
    fn default() -> Self {
        Self {
            lowest_note: 48,
            rows: None,
        }
    }
}

/// `[pins]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinsSection {
    /// Modulation pot pin.
    pub modulation: u8,
    /// Pitch-bend pot pin.
    pub pitch_bend: u8,
    /// Waveform pot pin.
    pub waveform: u8,
    /// Octave pot pin.
    pub octave: u8,
}

impl PinsSection {
    /// Pin assigned to a channel.
    pub fn pin(&self, channel: PotChannel) -> u8 {
        match channel {
            PotChannel::Modulation => self.modulation,
            PotChannel::PitchBend => self.pitch_bend,
            PotChannel::Waveform => self.waveform,
            PotChannel::Octave => self.octave,
        }
    }

    /// TOML key of a channel.
    pub fn field_name(channel: PotChannel) -> &'static str {
        match channel {
            PotChannel::Modulation => "modulation",
            PotChannel::PitchBend => "pitch_bend",
            PotChannel::Waveform => "waveform",
            PotChannel::Octave => "octave",
        }
    }

    /// Pin assignment in engine form.
    pub fn to_pot_pins(&self) -> PotPins {
        PotPins::new(self.modulation, self.pitch_bend, self.waveform, self.octave)
    }
}

impl Default for PinsSection {
    fn default() -> Self {
        let pins = PotPins::default();
        Self {
            modulation: pins.pin(PotChannel::Modulation),
            pitch_bend: pins.pin(PotChannel::PitchBend),
            waveform: pins.pin(PotChannel::Waveform),
            octave: pins.pin(PotChannel::Octave),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Engine settings described by this configuration (unvalidated).
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            scan: self.scan.to_scan_config(self.pins.to_pot_pins()),
            controls: MapperConfig {
                modulation_depth_max: self.controls.modulation_depth_max,
                bend_range_semitones: self.controls.bend_range_semitones,
                bend_dead_zone: self.controls.bend_dead_zone,
                waveform_count: self.controls.waveform_count,
            },
            overflow: self.voices.overflow,
        }
    }

    /// Octave table described by the `[keyboard]` section.
    pub fn octave_table(&self) -> ValidationResult<DeviceOctaveTable> {
        let Some(rows) = &self.keyboard.rows else {
            return Ok(DeviceOctaveTable::chromatic(self.keyboard.lowest_note));
        };

        let shape_error = || ValidationError::InvalidValue {
            field: "keyboard.rows".to_string(),
            reason: format!("expected {NUM_OCTAVES} rows of {NUM_BUTTONS} notes"),
        };
        let mut table = [[0u8; NUM_BUTTONS]; NUM_OCTAVES];
        if rows.len() != NUM_OCTAVES {
            return Err(shape_error());
        }
        for (dst, src) in table.iter_mut().zip(rows) {
            *dst = src.as_slice().try_into().map_err(|_| shape_error())?;
        }
        Ok(DeviceOctaveTable::from_rows(table))
    }

    /// Validate and build a device engine.
    pub fn build_engine(&self) -> Result<DeviceEngine, ConfigError> {
        self.validate()?;
        let table = self.octave_table()?;
        Ok(DeviceEngine::new(self.settings(), table))
    }
}
