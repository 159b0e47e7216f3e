//! Pot-to-control mapping.
//!
//! [`ControlMapper`] converts smoothed pot readings into the semantic values
//! the rest of the instrument works with:
//!
//! | Channel    | Result                                         |
//! |------------|------------------------------------------------|
//! | Modulation | Depth, linear in `0.0..=modulation_depth_max`  |
//! | PitchBend  | Semitones, zero in a dead zone around center   |
//! | Waveform   | Index, range split into `waveform_count` bands |
//! | Octave     | Row of the octave table, one band per row      |
//!
//! The mapper is the only writer of [`ControlValues`].

use polykey_core::{ADC_MAX, ADC_MID, NUM_WAVEFORMS, bucket, normalize_sample};

use crate::PotChannel;
use crate::store::{ControlValues, PotTable};

/// Ranges used when mapping pots to controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperConfig {
    /// Modulation depth at full rotation.
    pub modulation_depth_max: f32,
    /// Bend in semitones at either end of the pitch-bend pot.
    pub bend_range_semitones: f32,
    /// Counts either side of center that read as zero bend.
    pub bend_dead_zone: u16,
    /// Number of selectable waveforms.
    pub waveform_count: u8,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            modulation_depth_max: 1.0,
            bend_range_semitones: 2.0,
            bend_dead_zone: 24,
            waveform_count: NUM_WAVEFORMS as u8,
        }
    }
}

/// Maps the pot table onto [`ControlValues`].
///
/// # Example
///
/// ```rust
/// use polykey_platform::{ControlMapper, MapperConfig};
///
/// let mapper = ControlMapper::new(MapperConfig::default(), 4);
///
/// assert_eq!(mapper.octave(0), 0);
/// assert_eq!(mapper.octave(1023), 3);
/// assert_eq!(mapper.pitch_bend(511), 0.0);
/// assert!((mapper.pitch_bend(1023) - 2.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMapper {
    config: MapperConfig,
    octaves: u8,
}

impl ControlMapper {
    /// Creates a mapper selecting among `octaves` octave rows.
    pub fn new(config: MapperConfig, octaves: u8) -> Self {
        Self { config, octaves }
    }

    /// Modulation depth for a pot reading.
    #[inline]
    pub fn modulation(&self, raw: u16) -> f32 {
        normalize_sample(raw) * self.config.modulation_depth_max
    }

    /// Pitch bend in semitones for a pot reading.
    ///
    /// Readings within `bend_dead_zone` of center give exactly `0.0`. Outside
    /// it the bend grows linearly from zero at the edge of the dead zone to
    /// `±bend_range_semitones` at the rails.
    pub fn pitch_bend(&self, raw: u16) -> f32 {
        let offset = i32::from(polykey_core::clamp_sample(raw)) - i32::from(ADC_MID);
        let dead = i32::from(self.config.bend_dead_zone);
        if offset.abs() <= dead {
            return 0.0;
        }

        // Distance from the dead-zone edge to the rail on each side
        let (travel, span) = if offset > 0 {
            (offset - dead, i32::from(ADC_MAX - ADC_MID) - dead)
        } else {
            (offset + dead, i32::from(ADC_MID) - dead)
        };
        if span <= 0 {
            return 0.0;
        }

        let range = self.config.bend_range_semitones;
        (travel as f32 / span as f32 * range).clamp(-range, range)
    }

    /// Waveform index for a pot reading.
    #[inline]
    pub fn waveform(&self, raw: u16) -> u8 {
        bucket(raw, self.config.waveform_count)
    }

    /// Octave row for a pot reading.
    #[inline]
    pub fn octave(&self, raw: u16) -> u8 {
        bucket(raw, self.octaves)
    }

    /// Maps every smoothed pot reading into `controls`.
    pub fn apply(&self, pots: &PotTable, controls: &mut ControlValues) {
        controls
            .modulation
            .set(self.modulation(pots.smoothed(PotChannel::Modulation)));
        controls
            .pitch_bend
            .set(self.pitch_bend(pots.smoothed(PotChannel::PitchBend)));
        controls
            .waveform
            .set(self.waveform(pots.smoothed(PotChannel::Waveform)));
        controls
            .octave
            .set(self.octave(pots.smoothed(PotChannel::Octave)));

        #[cfg(feature = "tracing")]
        {
            if controls.waveform.changed {
                tracing::debug!(waveform = controls.waveform.value, "waveform changed");
            }
            if controls.octave.changed {
                tracing::debug!(octave = controls.octave.value, "octave changed");
            }
        }
    }
}

impl Default for ControlMapper {
    fn default() -> Self {
        Self::new(MapperConfig::default(), polykey_core::NUM_OCTAVES as u8)
    }
}
