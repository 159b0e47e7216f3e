//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Configuration values rejected
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use crate::validation::ValidationError;
    use std::error::Error;
    use std::io;

    #[test]
    fn read_file_keeps_path_and_io_source() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = ConfigError::read_file("boards/polykey.toml", missing);

        assert!(err.to_string().contains("boards/polykey.toml"), "got: {err}");
        let source = err.source().and_then(|s| s.downcast_ref::<io::Error>());
        assert_eq!(source.map(io::Error::kind), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn wrong_value_type_is_a_parse_error() {
        let err = EngineConfig::from_toml("[scan]\ncycle_rate_hz = \"fast\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
        assert!(err.to_string().contains("cycle_rate_hz"), "got: {err}");
    }

    #[test]
    fn serializer_rejection_converts() {
        // A bare integer is not a TOML document
        let err: ConfigError = toml::to_string(&7u8).unwrap_err().into();
        assert!(matches!(err, ConfigError::TomlSerialize(_)));
        assert!(err.to_string().starts_with("failed to serialize TOML"));
    }

    #[test]
    fn validation_carries_every_error() {
        let err: ConfigError = ValidationError::Multiple(vec![
            ValidationError::DuplicatePin {
                pin: 2,
                first: "waveform".to_string(),
                second: "octave".to_string(),
            },
            ValidationError::OutOfRange {
                field: "controls.bend_range_semitones".to_string(),
                value: 48.0,
                min: 0.0,
                max: 24.0,
            },
        ])
        .into();

        let msg = err.to_string();
        assert!(msg.starts_with("validation failed: multiple validation errors: "), "{msg}");
        assert!(msg.contains("pin 2 assigned to both 'waveform' and 'octave'"), "{msg}");
        assert!(msg.contains("controls.bend_range_semitones"), "{msg}");

        let ConfigError::Validation(inner) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(inner.into_errors().len(), 2);
    }
}
