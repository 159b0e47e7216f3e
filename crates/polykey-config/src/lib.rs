//! Configuration for the polykey controller.
//!
//! A single TOML file describes the scanner timing, pot mapping ranges,
//! voice overflow policy, note layout and pot wiring. This crate parses it,
//! checks it against the device's limits and builds a ready-to-run engine.
//!
//! # Features
//!
//! - **Config file**: [`EngineConfig`] with `[scan]`, `[controls]`,
//!   `[voices]`, `[keyboard]` and `[pins]` sections, all optional
//! - **Validation**: range checks, the 10 ms debounce budget, note layout
//!   shape and pin conflicts, all reported together
//! - **Engine construction**: [`EngineConfig::build_engine`]
//!
//! # Example
//!
//! ```rust
//! use polykey_config::EngineConfig;
//! use polykey_synth::OverflowPolicy;
//!
//! let config = EngineConfig::from_toml(
//!     r#"
//! [voices]
//! overflow = "steal-oldest"
//!
//! [keyboard]
//! lowest_note = 36
//! "#,
//! )
//! .unwrap();
//!
//! let engine = config.build_engine().unwrap();
//! assert_eq!(engine.store().voices().policy(), OverflowPolicy::StealOldest);
//! ```

mod engine_config;
mod error;

/// Configuration validation.
pub mod validation;

pub use engine_config::{
    ControlsSection, EngineConfig, KeyboardSection, PinsSection, ScanSection, VoicesSection,
};
pub use error::ConfigError;
pub use validation::{
    MAX_DEBOUNCE_WINDOW_MS, ValidationError, ValidationResult, validate_config,
};
