//! Configuration
//!
//! User settings loaded from the config directory on top of embedded defaults.

pub mod settings;

pub use settings::Settings;
