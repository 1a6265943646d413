//! ToolVault Settings Crate
//!
//! Export configuration: defaults, JSON/TOML persistence, and validation.

pub mod config;
pub mod error;

pub use config::{default_config_path, ConfigFormat, ExportSettings};
pub use error::{SettingsError, SettingsResult};
