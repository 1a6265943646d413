//! Export configuration for ToolVault
//!
//! Settings are stored as JSON or TOML, chosen by file extension, in the
//! platform configuration directory unless a path is given explicitly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use toolvault_camtools::{ExportOptions, DEFAULT_ENTRY_NAME, DEFAULT_LIBRARY_NAME};
use toolvault_core::ProductIdSource;

use crate::error::{SettingsError, SettingsResult};

/// Directory created under the platform config directory
pub const APP_DIR_NAME: &str = "toolvault";

/// File name of the default settings file
pub const CONFIG_FILE_NAME: &str = "export.toml";

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Library export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Which tool field fills the library's product ID
    pub product_id_source: ProductIdSource,
    /// Library name used when a request does not name one
    pub library_name: String,
    /// Name of the single entry inside the exported archive
    pub archive_entry_name: String,
    /// Indent the JSON inside the archive
    pub pretty_json: bool,
    /// Refuse to package libraries that fail validation
    pub require_valid: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            product_id_source: ProductIdSource::VendorProductId,
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            archive_entry_name: DEFAULT_ENTRY_NAME.to_string(),
            pretty_json: true,
            require_valid: true,
        }
    }
}

impl ExportSettings {
    /// Create settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        debug!(path = %path.display(), "Loaded export settings");
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "No export settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if self.library_name.trim().is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "library_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if !self.archive_entry_name.ends_with(".json") {
            return Err(SettingsError::InvalidSetting {
                key: "archive_entry_name".to_string(),
                reason: "must end in .json".to_string(),
            });
        }

        Ok(())
    }

    /// Pipeline options for these settings
    pub fn to_export_options(&self) -> ExportOptions {
        ExportOptions {
            product_id_source: self.product_id_source,
            library_name: self.library_name.clone(),
            archive_entry_name: self.archive_entry_name.clone(),
            pretty_json: self.pretty_json,
            require_valid: self.require_valid,
        }
    }
}

/// Default settings path, `<config dir>/toolvault/export.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| {
        SettingsError::ConfigDirectory("no platform configuration directory".to_string())
    })?;
    path.push(APP_DIR_NAME);
    path.push(CONFIG_FILE_NAME);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ExportSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.library_name, "ToolVault Library");
        assert_eq!(settings.archive_entry_name, "tools.json");
        assert!(settings.pretty_json);
        assert!(settings.require_valid);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = ExportSettings {
            library_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "library_name"
        ));

        let settings = ExportSettings {
            archive_entry_name: "tools.xml".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "archive_entry_name"
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("a.yaml")).is_err());
        assert!(ConfigFormat::from_path(Path::new("settings")).is_err());
    }

    #[test]
    fn test_to_export_options() {
        let settings = ExportSettings {
            product_id_source: ProductIdSource::InternalReference,
            require_valid: false,
            ..Default::default()
        };
        let options = settings.to_export_options();
        assert_eq!(options.product_id_source, ProductIdSource::InternalReference);
        assert!(!options.require_valid);
        assert_eq!(options.archive_entry_name, "tools.json");
    }

    #[test]
    fn test_default_config_path_shape() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("toolvault/export.toml"));
        }
    }
}
