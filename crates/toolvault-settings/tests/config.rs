use tempfile::tempdir;
use toolvault_core::ProductIdSource;
use toolvault_settings::{ExportSettings, SettingsError};

#[test]
fn test_toml_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("export.toml");

    let settings = ExportSettings {
        product_id_source: ProductIdSource::InternalReference,
        library_name: "Shop floor".to_string(),
        pretty_json: false,
        ..Default::default()
    };
    settings.save_to_file(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("product_id_source = \"internal_reference\""));

    let loaded = ExportSettings::load_from_file(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_json_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.json");

    let settings = ExportSettings {
        require_valid: false,
        ..Default::default()
    };
    settings.save_to_file(&path).unwrap();
    assert_eq!(ExportSettings::load_from_file(&path).unwrap(), settings);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.toml");
    std::fs::write(&path, "library_name = \"Router bits\"\n").unwrap();

    let loaded = ExportSettings::load_from_file(&path).unwrap();
    assert_eq!(loaded.library_name, "Router bits");
    assert_eq!(loaded.archive_entry_name, "tools.json");
    assert_eq!(loaded.product_id_source, ProductIdSource::VendorProductId);
    assert!(loaded.require_valid);
}

#[test]
fn test_invalid_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.toml");
    std::fs::write(&path, "archive_entry_name = \"tools.txt\"\n").unwrap();
    assert!(matches!(
        ExportSettings::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));

    std::fs::write(&path, "pretty_json = \"yes\"\n").unwrap();
    assert!(matches!(
        ExportSettings::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("export.yaml");
    let err = ExportSettings::default().save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
    assert!(!path.exists());
}

#[test]
fn test_load_or_default_when_missing() {
    let dir = tempdir().unwrap();
    let loaded = ExportSettings::load_or_default(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(loaded, ExportSettings::default());
}
