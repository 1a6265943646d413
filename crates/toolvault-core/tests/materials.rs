use toolvault_core::data::materials::*;

#[test]
fn test_material_id_display() {
    let id = MaterialId("test_material".to_string());
    assert_eq!(id.to_string(), "test_material");
}

#[test]
fn test_material_creation() {
    let material = Material::new(
        MaterialId("test".to_string()),
        "Test Material".to_string(),
        MaterialCategory::Wood,
    );

    assert_eq!(material.id.0, "test");
    assert_eq!(material.name, "Test Material");
    assert_eq!(material.category, MaterialCategory::Wood);
    assert_eq!(material.chip_load_factor, 1.0);
}

#[test]
fn test_material_library_add_and_get() {
    let mut library = MaterialLibrary::new();
    let material = Material::new(
        MaterialId("test".to_string()),
        "Test".to_string(),
        MaterialCategory::Plastic,
    );

    library.add_material(material);
    assert_eq!(library.len(), 1);

    let retrieved = library.get_material(&MaterialId("test".to_string()));
    assert!(retrieved.is_some());

    let removed = library.remove_material(&MaterialId("test".to_string()));
    assert!(removed.is_some());
    assert!(library.is_empty());
}

#[test]
fn test_material_library_search() {
    let library = init_standard_library();
    let results = library.search_by_name("oak");
    assert!(!results.is_empty());
    assert!(results.iter().any(|m| m.name.contains("Oak")));
}

#[test]
fn test_standard_library_covers_every_category() {
    let library = init_standard_library();
    assert_eq!(library.len(), MaterialCategory::all().len());

    for category in MaterialCategory::all() {
        assert_eq!(
            library.get_materials_by_category(*category).len(),
            1,
            "missing {}",
            category
        );
    }
}

#[test]
fn test_standard_library_hardness_scaling() {
    let library = init_standard_library();
    let aluminum = library
        .get_material(&MaterialId("aluminum_6061".to_string()))
        .unwrap();
    let titanium = library
        .get_material(&MaterialId("titanium_grade5".to_string()))
        .unwrap();

    assert_eq!(aluminum.chip_load_factor, 1.0);
    assert!(titanium.chip_load_factor < 1.0);
}
