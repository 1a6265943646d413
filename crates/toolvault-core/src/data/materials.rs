//! Materials Database module
//!
//! This module provides:
//! - Material categories and their baseline surface speeds
//! - Material definitions (chip-load scaling, surface-speed range, hardness)
//! - Material library management
//! - A standard library with one representative material per category

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Material categories for organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Aluminum,
    Steel,
    StainlessSteel,
    Titanium,
    Brass,
    Copper,
    Plastic,
    Wood,
    Composite,
    CastIron,
}

impl MaterialCategory {
    /// Get all material categories
    pub fn all() -> &'static [MaterialCategory] {
        &[
            MaterialCategory::Aluminum,
            MaterialCategory::Steel,
            MaterialCategory::StainlessSteel,
            MaterialCategory::Titanium,
            MaterialCategory::Brass,
            MaterialCategory::Copper,
            MaterialCategory::Plastic,
            MaterialCategory::Wood,
            MaterialCategory::Composite,
            MaterialCategory::CastIron,
        ]
    }

    /// Baseline surface speed for carbide tooling, in m/min
    pub fn default_surface_speed_m_min(self) -> f64 {
        match self {
            Self::Aluminum => 250.0,
            Self::Brass => 150.0,
            Self::Copper => 100.0,
            Self::Plastic => 200.0,
            Self::Wood => 300.0,
            Self::Steel => 80.0,
            Self::StainlessSteel => 50.0,
            Self::Titanium => 40.0,
            Self::Composite => 100.0,
            Self::CastIron => 70.0,
        }
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aluminum => write!(f, "Aluminum"),
            Self::Steel => write!(f, "Steel"),
            Self::StainlessSteel => write!(f, "Stainless Steel"),
            Self::Titanium => write!(f, "Titanium"),
            Self::Brass => write!(f, "Brass"),
            Self::Copper => write!(f, "Copper"),
            Self::Plastic => write!(f, "Plastic"),
            Self::Wood => write!(f, "Wood"),
            Self::Composite => write!(f, "Composite"),
            Self::CastIron => write!(f, "Cast Iron"),
        }
    }
}

/// Material identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct MaterialId(pub String);

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_chip_load_factor() -> f64 {
    1.0
}

/// Complete material definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Unique material identifier
    pub id: MaterialId,
    /// Display name
    pub name: String,
    /// Material category
    pub category: MaterialCategory,
    /// Chip-load scaling relative to aluminum (1.0). Below 1.0 is harder, above is softer.
    #[serde(default = "default_chip_load_factor")]
    pub chip_load_factor: f64,
    /// Lower end of the recommended surface speed in m/min
    #[serde(default)]
    pub surface_speed_min_m_min: Option<f64>,
    /// Upper end of the recommended surface speed in m/min
    #[serde(default)]
    pub surface_speed_max_m_min: Option<f64>,
    /// Brinell hardness
    #[serde(default)]
    pub hardness_hb: Option<f64>,
    /// Rockwell C hardness
    #[serde(default)]
    pub hardness_hrc: Option<f64>,
    /// Brief description
    #[serde(default)]
    pub description: String,
}

impl Material {
    /// Create a new material with a neutral chip-load factor and no speed range
    pub fn new(id: MaterialId, name: String, category: MaterialCategory) -> Self {
        Self {
            id,
            name,
            category,
            chip_load_factor: 1.0,
            surface_speed_min_m_min: None,
            surface_speed_max_m_min: None,
            hardness_hb: None,
            hardness_hrc: None,
            description: String::new(),
        }
    }
}

/// Materials library - manages collection of materials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialLibrary {
    /// Collection of materials by ID
    materials: HashMap<MaterialId, Material>,
}

impl MaterialLibrary {
    /// Create a new empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material to the library
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.id.clone(), material);
    }

    /// Get a material by ID
    pub fn get_material(&self, id: &MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Remove a material from the library
    pub fn remove_material(&mut self, id: &MaterialId) -> Option<Material> {
        self.materials.remove(id)
    }

    /// Get all materials, ordered by ID
    pub fn get_all_materials(&self) -> Vec<&Material> {
        let mut materials: Vec<&Material> = self.materials.values().collect();
        materials.sort_by(|a, b| a.id.cmp(&b.id));
        materials
    }

    /// Get all materials in a specific category
    pub fn get_materials_by_category(&self, category: MaterialCategory) -> Vec<&Material> {
        self.materials
            .values()
            .filter(|m| m.category == category)
            .collect()
    }

    /// Search materials by name (partial match, case-insensitive)
    pub fn search_by_name(&self, query: &str) -> Vec<&Material> {
        let query_lower = query.to_lowercase();
        self.materials
            .values()
            .filter(|m| {
                m.name.to_lowercase().contains(&query_lower)
                    || m.description.to_lowercase().contains(&query_lower)
            })
            .collect()
    }

    /// Get the number of materials in the library
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Check if library is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Initialize the standard materials library with one material per category
pub fn init_standard_library() -> MaterialLibrary {
    let mut library = MaterialLibrary::new();

    let seeds: [(&str, &str, MaterialCategory, f64, Option<f64>, &str); 10] = [
        (
            "aluminum_6061",
            "Aluminum 6061-T6",
            MaterialCategory::Aluminum,
            1.0,
            Some(95.0),
            "General-purpose precipitation-hardened aluminum alloy",
        ),
        (
            "steel_1018",
            "Steel 1018",
            MaterialCategory::Steel,
            0.6,
            Some(126.0),
            "Low-carbon mild steel, cold drawn",
        ),
        (
            "stainless_304",
            "Stainless Steel 304",
            MaterialCategory::StainlessSteel,
            0.45,
            Some(201.0),
            "Austenitic stainless, work hardens",
        ),
        (
            "titanium_grade5",
            "Titanium Ti-6Al-4V",
            MaterialCategory::Titanium,
            0.35,
            Some(334.0),
            "Grade 5 titanium alloy, keep engagement low",
        ),
        (
            "brass_360",
            "Brass C360",
            MaterialCategory::Brass,
            1.1,
            Some(78.0),
            "Free-machining brass",
        ),
        (
            "copper_110",
            "Copper C110",
            MaterialCategory::Copper,
            0.9,
            Some(45.0),
            "Electrolytic tough pitch copper, gummy",
        ),
        (
            "plastic_acrylic",
            "Acrylic (PMMA)",
            MaterialCategory::Plastic,
            1.2,
            None,
            "Clear thermoplastic, avoid heat buildup",
        ),
        (
            "wood_oak_red",
            "Red Oak",
            MaterialCategory::Wood,
            1.5,
            None,
            "Dense American hardwood",
        ),
        (
            "composite_cfrp",
            "Carbon Fiber Laminate",
            MaterialCategory::Composite,
            0.8,
            None,
            "Abrasive; use diamond-coated tooling and dust extraction",
        ),
        (
            "cast_iron_gray",
            "Gray Cast Iron",
            MaterialCategory::CastIron,
            0.7,
            Some(200.0),
            "Class 30 gray iron, segmented chips",
        ),
    ];

    for (id, name, category, factor, hardness_hb, description) in seeds {
        let mut material = Material::new(MaterialId(id.to_string()), name.to_string(), category);
        material.chip_load_factor = factor;
        material.hardness_hb = hardness_hb;
        material.description = description.to_string();
        library.add_material(material);
    }

    library
}
