//! Tool holder geometry

use serde::{Deserialize, Serialize};

/// Holder identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct HolderId(pub String);

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conical holder segment, listed from the spindle face toward the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderSegment {
    pub height_mm: f64,
    pub lower_diameter_mm: f64,
    pub upper_diameter_mm: f64,
}

/// Tool holder definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolHolder {
    pub id: HolderId,
    pub name: String,
    /// Spindle face to tool-clamping reference point, in mm
    pub gauge_length_mm: f64,
    pub segments: Vec<HolderSegment>,
    #[serde(default)]
    pub collet_min_mm: Option<f64>,
    #[serde(default)]
    pub collet_max_mm: Option<f64>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
}

impl ToolHolder {
    /// Whether a shank of this diameter fits the collet range.
    ///
    /// Holders without collet bounds accept any shank.
    pub fn accepts_shank(&self, shank_diameter_mm: f64) -> bool {
        let above_min = self.collet_min_mm.is_none_or(|min| shank_diameter_mm >= min);
        let below_max = self.collet_max_mm.is_none_or(|max| shank_diameter_mm <= max);
        above_min && below_max
    }
}
