//! Machine envelopes and machine/material preset overrides

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data::materials::MaterialId;

/// Machine identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct MachineId(pub String);

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A CNC machine's operating envelope.
///
/// Every computed cutting parameter is clamped to these limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: MachineId,
    pub name: String,
    /// Minimum spindle speed in RPM
    pub min_rpm: u32,
    /// Maximum spindle speed in RPM
    pub max_rpm: u32,
    /// Maximum XY feed in mm/min
    #[serde(default)]
    pub max_feed_xy_mm_min: Option<f64>,
    /// Maximum Z feed in mm/min
    #[serde(default)]
    pub max_feed_z_mm_min: Option<f64>,
    /// Spindle power in kW
    #[serde(default)]
    pub spindle_power_kw: Option<f64>,
}

impl Machine {
    /// Create a machine with only a spindle range
    pub fn new(id: MachineId, name: String, min_rpm: u32, max_rpm: u32) -> Self {
        Self {
            id,
            name,
            min_rpm,
            max_rpm,
            max_feed_xy_mm_min: None,
            max_feed_z_mm_min: None,
            spindle_power_kw: None,
        }
    }
}

/// Coolant delivery for a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CoolantType {
    #[default]
    Disabled,
    Flood,
    Mist,
    AirBlast,
    ThroughTool,
}

impl CoolantType {
    /// Parse a free-form coolant name. Unknown names map to `Disabled`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "flood" => Self::Flood,
            "mist" => Self::Mist,
            "air" | "air_blast" | "air blast" => Self::AirBlast,
            "through" | "through_tool" | "through tool" => Self::ThroughTool,
            _ => Self::Disabled,
        }
    }

    /// Coolant string used by the CAM tool library format
    pub fn cam_name(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Flood => "flood",
            Self::Mist => "mist",
            Self::AirBlast => "air blast",
            Self::ThroughTool => "through tool",
        }
    }
}

impl FromStr for CoolantType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl std::fmt::Display for CoolantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cam_name())
    }
}

/// Explicit cutting data for one (machine, material) pair.
///
/// When present it replaces the built-in surface speed and chip load tables
/// entirely. `surface_speed_m_min` and `chip_load_mm` must be positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineMaterialPreset {
    pub machine_id: MachineId,
    pub material_id: MaterialId,
    /// Surface speed in m/min
    pub surface_speed_m_min: f64,
    /// Chip load in mm/tooth
    pub chip_load_mm: f64,
    /// Axial depth of cut as a multiple of tool diameter
    pub axial_depth_factor: f64,
    /// Radial depth of cut as a multiple of tool diameter
    pub radial_depth_factor: f64,
    /// Plunge feed as a fraction of the XY feed
    pub plunge_rate_factor: f64,
    /// Spindle cap applied before the machine envelope
    #[serde(default)]
    pub max_rpm_override: Option<u32>,
    #[serde(default)]
    pub coolant: Option<String>,
}

impl MachineMaterialPreset {
    /// Check the positivity invariant on speed and chip load
    pub fn is_well_formed(&self) -> bool {
        self.surface_speed_m_min > 0.0 && self.chip_load_mm > 0.0
    }

    /// Resolved coolant, `Disabled` when absent or unrecognised
    pub fn coolant_type(&self) -> CoolantType {
        self.coolant
            .as_deref()
            .map(CoolantType::from_name)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolant_mapping() {
        assert_eq!(CoolantType::from_name("flood").cam_name(), "flood");
        assert_eq!(CoolantType::from_name("mist").cam_name(), "mist");
        assert_eq!(CoolantType::from_name("air").cam_name(), "air blast");
        assert_eq!(CoolantType::from_name("air_blast").cam_name(), "air blast");
        assert_eq!(CoolantType::from_name("through").cam_name(), "through tool");
        assert_eq!(CoolantType::from_name("through_tool").cam_name(), "through tool");
        assert_eq!(CoolantType::from_name("oil").cam_name(), "disabled");
        assert_eq!(CoolantType::from_name("").cam_name(), "disabled");
    }

    #[test]
    fn test_preset_coolant_absent_is_disabled() {
        let preset = MachineMaterialPreset {
            machine_id: MachineId("m".to_string()),
            material_id: MaterialId("al".to_string()),
            surface_speed_m_min: 300.0,
            chip_load_mm: 0.05,
            axial_depth_factor: 1.0,
            radial_depth_factor: 0.4,
            plunge_rate_factor: 0.3,
            max_rpm_override: None,
            coolant: None,
        };
        assert_eq!(preset.coolant_type(), CoolantType::Disabled);
        assert!(preset.is_well_formed());
    }
}
