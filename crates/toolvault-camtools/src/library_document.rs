//! CAM tool library document model
//!
//! Field declaration order is the emitted key order. The consuming CAM
//! application parses tool documents order-sensitively, so fields must not be
//! reordered and the document must never pass through an associative map.
//!
//! Deserialisation is lenient where a missing value is a validation concern
//! rather than a parse error (diameter, type, RPM, feeds default to zero or
//! empty and are reported by the validator).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Format version written to every library
pub const LIBRARY_FORMAT_VERSION: u32 = 36;

/// Unit string written to tools and holders
pub const LIBRARY_UNIT: &str = "millimeters";

/// Whole-library wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDocument {
    pub data: Vec<ToolDocument>,
    pub version: u32,
}

impl LibraryDocument {
    /// Wrap tool documents with the current format version
    pub fn new(data: Vec<ToolDocument>) -> Self {
        Self {
            data,
            version: LIBRARY_FORMAT_VERSION,
        }
    }
}

/// One tool in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDocument {
    /// Substrate code
    #[serde(rename = "BMC", default)]
    pub bmc: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expressions: ToolExpressions,
    #[serde(default)]
    pub geometry: GeometryDocument,
    #[serde(default)]
    pub guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<HolderDocument>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub last_modified: i64,
    #[serde(rename = "post-process", default)]
    pub post_process: PostProcessDocument,
    #[serde(rename = "product-id", default)]
    pub product_id: String,
    #[serde(rename = "product-link", default)]
    pub product_link: String,
    /// Always equal to `guid`
    #[serde(default)]
    pub reference_guid: String,
    #[serde(rename = "start-values", default)]
    pub start_values: StartValues,
    #[serde(rename = "type", default)]
    pub tool_type: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub vendor: String,
}

/// Parametric expressions evaluated by the CAM application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolExpressions {
    #[serde(rename = "tool_description")]
    pub description: String,
    #[serde(rename = "tool_diameter")]
    pub diameter: String,
    #[serde(rename = "tool_fluteLength")]
    pub flute_length: String,
    #[serde(rename = "tool_overallLength")]
    pub overall_length: String,
    #[serde(rename = "tool_shaftDiameter")]
    pub shaft_diameter: String,
    #[serde(rename = "tool_shoulderLength")]
    pub shoulder_length: String,
    #[serde(rename = "tool_vendor")]
    pub vendor: String,
    #[serde(rename = "tool_productId")]
    pub product_id: String,
}

/// Tool geometry in the library's key vocabulary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryDocument {
    /// Cutting diameter
    #[serde(rename = "DC", default)]
    pub dc: f64,
    /// Diameter at max point
    #[serde(rename = "DCX", default, skip_serializing_if = "Option::is_none")]
    pub dcx: Option<f64>,
    /// Helix angle
    #[serde(rename = "HA", default, skip_serializing_if = "Option::is_none")]
    pub ha: Option<f64>,
    /// Body length
    #[serde(rename = "LB", default, skip_serializing_if = "Option::is_none")]
    pub lb: Option<f64>,
    /// Flute length
    #[serde(rename = "LCF", default, skip_serializing_if = "Option::is_none")]
    pub lcf: Option<f64>,
    /// Number of flutes
    #[serde(rename = "NOF", default, skip_serializing_if = "Option::is_none")]
    pub nof: Option<u32>,
    /// Overall length
    #[serde(rename = "OAL", default, skip_serializing_if = "Option::is_none")]
    pub oal: Option<f64>,
    /// Corner radius
    #[serde(rename = "RE", default, skip_serializing_if = "Option::is_none")]
    pub re: Option<f64>,
    /// Shank diameter
    #[serde(rename = "SFDM", default, skip_serializing_if = "Option::is_none")]
    pub sfdm: Option<f64>,
    /// Point angle
    #[serde(rename = "SIG", default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<f64>,
    /// Taper angle
    #[serde(rename = "TA", default, skip_serializing_if = "Option::is_none")]
    pub ta: Option<f64>,
    #[serde(
        rename = "assemblyGaugeLength",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assembly_gauge_length: Option<f64>,
    #[serde(
        rename = "length-below-holder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub length_below_holder: Option<f64>,
    #[serde(
        rename = "shoulder-diameter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shoulder_diameter: Option<f64>,
    #[serde(
        rename = "shoulder-length",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shoulder_length: Option<f64>,
    #[serde(rename = "tip-length", default, skip_serializing_if = "Option::is_none")]
    pub tip_length: Option<f64>,
    #[serde(
        rename = "upper-radius",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub upper_radius: Option<f64>,
}

/// Holder attached to a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderDocument {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expressions: HolderExpressions,
    #[serde(rename = "gaugeLength", default)]
    pub gauge_length: f64,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub last_modified: i64,
    #[serde(rename = "product-id", default)]
    pub product_id: String,
    #[serde(rename = "product-link", default)]
    pub product_link: String,
    /// Always equal to `guid`
    #[serde(default)]
    pub reference_guid: String,
    #[serde(default)]
    pub segments: Vec<SegmentDocument>,
    #[serde(rename = "type", default)]
    pub holder_type: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub vendor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolderExpressions {
    /// Sum of every segment height, e.g. `segment_1_height+segment_2_height`
    #[serde(rename = "holder_gaugeLength")]
    pub gauge_length: String,
}

/// One conical holder segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDocument {
    pub height: f64,
    #[serde(rename = "lower-diameter")]
    pub lower_diameter: f64,
    #[serde(rename = "upper-diameter")]
    pub upper_diameter: f64,
}

/// Post-processor block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessDocument {
    #[serde(rename = "break-control")]
    pub break_control: bool,
    pub comment: String,
    #[serde(rename = "diameter-offset")]
    pub diameter_offset: u32,
    #[serde(rename = "length-offset")]
    pub length_offset: u32,
    pub live: bool,
    #[serde(rename = "manual-tool-change")]
    pub manual_tool_change: bool,
    pub number: u32,
    pub turret: u32,
}

/// Per-material cutting presets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartValues {
    pub presets: Vec<Preset>,
}

/// A cutting preset, shaped by the tool's cutting policy.
///
/// The two shapes have disjoint feed vocabularies: drilling presets never
/// carry `v_f`, `f_z`, or step-over keys. On read, a preset holding
/// `v_f_retract` or `use-feed-per-revolution` is a drilling preset and
/// anything else is a milling preset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Preset {
    Endmill(EndmillPreset),
    Drill(DrillPreset),
}

const DRILL_PRESET_KEYS: [&str; 2] = ["v_f_retract", "use-feed-per-revolution"];

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_drill = value
            .as_object()
            .ok_or_else(|| D::Error::custom("preset must be an object"))?
            .keys()
            .any(|key| DRILL_PRESET_KEYS.contains(&key.as_str()));

        if is_drill {
            serde_json::from_value(value)
                .map(Self::Drill)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Endmill)
                .map_err(D::Error::custom)
        }
    }
}

/// Read a spindle speed written as any JSON number. Negative, fractional
/// below one, or non-finite speeds read as zero.
fn deserialize_rpm<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let rpm = f64::deserialize(deserializer)?;
    if rpm.is_finite() && rpm > 0.0 {
        Ok(rpm.round().min(u32::MAX as f64) as u32)
    } else {
        Ok(0)
    }
}

impl Preset {
    /// Display name (the material name)
    pub fn name(&self) -> &str {
        match self {
            Self::Endmill(p) => &p.name,
            Self::Drill(p) => &p.name,
        }
    }

    /// Spindle speed
    pub fn rpm(&self) -> u32 {
        match self {
            Self::Endmill(p) => p.n,
            Self::Drill(p) => p.n,
        }
    }

    /// Lateral feed, only defined for milling presets
    pub fn feed(&self) -> Option<f64> {
        match self {
            Self::Endmill(p) => Some(p.v_f),
            Self::Drill(_) => None,
        }
    }

    /// Plunge feed
    pub fn plunge_feed(&self) -> f64 {
        match self {
            Self::Endmill(p) => p.v_f_plunge,
            Self::Drill(p) => p.v_f_plunge,
        }
    }

    pub fn guid(&self) -> &str {
        match self {
            Self::Endmill(p) => &p.guid,
            Self::Drill(p) => &p.guid,
        }
    }
}

/// Milling preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndmillPreset {
    pub name: String,
    #[serde(deserialize_with = "deserialize_rpm")]
    pub n: u32,
    pub v_f: f64,
    pub v_f_plunge: f64,
    pub v_f_transition: f64,
    pub v_f_ramp: f64,
    #[serde(rename = "v_f_leadIn")]
    pub v_f_lead_in: f64,
    #[serde(rename = "v_f_leadOut")]
    pub v_f_lead_out: f64,
    /// Feed per revolution
    pub f_n: f64,
    /// Feed per tooth
    pub f_z: f64,
    pub stepdown: f64,
    pub stepover: f64,
    #[serde(rename = "use-stepdown")]
    pub use_stepdown: bool,
    #[serde(rename = "use-stepover")]
    pub use_stepover: bool,
    #[serde(rename = "ramp-angle")]
    pub ramp_angle: f64,
    pub guid: String,
    pub material: PresetMaterial,
    #[serde(rename = "tool-coolant")]
    pub tool_coolant: String,
}

/// Drilling preset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillPreset {
    pub name: String,
    #[serde(deserialize_with = "deserialize_rpm")]
    pub n: u32,
    pub v_f_plunge: f64,
    pub v_f_retract: f64,
    #[serde(rename = "use-feed-per-revolution")]
    pub use_feed_per_revolution: bool,
    pub guid: String,
    pub material: PresetMaterial,
    #[serde(rename = "tool-coolant")]
    pub tool_coolant: String,
}

/// Material matching rule attached to a preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetMaterial {
    pub category: String,
    pub query: String,
    #[serde(rename = "use-hardness")]
    pub use_hardness: bool,
}

impl Default for PresetMaterial {
    /// Matches any material, ignoring hardness
    fn default() -> Self {
        Self {
            category: "all".to_string(),
            query: String::new(),
            use_hardness: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drill_preset_detected_by_keys() {
        let json = r#"{"name":"Steel","n":1200,"v_f_plunge":90,"v_f_retract":180,
            "use-feed-per-revolution":false,"guid":"g","tool-coolant":"flood"}"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert!(matches!(preset, Preset::Drill(_)));
        assert_eq!(preset.plunge_feed(), 90.0);
        assert_eq!(preset.feed(), None);
    }

    #[test]
    fn test_endmill_preset_detected_by_keys() {
        let json = r#"{"name":"Al","n":12000,"v_f":1800,"v_f_plunge":600,
            "f_n":0.15,"f_z":0.05,"stepdown":6,"stepover":3}"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert!(matches!(preset, Preset::Endmill(_)));
        assert_eq!(preset.feed(), Some(1800.0));
        assert_eq!(preset.rpm(), 12000);
    }

    #[test]
    fn test_sparse_presets_read_with_defaults() {
        let preset: Preset = serde_json::from_str(r#"{"name":"Al","n":12000,"guid":"g"}"#).unwrap();
        assert!(matches!(preset, Preset::Endmill(_)));
        assert_eq!(preset.feed(), Some(0.0));
        assert_eq!(preset.plunge_feed(), 0.0);

        let preset: Preset = serde_json::from_str(r#"{"name":"St","v_f_retract":10}"#).unwrap();
        assert!(matches!(preset, Preset::Drill(_)));
        assert_eq!(preset.rpm(), 0);

        assert!(serde_json::from_str::<Preset>("[1, 2]").is_err());
    }

    #[test]
    fn test_rpm_reads_any_number() {
        for (json, rpm) in [
            (r#"{"n":12000.4}"#, 12000),
            (r#"{"n":-5}"#, 0),
            (r#"{"n":0.2}"#, 0),
            (r#"{"n":9000}"#, 9000),
        ] {
            assert_eq!(serde_json::from_str::<Preset>(json).unwrap().rpm(), rpm);
        }
    }

    #[test]
    fn test_rpm_written_as_integer() {
        let preset = Preset::Drill(DrillPreset {
            n: 1900,
            ..Default::default()
        });
        let json = serde_json::to_string(&preset).unwrap();
        assert!(json.contains(r#""n":1900,"#), "{}", json);
    }

    #[test]
    fn test_tool_document_missing_fields_default() {
        let tool: ToolDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(tool.geometry.dc, 0.0);
        assert!(tool.tool_type.is_empty());
        assert!(tool.start_values.presets.is_empty());
        assert!(tool.holder.is_none());
    }

    #[test]
    fn test_absent_optional_geometry_keys_are_omitted() {
        let geometry = GeometryDocument {
            dc: 6.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&geometry).unwrap();
        assert_eq!(json, r#"{"DC":6.0}"#);
    }

    #[test]
    fn test_preset_material_default_matches_anything() {
        let json = serde_json::to_string(&PresetMaterial::default()).unwrap();
        assert_eq!(json, r#"{"category":"all","query":"","use-hardness":false}"#);
    }
}
