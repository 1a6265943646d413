//! Cutting tool definitions and tool library management
//!
//! This module provides:
//! - The closed set of tool types and the cutting policy each one follows
//! - Tool geometry (all lengths in millimeters, angles in degrees)
//! - Per-placement post-process overrides
//! - Tool library management (add, remove, search, filter)

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use crate::data::holders::HolderId;

/// Tool types for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Flat end mill
    FlatEndmill,
    /// Ball end mill / ball nose
    BallEndmill,
    /// Bull nose (corner radius) end mill
    BullEndmill,
    /// Twist drill
    Drill,
    /// Spot / center drill
    SpotDrill,
    /// Chamfer mill
    ChamferMill,
    /// Face mill
    FaceMill,
    /// Thread mill
    ThreadMill,
    /// Reamer
    Reamer,
    /// Tap (right hand)
    Tap,
    /// Engraving tool
    EngravingTool,
}

/// How a tool type engages the workpiece.
///
/// Every decision that differs between drilling and milling tools goes through
/// [`ToolType::policy`] so the calculator, preset routing, and geometry mapping
/// cannot disagree about which tools drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuttingPolicy {
    /// Axial-only cycle: drills, spot drills, reamers, taps
    Drilling,
    /// Ball nose milling: reduced effective step-over
    BallNose,
    /// Any other lateral milling tool
    Milling,
}

impl CuttingPolicy {
    /// True for tools that only cut along their axis
    pub fn is_drilling(self) -> bool {
        matches!(self, Self::Drilling)
    }
}

impl ToolType {
    /// Get all tool types
    pub fn all() -> &'static [ToolType] {
        &[
            ToolType::FlatEndmill,
            ToolType::BallEndmill,
            ToolType::BullEndmill,
            ToolType::Drill,
            ToolType::SpotDrill,
            ToolType::ChamferMill,
            ToolType::FaceMill,
            ToolType::ThreadMill,
            ToolType::Reamer,
            ToolType::Tap,
            ToolType::EngravingTool,
        ]
    }

    /// The cutting policy this tool type follows
    pub fn policy(self) -> CuttingPolicy {
        match self {
            Self::Drill | Self::SpotDrill | Self::Reamer | Self::Tap => CuttingPolicy::Drilling,
            Self::BallEndmill => CuttingPolicy::BallNose,
            Self::FlatEndmill
            | Self::BullEndmill
            | Self::ChamferMill
            | Self::FaceMill
            | Self::ThreadMill
            | Self::EngravingTool => CuttingPolicy::Milling,
        }
    }

    /// Whether the tool carries a point angle (drills and spot drills only)
    pub fn has_point_angle(self) -> bool {
        matches!(self, Self::Drill | Self::SpotDrill)
    }

    /// Internal snake_case tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::FlatEndmill => "flat_endmill",
            Self::BallEndmill => "ball_endmill",
            Self::BullEndmill => "bull_endmill",
            Self::Drill => "drill",
            Self::SpotDrill => "spot_drill",
            Self::ChamferMill => "chamfer_mill",
            Self::FaceMill => "face_mill",
            Self::ThreadMill => "thread_mill",
            Self::Reamer => "reamer",
            Self::Tap => "tap",
            Self::EngravingTool => "engraving_tool",
        }
    }

    /// Type string understood by the CAM tool library format
    pub fn cam_type(self) -> &'static str {
        match self {
            Self::FlatEndmill => "flat end mill",
            Self::BallEndmill => "ball end mill",
            Self::BullEndmill => "bull nose end mill",
            Self::Drill => "drill",
            Self::SpotDrill => "spot drill",
            Self::ChamferMill => "chamfer mill",
            Self::FaceMill => "face mill",
            Self::ThreadMill => "thread mill",
            Self::Reamer => "reamer",
            Self::Tap => "tap right hand",
            Self::EngravingTool => "engrave",
        }
    }
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FlatEndmill => write!(f, "Flat End Mill"),
            Self::BallEndmill => write!(f, "Ball End Mill"),
            Self::BullEndmill => write!(f, "Bull Nose End Mill"),
            Self::Drill => write!(f, "Drill"),
            Self::SpotDrill => write!(f, "Spot Drill"),
            Self::ChamferMill => write!(f, "Chamfer Mill"),
            Self::FaceMill => write!(f, "Face Mill"),
            Self::ThreadMill => write!(f, "Thread Mill"),
            Self::Reamer => write!(f, "Reamer"),
            Self::Tap => write!(f, "Tap"),
            Self::EngravingTool => write!(f, "Engraving Tool"),
        }
    }
}

impl FromStr for ToolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        ToolType::all()
            .iter()
            .copied()
            .find(|t| t.tag() == normalized)
            .ok_or_else(|| format!("Unknown tool type: {}", s))
    }
}

/// Tool identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct ToolId(
    /// The unique string identifier for the tool.
    pub String,
);

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical dimensions of a cutting tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolGeometry {
    /// Cutting diameter in mm
    pub diameter_mm: f64,
    /// Number of flutes
    pub flute_count: u32,
    /// Overall length in mm
    pub overall_length_mm: f64,
    /// Flute (cutting) length in mm
    pub flute_length_mm: f64,
    /// Shank diameter in mm (if different from the cutting diameter)
    #[serde(default)]
    pub shank_diameter_mm: Option<f64>,
    /// Corner radius in mm
    #[serde(default)]
    pub corner_radius_mm: Option<f64>,
    /// Point angle in degrees
    #[serde(default)]
    pub point_angle_deg: Option<f64>,
    /// Helix angle in degrees
    #[serde(default)]
    pub helix_angle_deg: Option<f64>,
    #[serde(default)]
    pub neck_diameter_mm: Option<f64>,
    #[serde(default)]
    pub neck_length_mm: Option<f64>,
    /// Shoulder length in mm
    #[serde(default)]
    pub shoulder_length_mm: Option<f64>,
    /// Body length in mm
    #[serde(default)]
    pub body_length_mm: Option<f64>,
    /// Stick-out below the holder in mm
    #[serde(default)]
    pub length_below_holder_mm: Option<f64>,
    #[serde(default)]
    pub tip_length_mm: Option<f64>,
}

impl ToolGeometry {
    /// Create geometry from the four mandatory dimensions
    pub fn new(
        diameter_mm: f64,
        flute_count: u32,
        overall_length_mm: f64,
        flute_length_mm: f64,
    ) -> Self {
        Self {
            diameter_mm,
            flute_count,
            overall_length_mm,
            flute_length_mm,
            shank_diameter_mm: None,
            corner_radius_mm: None,
            point_angle_deg: None,
            helix_angle_deg: None,
            neck_diameter_mm: None,
            neck_length_mm: None,
            shoulder_length_mm: None,
            body_length_mm: None,
            length_below_holder_mm: None,
            tip_length_mm: None,
        }
    }
}

/// One segment of a tool's shaft profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaftSegment {
    /// Segment height in mm
    pub height_mm: f64,
    /// Diameter at the tool-tip end in mm
    pub lower_diameter_mm: f64,
    /// Diameter at the spindle end in mm
    pub upper_diameter_mm: f64,
}

/// Per-placement post-process overrides.
///
/// Every field is optional; missing values are resolved against the tool's
/// library slot number by [`PostProcessSettings::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessSettings {
    pub diameter_offset: Option<u32>,
    pub length_offset: Option<u32>,
    pub turret: Option<u32>,
    pub comment: Option<String>,
    pub manual_tool_change: Option<bool>,
    pub break_control: Option<bool>,
    pub live: Option<bool>,
}

/// Post-process settings with every default filled in
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPostProcess {
    pub number: u32,
    pub diameter_offset: u32,
    pub length_offset: u32,
    pub turret: u32,
    pub comment: String,
    pub manual_tool_change: bool,
    pub break_control: bool,
    pub live: bool,
}

impl PostProcessSettings {
    /// Fill in defaults for a tool placed in `slot`.
    ///
    /// Offsets default to the slot number, `live` defaults to true, every
    /// other flag to false, and the comment to empty.
    pub fn resolve(overrides: Option<&PostProcessSettings>, slot: u32) -> ResolvedPostProcess {
        let empty = PostProcessSettings::default();
        let o = overrides.unwrap_or(&empty);
        ResolvedPostProcess {
            number: slot,
            diameter_offset: o.diameter_offset.unwrap_or(slot),
            length_offset: o.length_offset.unwrap_or(slot),
            turret: o.turret.unwrap_or(0),
            comment: o.comment.clone().unwrap_or_default(),
            manual_tool_change: o.manual_tool_change.unwrap_or(false),
            break_control: o.break_control.unwrap_or(false),
            live: o.live.unwrap_or(true),
        }
    }
}

/// Which tool field identifies the product in exported libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductIdSource {
    /// The vendor's product number
    #[default]
    VendorProductId,
    /// The shop-internal reference
    InternalReference,
}

/// Complete tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool identifier
    pub id: ToolId,
    /// Display name
    pub name: String,
    /// Tool type
    pub tool_type: ToolType,
    /// Vendor / manufacturer name
    #[serde(default)]
    pub vendor: Option<String>,
    /// Vendor's product number
    #[serde(default)]
    pub vendor_product_id: Option<String>,
    /// Shop-internal reference (bin number, ERP code, ...)
    #[serde(default)]
    pub internal_reference: Option<String>,
    /// Link to the vendor's product page
    #[serde(default)]
    pub product_url: Option<String>,
    /// Physical dimensions
    pub geometry: ToolGeometry,
    #[serde(default)]
    pub coating: Option<String>,
    /// Tool substrate (carbide, HSS, ...)
    #[serde(default)]
    pub substrate: Option<String>,
    #[serde(default)]
    pub shaft_segments: Vec<ShaftSegment>,
    /// Holder used when a library placement does not name one
    #[serde(default)]
    pub default_holder_id: Option<HolderId>,
    /// Post-process overrides used when a library placement does not supply any
    #[serde(default)]
    pub post_process: Option<PostProcessSettings>,
}

impl Tool {
    /// Create a new tool with basic properties
    pub fn new(id: ToolId, name: String, tool_type: ToolType, geometry: ToolGeometry) -> Self {
        Self {
            id,
            name,
            tool_type,
            vendor: None,
            vendor_product_id: None,
            internal_reference: None,
            product_url: None,
            geometry,
            coating: None,
            substrate: None,
            shaft_segments: Vec::new(),
            default_holder_id: None,
            post_process: None,
        }
    }

    /// Product identifier from the selected field, empty when unset
    pub fn product_id(&self, source: ProductIdSource) -> &str {
        let value = match source {
            ProductIdSource::VendorProductId => self.vendor_product_id.as_deref(),
            ProductIdSource::InternalReference => self.internal_reference.as_deref(),
        };
        value.unwrap_or_default()
    }
}

/// Tool library - manages collection of tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolLibrary {
    /// Collection of tools by ID
    tools: HashMap<ToolId, Tool>,
}

impl ToolLibrary {
    /// Create a new empty tool library
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool to the library, replacing any tool with the same ID
    pub fn add_tool(&mut self, tool: Tool) {
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Get a tool by ID
    pub fn get_tool(&self, id: &ToolId) -> Option<&Tool> {
        self.tools.get(id)
    }

    /// Remove a tool from the library
    pub fn remove_tool(&mut self, id: &ToolId) -> Option<Tool> {
        self.tools.remove(id)
    }

    /// Get all tools, ordered by ID
    pub fn get_all_tools(&self) -> Vec<&Tool> {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.id.cmp(&b.id));
        tools
    }

    /// Get tools by type
    pub fn get_tools_by_type(&self, tool_type: ToolType) -> Vec<&Tool> {
        self.tools
            .values()
            .filter(|t| t.tool_type == tool_type)
            .collect()
    }

    /// Search tools by name or vendor (partial match, case-insensitive)
    pub fn search_by_name(&self, query: &str) -> Vec<&Tool> {
        let query_lower = query.to_lowercase();
        self.tools
            .values()
            .filter(|t| {
                t.name.to_lowercase().contains(&query_lower)
                    || t
                        .vendor
                        .as_deref()
                        .is_some_and(|v| v.to_lowercase().contains(&query_lower))
            })
            .collect()
    }

    /// Search tools by diameter range (inclusive)
    pub fn search_by_diameter(&self, min: f64, max: f64) -> Vec<&Tool> {
        self.tools
            .values()
            .filter(|t| t.geometry.diameter_mm >= min && t.geometry.diameter_mm <= max)
            .collect()
    }

    /// Get the number of tools in the library
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if library is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Assigns tool-changer slot numbers within one library.
///
/// Explicit slots are reserved first; remaining tools receive the lowest free
/// number at or above the starting slot.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    next_slot: u32,
    used: BTreeSet<u32>,
}

impl SlotAllocator {
    /// Create an allocator handing out numbers from `starting_slot`
    pub fn new(starting_slot: u32) -> Self {
        Self {
            next_slot: starting_slot,
            used: BTreeSet::new(),
        }
    }

    /// Reserve an explicit slot. Returns false if it was already taken.
    pub fn reserve(&mut self, slot: u32) -> bool {
        self.used.insert(slot)
    }

    /// Take the lowest free slot
    pub fn allocate(&mut self) -> u32 {
        while self.used.contains(&self.next_slot) {
            self.next_slot += 1;
        }
        let slot = self.next_slot;
        self.used.insert(slot);
        slot
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}
