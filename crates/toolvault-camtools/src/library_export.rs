//! Tool library serializer
//!
//! Maps tools, holders, and per-material cutting parameters onto the CAM tool
//! library document. Serialisation never fails: missing values fall back to
//! defaults and degenerate numbers are left for the validator to reject.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;

use toolvault_core::{
    CuttingPolicy, Machine, MachineMaterialPreset, Material, MaterialId, PostProcessSettings,
    ProductIdSource, Tool, ToolHolder, ToolType,
};

use crate::library_document::{
    DrillPreset, EndmillPreset, GeometryDocument, HolderDocument, HolderExpressions,
    LibraryDocument, PostProcessDocument, Preset, PresetMaterial, SegmentDocument, StartValues,
    ToolDocument, ToolExpressions, LIBRARY_UNIT,
};
use crate::speeds_feeds::{calculate_cutting_parameters, round_to, CuttingParameters};

// Calibration values. These are shop heuristics, not derived physics.

/// Ramp angle written to milling presets, in degrees
pub const RAMP_ANGLE_DEG: f64 = 2.0;
/// Retract feed as a multiple of plunge feed for drilling presets
pub const RETRACT_FEED_FACTOR: f64 = 2.0;
/// Shoulder length beyond the flutes when not specified, in mm
pub const SHOULDER_CLEARANCE_MM: f64 = 2.0;
/// Length below holder beyond the shoulder when not specified, in mm
pub const HOLDER_CLEARANCE_MM: f64 = 2.0;

const BODY_FROM_FLUTE_FACTOR: f64 = 1.2;
const BODY_FROM_OVERALL_FACTOR: f64 = 0.6;
const DRILL_POINT_ANGLE_DEG: f64 = 118.0;
const SPOT_DRILL_POINT_ANGLE_DEG: f64 = 90.0;

/// One tool placed in a library slot
#[derive(Debug, Clone, Copy)]
pub struct LibraryEntry<'a> {
    pub tool: &'a Tool,
    /// Tool-changer slot number
    pub slot: u32,
    pub holder: Option<&'a ToolHolder>,
    /// Placement overrides; the tool's own settings apply when absent
    pub post_process: Option<&'a PostProcessSettings>,
}

impl<'a> LibraryEntry<'a> {
    /// Place a tool in a slot with no holder or overrides
    pub fn new(tool: &'a Tool, slot: u32) -> Self {
        Self {
            tool,
            slot,
            holder: None,
            post_process: None,
        }
    }

    pub fn with_holder(mut self, holder: &'a ToolHolder) -> Self {
        self.holder = Some(holder);
        self
    }

    pub fn with_post_process(mut self, post_process: &'a PostProcessSettings) -> Self {
        self.post_process = Some(post_process);
        self
    }
}

/// Generate a random version-4 identifier (`8-4-4-4-12` lowercase hex)
pub fn generate_guid() -> String {
    Uuid::new_v4().to_string()
}

/// Format a number for an expression.
///
/// Integers are written plainly. Anything else uses a decimal comma wrapped in
/// parentheses, so `3.175` becomes `(3,175)`.
pub fn format_expression_number(value: f64) -> String {
    let value = round_to(value, 4);
    if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("({})", value.to_string().replace('.', ","))
    }
}

/// Format text for an expression as a quoted literal
pub fn format_expression_text(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

/// Gauge-length expression summing every segment height
pub fn holder_gauge_expression(segment_count: usize) -> String {
    (1..=segment_count)
        .map(|i| format!("segment_{}_height", i))
        .collect::<Vec<_>>()
        .join("+")
}

/// Substrate code for the library's `BMC` field
pub fn substrate_code(substrate: Option<&str>) -> &'static str {
    let Some(substrate) = substrate else {
        return "carbide";
    };
    let lower = substrate.to_lowercase();
    if lower.contains("carbide") {
        "carbide"
    } else if lower.contains("hss") || lower.contains("high speed") || lower.contains("cobalt") {
        "hss"
    } else if lower.contains("ceramic") {
        "ceramics"
    } else {
        "unspecified"
    }
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

/// Serializes tools into a CAM tool library document
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolLibrarySerializer {
    product_id_source: ProductIdSource,
}

impl ToolLibrarySerializer {
    pub fn new(product_id_source: ProductIdSource) -> Self {
        Self { product_id_source }
    }

    /// Build the full library document.
    ///
    /// Tool documents follow `entries` order and each tool's presets follow
    /// `materials` order. `presets` maps a material to the machine's override
    /// for it, if any.
    pub fn serialize(
        &self,
        library_name: &str,
        entries: &[LibraryEntry<'_>],
        machine: &Machine,
        materials: &[Material],
        presets: &HashMap<MaterialId, MachineMaterialPreset>,
    ) -> LibraryDocument {
        let last_modified = chrono::Utc::now().timestamp_millis();
        let data: Vec<ToolDocument> = entries
            .iter()
            .map(|entry| self.tool_document(entry, machine, materials, presets, last_modified))
            .collect();

        info!(
            library = library_name,
            machine = %machine.id,
            tools = data.len(),
            materials = materials.len(),
            "Serialized tool library"
        );
        LibraryDocument::new(data)
    }

    fn tool_document(
        &self,
        entry: &LibraryEntry<'_>,
        machine: &Machine,
        materials: &[Material],
        presets: &HashMap<MaterialId, MachineMaterialPreset>,
        last_modified: i64,
    ) -> ToolDocument {
        let tool = entry.tool;
        let presets = materials
            .iter()
            .map(|material| {
                let params = calculate_cutting_parameters(
                    &tool.geometry,
                    tool.tool_type,
                    machine,
                    material,
                    presets.get(&material.id),
                );
                debug!(
                    tool = %tool.id,
                    material = %material.id,
                    rpm = params.rpm,
                    feed = params.feed_mm_min,
                    plunge = params.plunge_feed_mm_min,
                    "Computed cutting parameters"
                );
                build_preset(tool, material, &params, presets.get(&material.id))
            })
            .collect();

        let geometry = map_geometry(tool, entry.holder);
        let guid = generate_guid();
        let post_process = entry.post_process.or(tool.post_process.as_ref());
        let resolved = PostProcessSettings::resolve(post_process, entry.slot);
        let product_id = tool.product_id(self.product_id_source).to_string();
        let vendor = tool.vendor.clone().unwrap_or_default();

        ToolDocument {
            bmc: substrate_code(tool.substrate.as_deref()).to_string(),
            description: tool.name.clone(),
            expressions: ToolExpressions {
                description: format_expression_text(&tool.name),
                diameter: format_expression_number(geometry.dc),
                flute_length: format_expression_number(geometry.lcf.unwrap_or(0.0)),
                overall_length: format_expression_number(geometry.oal.unwrap_or(0.0)),
                shaft_diameter: format_expression_number(geometry.sfdm.unwrap_or(geometry.dc)),
                shoulder_length: format_expression_number(geometry.shoulder_length.unwrap_or(0.0)),
                vendor: format_expression_text(&vendor),
                product_id: format_expression_text(&product_id),
            },
            geometry,
            guid: guid.clone(),
            holder: entry
                .holder
                .map(|holder| map_holder(holder, last_modified)),
            last_modified,
            post_process: PostProcessDocument {
                break_control: resolved.break_control,
                comment: resolved.comment,
                diameter_offset: resolved.diameter_offset,
                length_offset: resolved.length_offset,
                live: resolved.live,
                manual_tool_change: resolved.manual_tool_change,
                number: resolved.number,
                turret: resolved.turret,
            },
            product_id,
            product_link: tool.product_url.clone().unwrap_or_default(),
            reference_guid: guid,
            start_values: StartValues { presets },
            tool_type: tool.tool_type.cam_type().to_string(),
            unit: LIBRARY_UNIT.to_string(),
            vendor,
        }
    }
}

/// Serialize a library with the given product-ID source
pub fn serialize_library(
    library_name: &str,
    entries: &[LibraryEntry<'_>],
    machine: &Machine,
    materials: &[Material],
    presets: &HashMap<MaterialId, MachineMaterialPreset>,
    product_id_source: ProductIdSource,
) -> LibraryDocument {
    ToolLibrarySerializer::new(product_id_source).serialize(
        library_name,
        entries,
        machine,
        materials,
        presets,
    )
}

/// Fold one set of cutting parameters into a preset of the tool's shape
pub fn build_preset(
    tool: &Tool,
    material: &Material,
    params: &CuttingParameters,
    preset: Option<&MachineMaterialPreset>,
) -> Preset {
    let tool_coolant = preset
        .map(|p| p.coolant_type())
        .unwrap_or_default()
        .cam_name()
        .to_string();

    match tool.tool_type.policy() {
        CuttingPolicy::Drilling => Preset::Drill(DrillPreset {
            name: material.name.clone(),
            n: params.rpm,
            v_f_plunge: params.plunge_feed_mm_min,
            v_f_retract: params.plunge_feed_mm_min * RETRACT_FEED_FACTOR,
            use_feed_per_revolution: false,
            guid: generate_guid(),
            material: PresetMaterial::default(),
            tool_coolant,
        }),
        CuttingPolicy::BallNose | CuttingPolicy::Milling => {
            let feed = params.feed_mm_min;
            Preset::Endmill(EndmillPreset {
                name: material.name.clone(),
                n: params.rpm,
                v_f: feed,
                v_f_plunge: params.plunge_feed_mm_min,
                v_f_transition: feed,
                v_f_ramp: feed,
                v_f_lead_in: feed,
                v_f_lead_out: feed,
                f_n: round_to(params.chip_load_mm * tool.geometry.flute_count as f64, 4),
                f_z: params.chip_load_mm,
                stepdown: params.axial_depth_mm,
                stepover: params.radial_depth_mm,
                use_stepdown: true,
                use_stepover: true,
                ramp_angle: RAMP_ANGLE_DEG,
                guid: generate_guid(),
                material: PresetMaterial::default(),
                tool_coolant,
            })
        }
    }
}

fn default_point_angle(tool_type: ToolType) -> f64 {
    match tool_type {
        ToolType::SpotDrill => SPOT_DRILL_POINT_ANGLE_DEG,
        _ => DRILL_POINT_ANGLE_DEG,
    }
}

/// Map tool geometry onto the library's geometry block
pub fn map_geometry(tool: &Tool, holder: Option<&ToolHolder>) -> GeometryDocument {
    let g = &tool.geometry;
    let milling = !tool.tool_type.policy().is_drilling();

    let flute_length = positive(g.flute_length_mm);
    let overall_length = positive(g.overall_length_mm);
    let shoulder_length = g
        .shoulder_length_mm
        .or_else(|| flute_length.map(|l| l + SHOULDER_CLEARANCE_MM));
    let length_below_holder = g
        .length_below_holder_mm
        .or_else(|| shoulder_length.map(|l| l + HOLDER_CLEARANCE_MM));
    let body_length = g
        .body_length_mm
        .or(length_below_holder)
        .or_else(|| flute_length.map(|l| l * BODY_FROM_FLUTE_FACTOR))
        .or_else(|| overall_length.map(|l| l * BODY_FROM_OVERALL_FACTOR))
        .map(|l| round_to(l, 2));
    let assembly_gauge_length = holder
        .zip(body_length)
        .map(|(h, body)| round_to(h.gauge_length_mm + body, 2));

    let corner_radius = if milling {
        Some(g.corner_radius_mm.unwrap_or(0.0))
    } else {
        g.corner_radius_mm
    };

    GeometryDocument {
        dc: g.diameter_mm,
        dcx: milling.then_some(0.0),
        ha: milling.then(|| g.helix_angle_deg.unwrap_or(0.0)),
        lb: body_length,
        lcf: flute_length,
        nof: (g.flute_count > 0).then_some(g.flute_count),
        oal: overall_length,
        re: corner_radius,
        sfdm: Some(g.shank_diameter_mm.unwrap_or(g.diameter_mm)),
        sig: tool
            .tool_type
            .has_point_angle()
            .then(|| g.point_angle_deg.unwrap_or(default_point_angle(tool.tool_type))),
        ta: milling.then_some(0.0),
        assembly_gauge_length,
        length_below_holder,
        shoulder_diameter: milling.then(|| g.neck_diameter_mm.unwrap_or(g.diameter_mm)),
        shoulder_length,
        tip_length: g.tip_length_mm,
        upper_radius: milling.then_some(0.0),
    }
}

/// Map a holder onto the library's holder sub-document
pub fn map_holder(holder: &ToolHolder, last_modified: i64) -> HolderDocument {
    let guid = generate_guid();
    HolderDocument {
        description: holder.name.clone(),
        expressions: HolderExpressions {
            gauge_length: holder_gauge_expression(holder.segments.len()),
        },
        gauge_length: holder.gauge_length_mm,
        guid: guid.clone(),
        last_modified,
        product_id: holder.product_id.clone().unwrap_or_default(),
        product_link: holder.product_url.clone().unwrap_or_default(),
        reference_guid: guid,
        segments: holder
            .segments
            .iter()
            .map(|s| SegmentDocument {
                height: s.height_mm,
                lower_diameter: s.lower_diameter_mm,
                upper_diameter: s.upper_diameter_mm,
            })
            .collect(),
        holder_type: "holder".to_string(),
        unit: LIBRARY_UNIT.to_string(),
        vendor: holder.vendor.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolvault_core::{HolderId, HolderSegment, ToolGeometry, ToolId};

    fn tool(tool_type: ToolType) -> Tool {
        Tool::new(
            ToolId("t".to_string()),
            "Test tool".to_string(),
            tool_type,
            ToolGeometry::new(6.0, 3, 50.0, 15.0),
        )
    }

    fn holder(segments: usize) -> ToolHolder {
        ToolHolder {
            id: HolderId("h".to_string()),
            name: "ER20".to_string(),
            gauge_length_mm: 45.5,
            segments: (0..segments)
                .map(|i| HolderSegment {
                    height_mm: 10.0 + i as f64,
                    lower_diameter_mm: 30.0,
                    upper_diameter_mm: 40.0,
                })
                .collect(),
            collet_min_mm: None,
            collet_max_mm: None,
            vendor: Some("Techniks".to_string()),
            product_id: Some("22712".to_string()),
            product_url: None,
        }
    }

    #[test]
    fn test_format_expression_number() {
        assert_eq!(format_expression_number(3.175), "(3,175)");
        assert_eq!(format_expression_number(6.0), "6");
        assert_eq!(format_expression_number(17.0), "17");
        assert_eq!(format_expression_number(0.5), "(0,5)");
        assert_eq!(format_expression_number(12.7 + 2.0), "(14,7)");
    }

    #[test]
    fn test_format_expression_text() {
        assert_eq!(format_expression_text("Harvey"), "'Harvey'");
        assert_eq!(format_expression_text("1/4\" O'Flute"), "'1/4\" O\\'Flute'");
    }

    #[test]
    fn test_holder_gauge_expression_arity() {
        assert_eq!(holder_gauge_expression(0), "");
        assert_eq!(holder_gauge_expression(1), "segment_1_height");
        assert_eq!(
            holder_gauge_expression(3),
            "segment_1_height+segment_2_height+segment_3_height"
        );
    }

    #[test]
    fn test_substrate_code() {
        assert_eq!(substrate_code(None), "carbide");
        assert_eq!(substrate_code(Some("Micrograin Carbide")), "carbide");
        assert_eq!(substrate_code(Some("HSS-E")), "hss");
        assert_eq!(substrate_code(Some("Ceramic")), "ceramics");
        assert_eq!(substrate_code(Some("PCD")), "unspecified");
    }

    #[test]
    fn test_endmill_geometry_defaults() {
        let geometry = map_geometry(&tool(ToolType::FlatEndmill), None);
        assert_eq!(geometry.dc, 6.0);
        assert_eq!(geometry.nof, Some(3));
        assert_eq!(geometry.lcf, Some(15.0));
        assert_eq!(geometry.oal, Some(50.0));
        assert_eq!(geometry.sfdm, Some(6.0));
        assert_eq!(geometry.re, Some(0.0));
        assert_eq!(geometry.dcx, Some(0.0));
        assert_eq!(geometry.ta, Some(0.0));
        assert_eq!(geometry.upper_radius, Some(0.0));
        assert_eq!(geometry.ha, Some(0.0));
        assert_eq!(geometry.sig, None);
        assert_eq!(geometry.shoulder_length, Some(17.0));
        assert_eq!(geometry.shoulder_diameter, Some(6.0));
        assert_eq!(geometry.length_below_holder, Some(19.0));
        assert_eq!(geometry.lb, Some(19.0));
        assert_eq!(geometry.assembly_gauge_length, None);
    }

    #[test]
    fn test_drill_geometry_omits_endmill_keys() {
        let geometry = map_geometry(&tool(ToolType::Drill), None);
        assert_eq!(geometry.re, None);
        assert_eq!(geometry.dcx, None);
        assert_eq!(geometry.ta, None);
        assert_eq!(geometry.upper_radius, None);
        assert_eq!(geometry.ha, None);
        assert_eq!(geometry.shoulder_diameter, None);
        assert_eq!(geometry.sig, Some(118.0));

        let mut spot = tool(ToolType::SpotDrill);
        spot.geometry.corner_radius_mm = Some(0.2);
        let geometry = map_geometry(&spot, None);
        assert_eq!(geometry.re, Some(0.2));
        assert_eq!(geometry.sig, Some(90.0));

        let geometry = map_geometry(&tool(ToolType::Reamer), None);
        assert_eq!(geometry.sig, None);
    }

    #[test]
    fn test_explicit_geometry_wins() {
        let mut t = tool(ToolType::BullEndmill);
        t.geometry.shank_diameter_mm = Some(8.0);
        t.geometry.corner_radius_mm = Some(0.5);
        t.geometry.shoulder_length_mm = Some(20.0);
        t.geometry.length_below_holder_mm = Some(30.0);
        t.geometry.body_length_mm = Some(33.333);
        let geometry = map_geometry(&t, None);
        assert_eq!(geometry.sfdm, Some(8.0));
        assert_eq!(geometry.re, Some(0.5));
        assert_eq!(geometry.shoulder_length, Some(20.0));
        assert_eq!(geometry.length_below_holder, Some(30.0));
        assert_eq!(geometry.lb, Some(33.33));
    }

    #[test]
    fn test_body_length_fallbacks() {
        let mut t = tool(ToolType::FlatEndmill);
        t.geometry.flute_length_mm = 0.0;
        let geometry = map_geometry(&t, None);
        assert_eq!(geometry.lcf, None);
        assert_eq!(geometry.shoulder_length, None);
        assert_eq!(geometry.length_below_holder, None);
        assert_eq!(geometry.lb, Some(30.0));
    }

    #[test]
    fn test_assembly_gauge_length_with_holder() {
        let h = holder(2);
        let geometry = map_geometry(&tool(ToolType::FlatEndmill), Some(&h));
        assert_eq!(geometry.assembly_gauge_length, Some(64.5));
    }

    #[test]
    fn test_map_holder() {
        let h = holder(3);
        let doc = map_holder(&h, 1_700_000_000_000);
        assert_eq!(doc.guid, doc.reference_guid);
        assert_eq!(doc.segments.len(), 3);
        assert_eq!(doc.segments[1].height, 11.0);
        assert_eq!(
            doc.expressions.gauge_length,
            "segment_1_height+segment_2_height+segment_3_height"
        );
        assert_eq!(doc.holder_type, "holder");
        assert_eq!(doc.vendor, "Techniks");
        assert_eq!(doc.product_id, "22712");
    }

    #[test]
    fn test_drill_preset_retract_is_double_plunge() {
        let material = Material::new(
            MaterialId("st".to_string()),
            "Steel".to_string(),
            toolvault_core::MaterialCategory::Steel,
        );
        let params = CuttingParameters {
            rpm: 2000,
            feed_mm_min: 150.0,
            plunge_feed_mm_min: 150.0,
            axial_depth_mm: 15.0,
            radial_depth_mm: 3.0,
            surface_speed_m_min: 37.7,
            chip_load_mm: 0.05,
        };
        let preset = build_preset(&tool(ToolType::Drill), &material, &params, None);
        let Preset::Drill(drill) = preset else {
            panic!("expected drill preset");
        };
        assert_eq!(drill.v_f_retract, 300.0);
        assert!(!drill.use_feed_per_revolution);
        assert_eq!(drill.tool_coolant, "disabled");
        assert_eq!(drill.name, "Steel");

        let json = serde_json::to_string(&drill).unwrap();
        assert!(json.starts_with(r#"{"name":"Steel","n":2000,"#), "{}", json);
    }

    #[test]
    fn test_endmill_preset_feeds_follow_main_feed() {
        let material = Material::new(
            MaterialId("al".to_string()),
            "Aluminum".to_string(),
            toolvault_core::MaterialCategory::Aluminum,
        );
        let params = CuttingParameters {
            rpm: 12000,
            feed_mm_min: 1800.0,
            plunge_feed_mm_min: 900.0,
            axial_depth_mm: 6.0,
            radial_depth_mm: 3.0,
            surface_speed_m_min: 226.2,
            chip_load_mm: 0.05,
        };
        let preset = build_preset(&tool(ToolType::FlatEndmill), &material, &params, None);
        let Preset::Endmill(endmill) = preset else {
            panic!("expected endmill preset");
        };
        assert_eq!(endmill.v_f_transition, 1800.0);
        assert_eq!(endmill.v_f_ramp, 1800.0);
        assert_eq!(endmill.v_f_lead_in, 1800.0);
        assert_eq!(endmill.v_f_lead_out, 1800.0);
        assert_eq!(endmill.f_z, 0.05);
        assert_eq!(endmill.f_n, 0.15);
        assert_eq!(endmill.stepdown, 6.0);
        assert_eq!(endmill.stepover, 3.0);
        assert!(endmill.use_stepdown && endmill.use_stepover);
        assert_eq!(endmill.ramp_angle, 2.0);
    }
}
