use toolvault_core::data::tools::*;

fn endmill(id: &str, name: &str, diameter: f64) -> Tool {
    let mut tool = Tool::new(
        ToolId(id.to_string()),
        name.to_string(),
        ToolType::FlatEndmill,
        ToolGeometry::new(diameter, 3, 50.0, 15.0),
    );
    tool.vendor = Some("Harvey".to_string());
    tool
}

#[test]
fn test_tool_library_add_and_remove() {
    let mut library = ToolLibrary::new();
    library.add_tool(endmill("em3", "3mm endmill", 3.0));
    library.add_tool(endmill("em6", "6mm endmill", 6.0));
    assert_eq!(library.len(), 2);

    let removed = library.remove_tool(&ToolId("em3".to_string()));
    assert!(removed.is_some());
    assert_eq!(library.len(), 1);
    assert!(library.get_tool(&ToolId("em3".to_string())).is_none());
}

#[test]
fn test_tool_library_replaces_same_id() {
    let mut library = ToolLibrary::new();
    library.add_tool(endmill("em6", "old", 6.0));
    library.add_tool(endmill("em6", "new", 6.0));
    assert_eq!(library.len(), 1);
    assert_eq!(library.get_tool(&ToolId("em6".to_string())).unwrap().name, "new");
}

#[test]
fn test_tool_library_search() {
    let mut library = ToolLibrary::new();
    library.add_tool(endmill("em3", "3mm Square", 3.0));
    library.add_tool(endmill("em6", "6mm Square", 6.0));

    let mut drill = Tool::new(
        ToolId("dr5".to_string()),
        "5mm Jobber".to_string(),
        ToolType::Drill,
        ToolGeometry::new(5.0, 2, 86.0, 52.0),
    );
    drill.vendor = Some("Guhring".to_string());
    library.add_tool(drill);

    assert_eq!(library.search_by_name("square").len(), 2);
    assert_eq!(library.search_by_name("guhring").len(), 1);
    assert_eq!(library.get_tools_by_type(ToolType::Drill).len(), 1);
    assert_eq!(library.search_by_diameter(4.0, 6.0).len(), 2);

    let ids: Vec<&str> = library
        .get_all_tools()
        .iter()
        .map(|t| t.id.0.as_str())
        .collect();
    assert_eq!(ids, vec!["dr5", "em3", "em6"]);
}

#[test]
fn test_tool_deserializes_with_optional_fields_absent() {
    let json = r#"{
        "id": "em6",
        "name": "6mm endmill",
        "tool_type": "bull_endmill",
        "geometry": {
            "diameter_mm": 6.0,
            "flute_count": 4,
            "overall_length_mm": 57.0,
            "flute_length_mm": 13.0,
            "corner_radius_mm": 0.5
        }
    }"#;
    let tool: Tool = serde_json::from_str(json).unwrap();
    assert_eq!(tool.tool_type, ToolType::BullEndmill);
    assert_eq!(tool.geometry.corner_radius_mm, Some(0.5));
    assert!(tool.geometry.helix_angle_deg.is_none());
    assert!(tool.shaft_segments.is_empty());
    assert!(tool.post_process.is_none());
}
