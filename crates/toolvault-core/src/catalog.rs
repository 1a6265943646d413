//! Catalog store
//!
//! The export pipeline reads tools, machines, materials, holders, and presets
//! by ID through [`CatalogStore`]. Persistence lives behind this trait; the
//! in-memory [`Catalog`] backs the CLI and the tests and can be loaded from a
//! JSON catalog file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::data::{
    HolderId, Machine, MachineId, MachineMaterialPreset, Material, MaterialId, MaterialLibrary,
    Tool, ToolHolder, ToolId, ToolLibrary,
};
use crate::error::{CatalogError, EntityKind, Result};

/// Read access to catalog entities by ID
pub trait CatalogStore {
    /// Look up a tool
    fn tool(&self, id: &ToolId) -> std::result::Result<&Tool, CatalogError>;

    /// Look up a machine
    fn machine(&self, id: &MachineId) -> std::result::Result<&Machine, CatalogError>;

    /// Look up a material
    fn material(&self, id: &MaterialId) -> std::result::Result<&Material, CatalogError>;

    /// Look up a holder
    fn holder(&self, id: &HolderId) -> std::result::Result<&ToolHolder, CatalogError>;

    /// The preset scoped to this machine and material, if one was defined
    fn preset_for(
        &self,
        machine: &MachineId,
        material: &MaterialId,
    ) -> Option<&MachineMaterialPreset>;
}

/// On-disk catalog layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub tools: Vec<Tool>,
    pub machines: Vec<Machine>,
    pub materials: Vec<Material>,
    pub holders: Vec<ToolHolder>,
    pub presets: Vec<MachineMaterialPreset>,
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: ToolLibrary,
    materials: MaterialLibrary,
    machines: HashMap<MachineId, Machine>,
    holders: HashMap<HolderId, ToolHolder>,
    presets: HashMap<(MachineId, MaterialId), MachineMaterialPreset>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            tools = catalog.tools.len(),
            materials = catalog.materials.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Ok(Self::from_file(file)?)
    }

    /// Build a catalog, rejecting duplicate IDs and malformed presets
    pub fn from_file(file: CatalogFile) -> std::result::Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for tool in file.tools {
            if catalog.tools.get_tool(&tool.id).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: EntityKind::Tool,
                    id: tool.id.0,
                });
            }
            catalog.tools.add_tool(tool);
        }
        for material in file.materials {
            if catalog.materials.get_material(&material.id).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: EntityKind::Material,
                    id: material.id.0,
                });
            }
            catalog.materials.add_material(material);
        }
        for machine in file.machines {
            if catalog.machines.contains_key(&machine.id) {
                return Err(CatalogError::DuplicateId {
                    kind: EntityKind::Machine,
                    id: machine.id.0,
                });
            }
            catalog.machines.insert(machine.id.clone(), machine);
        }
        for holder in file.holders {
            if catalog.holders.contains_key(&holder.id) {
                return Err(CatalogError::DuplicateId {
                    kind: EntityKind::Holder,
                    id: holder.id.0,
                });
            }
            catalog.holders.insert(holder.id.clone(), holder);
        }
        for preset in file.presets {
            catalog.add_preset(preset)?;
        }
        Ok(catalog)
    }

    /// Add or replace a tool
    pub fn add_tool(&mut self, tool: Tool) {
        self.tools.add_tool(tool);
    }

    /// Add or replace a material
    pub fn add_material(&mut self, material: Material) {
        self.materials.add_material(material);
    }

    /// Add or replace a machine
    pub fn add_machine(&mut self, machine: Machine) {
        self.machines.insert(machine.id.clone(), machine);
    }

    /// Add or replace a holder
    pub fn add_holder(&mut self, holder: ToolHolder) {
        self.holders.insert(holder.id.clone(), holder);
    }

    /// Add or replace the preset for a machine/material pair
    pub fn add_preset(
        &mut self,
        preset: MachineMaterialPreset,
    ) -> std::result::Result<(), CatalogError> {
        if !preset.is_well_formed() {
            return Err(CatalogError::InvalidPreset {
                machine: preset.machine_id.0,
                material: preset.material_id.0,
                reason: "surface speed and chip load must be positive".to_string(),
            });
        }
        let key = (preset.machine_id.clone(), preset.material_id.clone());
        self.presets.insert(key, preset);
        Ok(())
    }

    /// The tool library backing this catalog
    pub fn tools(&self) -> &ToolLibrary {
        &self.tools
    }

    /// The material library backing this catalog
    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }
}

impl CatalogStore for Catalog {
    fn tool(&self, id: &ToolId) -> std::result::Result<&Tool, CatalogError> {
        self.tools.get_tool(id).ok_or_else(|| CatalogError::NotFound {
            kind: EntityKind::Tool,
            id: id.0.clone(),
        })
    }

    fn machine(&self, id: &MachineId) -> std::result::Result<&Machine, CatalogError> {
        self.machines.get(id).ok_or_else(|| CatalogError::NotFound {
            kind: EntityKind::Machine,
            id: id.0.clone(),
        })
    }

    fn material(&self, id: &MaterialId) -> std::result::Result<&Material, CatalogError> {
        self.materials
            .get_material(id)
            .ok_or_else(|| CatalogError::NotFound {
                kind: EntityKind::Material,
                id: id.0.clone(),
            })
    }

    fn holder(&self, id: &HolderId) -> std::result::Result<&ToolHolder, CatalogError> {
        self.holders.get(id).ok_or_else(|| CatalogError::NotFound {
            kind: EntityKind::Holder,
            id: id.0.clone(),
        })
    }

    fn preset_for(
        &self,
        machine: &MachineId,
        material: &MaterialId,
    ) -> Option<&MachineMaterialPreset> {
        self.presets.get(&(machine.clone(), material.clone()))
    }
}
