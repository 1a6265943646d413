//! Domain data models
//!
//! Tools, materials, machines, holders, and the presets that tie a machine
//! to a material. All of these are read-only inputs to the calculation and
//! export engine.

pub mod holders;
pub mod machines;
pub mod materials;
pub mod tools;

pub use holders::{HolderId, HolderSegment, ToolHolder};
pub use machines::{CoolantType, Machine, MachineId, MachineMaterialPreset};
pub use materials::{Material, MaterialCategory, MaterialId, MaterialLibrary};
pub use tools::{
    CuttingPolicy, PostProcessSettings, ProductIdSource, ResolvedPostProcess, ShaftSegment,
    SlotAllocator, Tool, ToolGeometry, ToolId, ToolLibrary, ToolType,
};
