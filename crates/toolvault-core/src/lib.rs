//! # ToolVault Core
//!
//! Domain types for ToolVault: cutting tools, materials, machines, holders,
//! and machine/material presets, plus the catalog store the export pipeline
//! resolves them from.

pub mod catalog;
pub mod data;
pub mod error;

pub use catalog::{Catalog, CatalogFile, CatalogStore};

pub use data::{
    CoolantType, CuttingPolicy, HolderId, HolderSegment, Machine, MachineId,
    MachineMaterialPreset, Material, MaterialCategory, MaterialId, MaterialLibrary,
    PostProcessSettings, ProductIdSource, ResolvedPostProcess, ShaftSegment, SlotAllocator, Tool,
    ToolGeometry, ToolHolder, ToolId, ToolLibrary, ToolType,
};

pub use error::{CatalogError, EntityKind, Error, Result};
