//! Export pipeline
//!
//! Resolves an export request against a catalog, serializes the library,
//! validates it, and packages the result.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use toolvault_core::{
    CatalogStore, HolderId, MachineId, Material, MaterialId, PostProcessSettings,
    ProductIdSource, SlotAllocator, ToolId,
};

use crate::error::{ExportError, ExportResult};
use crate::library_document::LibraryDocument;
use crate::library_export::{LibraryEntry, ToolLibrarySerializer};
use crate::library_validator::{validate_library, ValidationResult};
use crate::packaging::{package_library, write_archive, DEFAULT_ENTRY_NAME};

/// Library name used when neither the request nor the options carry one
pub const DEFAULT_LIBRARY_NAME: &str = "ToolVault Library";

/// One tool placement in an export request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub tool_id: ToolId,
    /// Explicit slot; the lowest free slot is assigned when absent
    #[serde(default)]
    pub slot: Option<u32>,
    /// Holder for this placement; falls back to the tool's default holder
    #[serde(default)]
    pub holder_id: Option<HolderId>,
    #[serde(default)]
    pub post_process: Option<PostProcessSettings>,
}

impl ExportEntry {
    pub fn new(tool_id: ToolId) -> Self {
        Self {
            tool_id,
            slot: None,
            holder_id: None,
            post_process: None,
        }
    }

    pub fn with_slot(mut self, slot: u32) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// What to export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub library_name: Option<String>,
    pub entries: Vec<ExportEntry>,
    pub machine_id: MachineId,
    pub material_ids: Vec<MaterialId>,
}

/// Pipeline options, usually taken from the export settings file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub product_id_source: ProductIdSource,
    pub library_name: String,
    pub archive_entry_name: String,
    pub pretty_json: bool,
    /// Refuse to package a document the validator rejects
    pub require_valid: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            product_id_source: ProductIdSource::default(),
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            archive_entry_name: DEFAULT_ENTRY_NAME.to_string(),
            pretty_json: true,
            require_valid: true,
        }
    }
}

/// Result of a completed export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub library_name: String,
    pub document: LibraryDocument,
    pub validation: ValidationResult,
    /// Zip archive bytes
    pub archive: Vec<u8>,
}

fn assign_slots(entries: &[ExportEntry]) -> ExportResult<Vec<u32>> {
    let mut slots = SlotAllocator::default();
    for slot in entries.iter().filter_map(|e| e.slot) {
        if !slots.reserve(slot) {
            return Err(ExportError::InvalidRequest(format!(
                "slot {} assigned to more than one tool",
                slot
            )));
        }
    }
    Ok(entries
        .iter()
        .map(|e| e.slot.unwrap_or_else(|| slots.allocate()))
        .collect())
}

/// Resolve, serialize, and validate without packaging
pub fn build_library<S: CatalogStore>(
    store: &S,
    request: &ExportRequest,
    options: &ExportOptions,
) -> ExportResult<(LibraryDocument, ValidationResult)> {
    let library_name = request
        .library_name
        .as_deref()
        .unwrap_or(&options.library_name);

    let machine = store.machine(&request.machine_id)?;
    let materials: Vec<Material> = request
        .material_ids
        .iter()
        .map(|id| store.material(id).cloned())
        .collect::<Result<_, _>>()?;
    let presets: HashMap<_, _> = request
        .material_ids
        .iter()
        .filter_map(|id| {
            store
                .preset_for(&request.machine_id, id)
                .map(|p| (id.clone(), p.clone()))
        })
        .collect();

    let slots = assign_slots(&request.entries)?;
    let mut entries = Vec::with_capacity(request.entries.len());
    for (entry, slot) in request.entries.iter().zip(slots) {
        let tool = store.tool(&entry.tool_id)?;
        let holder = match entry.holder_id.as_ref().or(tool.default_holder_id.as_ref()) {
            Some(id) => Some(store.holder(id)?),
            None => None,
        };
        if let Some(holder) = holder {
            let shank = tool.geometry.shank_diameter_mm.unwrap_or(tool.geometry.diameter_mm);
            if !holder.accepts_shank(shank) {
                warn!(
                    tool = %tool.id,
                    holder = %holder.id,
                    shank_mm = shank,
                    "Holder collet range does not fit tool shank"
                );
            }
        }
        entries.push(LibraryEntry {
            tool,
            slot,
            holder,
            post_process: entry.post_process.as_ref(),
        });
    }

    let document = ToolLibrarySerializer::new(options.product_id_source).serialize(
        library_name,
        &entries,
        machine,
        &materials,
        &presets,
    );
    let validation = validate_library(&document);
    Ok((document, validation))
}

/// Run the full export and return the packaged archive
pub fn export_library<S: CatalogStore>(
    store: &S,
    request: &ExportRequest,
    options: &ExportOptions,
) -> ExportResult<ExportOutcome> {
    let (document, validation) = build_library(store, request, options)?;

    if !validation.valid {
        if options.require_valid {
            return Err(ExportError::ValidationFailed {
                errors: validation.errors,
            });
        }
        warn!(
            errors = validation.errors.len(),
            "Packaging tool library despite validation errors"
        );
    }

    let archive = package_library(&document, &options.archive_entry_name, options.pretty_json)?;
    let library_name = request
        .library_name
        .clone()
        .unwrap_or_else(|| options.library_name.clone());

    info!(
        library = %library_name,
        tools = document.data.len(),
        bytes = archive.len(),
        "Exported tool library"
    );

    Ok(ExportOutcome {
        library_name,
        document,
        validation,
        archive,
    })
}

/// Run the full export and write the archive to `path`
pub fn export_library_to_file<S: CatalogStore, P: AsRef<Path>>(
    store: &S,
    request: &ExportRequest,
    options: &ExportOptions,
    path: P,
) -> ExportResult<ExportOutcome> {
    let outcome = export_library(store, request, options)?;
    write_archive(path.as_ref(), &outcome.archive, outcome.document.data.len())?;
    Ok(outcome)
}
