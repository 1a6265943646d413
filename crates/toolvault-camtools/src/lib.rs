//! # ToolVault CAM Tools
//!
//! Cutting-parameter calculation and CAM tool-library export.
//!
//! ## Stages
//!
//! - **Speeds and feeds**: spindle speed, feeds, and depths of cut for a tool
//!   on a machine in a material
//! - **Library export**: maps tools, holders, and per-material presets onto
//!   the CAM tool library document (format version 36)
//! - **Library validation**: structural checks before a library is released
//! - **Packaging**: wraps the document in a single-entry zip archive
//!
//! The [`pipeline`] module runs all of these against a catalog store.

pub mod error;
pub mod library_document;
pub mod library_export;
pub mod library_validator;
pub mod packaging;
pub mod pipeline;
pub mod speeds_feeds;

pub use error::{ExportError, ExportResult};
pub use library_document::{
    DrillPreset, EndmillPreset, GeometryDocument, HolderDocument, LibraryDocument,
    PostProcessDocument, Preset, ToolDocument, LIBRARY_FORMAT_VERSION,
};
pub use library_export::{generate_guid, serialize_library, LibraryEntry, ToolLibrarySerializer};
pub use library_validator::{validate_library, ValidationResult};
pub use packaging::{package_library, read_library, write_library_archive, DEFAULT_ENTRY_NAME};
pub use pipeline::{
    build_library, export_library, export_library_to_file, ExportEntry, ExportOptions,
    ExportOutcome, ExportRequest, DEFAULT_LIBRARY_NAME,
};
pub use speeds_feeds::{
    calculate_chip_thinning_feed, calculate_cutting_parameters, calculate_feed_rate,
    calculate_mrr, calculate_rpm, calculate_surface_speed, CuttingParameters, ParameterSource,
};
