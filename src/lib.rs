//! # ToolVault
//!
//! Cutting-parameter calculation and CAM tool-library export for CNC tool,
//! machine, and material catalogs.
//!
//! ## Architecture
//!
//! ToolVault is organized as a workspace with multiple crates:
//!
//! 1. **toolvault-core** - Domain types, tool-type policy, catalog store
//! 2. **toolvault-camtools** - Speeds and feeds, library serializer, validator, packaging
//! 3. **toolvault-settings** - Export settings persistence and validation
//! 4. **toolvault** - Command-line binary that integrates all crates

pub mod cli;

pub use toolvault_camtools::{
    calculate_cutting_parameters, export_library, serialize_library, validate_library,
    CuttingParameters, ExportError, ExportOptions, ExportRequest, LibraryDocument,
    ValidationResult,
};
pub use toolvault_core::{Catalog, CatalogStore, Error, Result};
pub use toolvault_settings::ExportSettings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging on stderr with:
/// - RUST_LOG environment variable support
/// - `info` as the default level, `debug` when `verbose` is set
///
/// Command output goes to stdout, so logs never mix with it.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
