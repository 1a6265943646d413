//! Command-line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use toolvault_camtools::{
    calculate_cutting_parameters, export_library_to_file, read_library, validate_library,
    CuttingParameters, ExportRequest, ValidationResult,
};
use toolvault_core::{Catalog, CatalogStore, MachineId, MaterialId, ToolId};
use toolvault_settings::{default_config_path, ExportSettings};

/// Cutting parameters and CAM tool-library export for CNC tool catalogs.
#[derive(Parser, Debug)]
#[command(name = "toolvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Export settings file (.toml or .json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print recommended cutting parameters for one tool, machine, and material
    Calc {
        /// Catalog file (JSON)
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        tool: String,
        #[arg(long)]
        machine: String,
        #[arg(long)]
        material: String,
    },

    /// Build, validate, and package a tool library archive
    Export {
        /// Catalog file (JSON)
        #[arg(long)]
        catalog: PathBuf,
        /// Export request file (JSON)
        #[arg(long)]
        request: PathBuf,
        /// Output archive path
        #[arg(short, long)]
        out: PathBuf,
        /// Package the library even if validation fails
        #[arg(long)]
        allow_invalid: bool,
    },

    /// Validate a tools.json file or a packaged archive
    Validate {
        /// Library file (.json or .zip)
        file: PathBuf,
    },
}

/// Load export settings from `--config`, the default location, or defaults
pub fn load_settings(path: Option<&Path>) -> Result<ExportSettings> {
    match path {
        Some(path) => ExportSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display())),
        None => match default_config_path() {
            Ok(path) => Ok(ExportSettings::load_or_default(&path)?),
            Err(_) => Ok(ExportSettings::default()),
        },
    }
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    Catalog::load_from_file(path)
        .with_context(|| format!("Failed to load catalog {}", path.display()))
}

/// Compute cutting parameters for a single catalog combination
pub fn calc(
    catalog: &Catalog,
    tool: &str,
    machine: &str,
    material: &str,
) -> Result<CuttingParameters> {
    let tool = catalog.tool(&ToolId(tool.to_string()))?;
    let machine_id = MachineId(machine.to_string());
    let material_id = MaterialId(material.to_string());
    let machine = catalog.machine(&machine_id)?;
    let material = catalog.material(&material_id)?;

    Ok(calculate_cutting_parameters(
        &tool.geometry,
        tool.tool_type,
        machine,
        material,
        catalog.preset_for(&machine_id, &material_id),
    ))
}

/// Read and validate a library file
pub fn validate_file(path: &Path) -> Result<ValidationResult> {
    let document = read_library(path)
        .with_context(|| format!("Failed to read library {}", path.display()))?;
    Ok(validate_library(&document))
}

/// Run a parsed command. Returns false when the command's check failed.
pub fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Calc {
            catalog,
            tool,
            machine,
            material,
        } => {
            let catalog = load_catalog(&catalog)?;
            let params = calc(&catalog, &tool, &machine, &material)?;
            println!("{}", serde_json::to_string_pretty(&params)?);
            Ok(true)
        }
        Command::Export {
            catalog,
            request,
            out,
            allow_invalid,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let catalog = load_catalog(&catalog)?;
            let content = std::fs::read_to_string(&request)
                .with_context(|| format!("Failed to read request {}", request.display()))?;
            let request: ExportRequest = serde_json::from_str(&content)
                .with_context(|| format!("Invalid export request {}", request.display()))?;

            let mut options = settings.to_export_options();
            if allow_invalid {
                options.require_valid = false;
            }

            let outcome = export_library_to_file(&catalog, &request, &options, &out)?;
            for err in &outcome.validation.errors {
                error!("{}", err);
            }
            info!(
                "Exported {} tool(s) to {}",
                outcome.document.data.len(),
                out.display()
            );
            Ok(true)
        }
        Command::Validate { file } => {
            let result = validate_file(&file)?;
            for err in &result.errors {
                println!("{}", err);
            }
            if result.valid {
                info!("Validation passed");
            }
            Ok(result.valid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CATALOG: &str = r#"{
        "tools": [{
            "id": "em6",
            "name": "6mm 3FL",
            "tool_type": "flat_endmill",
            "geometry": {"diameter_mm": 6.0, "flute_count": 3, "overall_length_mm": 50.0, "flute_length_mm": 15.0}
        }],
        "machines": [{"id": "router", "name": "Router", "min_rpm": 6000, "max_rpm": 18000}],
        "materials": [{"id": "al", "name": "Aluminum", "category": "aluminum"}]
    }"#;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from([
            "toolvault", "calc", "--catalog", "c.json", "--tool", "em6", "--machine", "router",
            "--material", "al",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Calc { ref tool, .. } if tool == "em6"));

        let cli = Cli::try_parse_from(["toolvault", "-v", "validate", "tools.json"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Validate { .. }));

        assert!(Cli::try_parse_from(["toolvault", "export", "--catalog", "c.json"]).is_err());
    }

    #[test]
    fn test_calc_resolves_catalog_entries() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let params = calc(&catalog, "em6", "router", "al").unwrap();
        assert_eq!(params.rpm, 13263);
        assert_eq!(params.chip_load_mm, 0.075);
        assert_eq!(params.feed_mm_min, 2984.0);

        assert!(calc(&catalog, "em6", "router", "steel").is_err());
    }

    #[test]
    fn test_export_then_validate() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("catalog.json");
        let request = dir.path().join("request.json");
        let out = dir.path().join("library.zip");
        let config = dir.path().join("export.toml");
        std::fs::write(&catalog, CATALOG).unwrap();
        std::fs::write(
            &request,
            r#"{"entries": [{"tool_id": "em6"}], "machine_id": "router", "material_ids": ["al"]}"#,
        )
        .unwrap();
        ExportSettings::default().save_to_file(&config).unwrap();

        let ok = run(Cli {
            config: Some(config),
            verbose: false,
            command: Command::Export {
                catalog,
                request,
                out: out.clone(),
                allow_invalid: false,
            },
        })
        .unwrap();
        assert!(ok);

        let result = validate_file(&out).unwrap();
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn test_validate_reports_failure() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("tools.json");
        std::fs::write(&file, r#"{"data": [], "version": 36}"#).unwrap();

        let ok = run(Cli {
            config: None,
            verbose: false,
            command: Command::Validate { file },
        })
        .unwrap();
        assert!(!ok);
    }
}
