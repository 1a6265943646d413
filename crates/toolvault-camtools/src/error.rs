//! Error types for the export pipeline.
//!
//! The calculator, serializer, and validator are total and never produce
//! these. Errors come from resolving entities, encoding, and writing archives.

use std::io;
use thiserror::Error;
use toolvault_core::CatalogError;

/// Errors that can occur while exporting a tool library.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A referenced tool, machine, material, or holder could not be resolved.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The request itself is unusable.
    #[error("Invalid export request: {0}")]
    InvalidRequest(String),

    /// The assembled document was rejected by the validator.
    #[error("Library failed validation: {}", errors.join("; "))]
    ValidationFailed {
        /// Defect messages in the order they were found.
        errors: Vec<String>,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The archive could not be written or read.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use toolvault_core::EntityKind;

    #[test]
    fn test_export_error_display() {
        let err = ExportError::InvalidRequest("no tools selected".to_string());
        assert_eq!(err.to_string(), "Invalid export request: no tools selected");

        let err = ExportError::ValidationFailed {
            errors: vec![
                "Tool 1: Invalid or missing diameter".to_string(),
                "Tool 1: No cutting presets defined".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Library failed validation: Tool 1: Invalid or missing diameter; Tool 1: No cutting presets defined"
        );
    }

    #[test]
    fn test_error_conversion() {
        let catalog_err = CatalogError::NotFound {
            kind: EntityKind::Tool,
            id: "em6".to_string(),
        };
        let err: ExportError = catalog_err.into();
        assert!(matches!(err, ExportError::Catalog(_)));
        assert_eq!(err.to_string(), "Catalog error: tool not found: em6");

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: ExportError = io_err.into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
