//! Error handling for ToolVault
//!
//! Provides error types for the domain layer:
//! - Catalog errors (missing or inconsistent entities)
//! - I/O and JSON errors when loading catalogs
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Kind of catalog entity, used in lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tool,
    Machine,
    Material,
    Holder,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tool => write!(f, "tool"),
            Self::Machine => write!(f, "machine"),
            Self::Material => write!(f, "material"),
            Self::Holder => write!(f, "holder"),
        }
    }
}

/// Catalog error type
///
/// Represents errors raised while resolving entities from a catalog store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// No entity with this ID exists
    #[error("{kind} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        kind: EntityKind,
        /// The ID that was not found.
        id: String,
    },

    /// Two entities share an ID
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// The kind of entity.
        kind: EntityKind,
        /// The duplicated ID.
        id: String,
    },

    /// A preset violates its positivity invariant
    #[error("Invalid preset for machine {machine} and material {material}: {reason}")]
    InvalidPreset {
        /// The machine the preset is scoped to.
        machine: String,
        /// The material the preset is scoped to.
        material: String,
        /// Why the preset was rejected.
        reason: String,
    },
}

/// Main error type for the ToolVault domain layer
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a missing-entity error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Catalog(CatalogError::NotFound { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound {
            kind: EntityKind::Machine,
            id: "haas-vf2".to_string(),
        };
        assert_eq!(err.to_string(), "machine not found: haas-vf2");

        let err = CatalogError::DuplicateId {
            kind: EntityKind::Tool,
            id: "em6".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate tool id: em6");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = CatalogError::NotFound {
            kind: EntityKind::Holder,
            id: "bt30".to_string(),
        }
        .into();
        assert!(err.is_not_found());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::Io(_)));
    }
}
