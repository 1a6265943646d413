//! Library validator
//!
//! Structural checks run on an assembled library before it leaves the system.
//! Every defect is reported; nothing short-circuits and nothing is modified.

use serde::Serialize;
use tracing::warn;

use crate::library_document::{LibraryDocument, Preset};

/// Outcome of validating a library document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty
    pub valid: bool,
    /// Human-readable defects, in document order
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }
}

fn check_preset(result: &mut ValidationResult, tool_number: usize, preset: &Preset) {
    if preset.rpm() == 0 {
        result.add_error(format!(
            "Tool {}, preset \"{}\": Invalid RPM",
            tool_number,
            preset.name()
        ));
    }

    let has_feed = preset.feed().is_some_and(|f| f > 0.0) || preset.plunge_feed() > 0.0;
    if !has_feed {
        result.add_error(format!(
            "Tool {}, preset \"{}\": Invalid feed rate",
            tool_number,
            preset.name()
        ));
    }
}

/// Validate a library document.
pub fn validate_library(document: &LibraryDocument) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if document.data.is_empty() {
        result.add_error("Library contains no tools");
    }

    for (index, tool) in document.data.iter().enumerate() {
        let n = index + 1;

        let diameter = tool.geometry.dc;
        if diameter.is_nan() || diameter <= 0.0 {
            result.add_error(format!("Tool {}: Invalid or missing diameter", n));
        }
        if tool.tool_type.trim().is_empty() {
            result.add_error(format!("Tool {}: Missing tool type", n));
        }
        if tool.start_values.presets.is_empty() {
            result.add_error(format!("Tool {}: No cutting presets defined", n));
        }
        for preset in &tool.start_values.presets {
            check_preset(&mut result, n, preset);
        }
    }

    if !result.valid {
        warn!(errors = result.errors.len(), "Tool library failed validation");
    }
    result
}
