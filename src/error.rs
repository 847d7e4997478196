//! Error types with fix suggestions
//!
//! Store operations never fail: a missing item is `None` and a rejected
//! write is `false`. Errors only come from the edges (reading scripts,
//! parsing snapshots, validating steps).

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Script validation (PD-010 to PD-012)
    // ─────────────────────────────────────────────────────────────
    #[error("PD-010: Invalid schema: expected '{expected}', got '{found}'")]
    InvalidSchema { expected: String, found: String },

    #[error("PD-011: Step {step} has an empty item name")]
    EmptyName { step: usize },

    #[error("PD-012: Script has no steps")]
    NoSteps,
}

pub type Result<T> = std::result::Result<T, DataError>;

impl FixSuggestion for DataError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            DataError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            DataError::Json(_) => Some("Ensure the snapshot is a JSON/YAML object"),
            DataError::Io(_) => Some("Check file path and permissions"),
            DataError::InvalidSchema { .. } => {
                Some("Start the script with: schema: pilet-data/script@0.1")
            }
            DataError::EmptyName { .. } => Some("Give every step a non-empty name"),
            DataError::NoSteps => Some("Add at least one write, try_write, read or reset step"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_message_has_code() {
        let err = DataError::InvalidSchema {
            expected: "pilet-data/script@0.1".into(),
            found: "nope".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("PD-010"));
        assert!(msg.contains("nope"));
    }

    #[test]
    fn every_validation_error_has_a_suggestion() {
        let errors = [
            DataError::InvalidSchema {
                expected: String::new(),
                found: String::new(),
            },
            DataError::EmptyName { step: 2 },
            DataError::NoSteps,
        ];
        for err in &errors {
            assert!(err.fix_suggestion().is_some(), "{err}");
        }
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DataError = io.into();
        assert!(matches!(err, DataError::Io(_)));
    }
}
