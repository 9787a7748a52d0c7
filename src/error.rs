//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum BindError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Bootstrap errors (HB-001 to HB-003)
    // ─────────────────────────────────────────────────────────────
    /// Fatal: raised before any network activity. Echoes all three
    /// resolved values so the caller can see which one is missing.
    #[error(
        "HB-001: Incomplete bootstrap: api_key={api_key:?} entity_type={entity_type:?} entity_id={entity_id:?}"
    )]
    BootstrapIncomplete {
        api_key: Option<String>,
        entity_type: Option<String>,
        entity_id: Option<String>,
    },

    #[error("HB-002: Unknown entity type '{value}' (expected domain, group, or user)")]
    UnknownEntityType { value: String },

    #[error("HB-003: Unknown mode '{value}' (expected debug or production)")]
    UnknownMode { value: String },

    // ─────────────────────────────────────────────────────────────
    // Page manifest errors (HB-010 to HB-012)
    // ─────────────────────────────────────────────────────────────
    #[error("HB-010: Invalid page schema: expected '{expected}', got '{found}'")]
    BadSchema { expected: String, found: String },

    #[error("HB-011: Binding '{expression}' declares no targets")]
    NoTargets { expression: String },

    // ─────────────────────────────────────────────────────────────
    // Binding expression errors (HB-020 to HB-021)
    // ─────────────────────────────────────────────────────────────
    #[error("HB-020: Invalid binding field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("HB-021: Empty binding expression")]
    EmptyExpression,

    // ─────────────────────────────────────────────────────────────
    // Fetch errors (HB-030 to HB-031)
    // ─────────────────────────────────────────────────────────────
    #[error("HB-030: Invalid URL '{url}': {details}")]
    BadUrl { url: String, details: String },

    #[error("HB-031: Transport error for '{url}': {details}")]
    Transport { url: String, details: String },
}

impl FixSuggestion for BindError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            BindError::Io(_) => Some("Check file path and permissions"),
            BindError::BootstrapIncomplete { .. } => Some(
                "Provide api.key (or HALBIND_API_KEY), entity.type and entity.id in the page manifest",
            ),
            BindError::UnknownEntityType { .. } => Some("Use entity.type: domain, group, or user"),
            BindError::UnknownMode { .. } => Some("Use mode: debug or mode: production"),
            BindError::BadSchema { .. } => Some("Set schema: halbind/page@0.1"),
            BindError::NoTargets { .. } => Some("List at least one target slot per binding"),
            BindError::InvalidField { .. } => {
                Some("Use lowercase relation names, '.' for nested fields (e.g. chairs or group.name)")
            }
            BindError::EmptyExpression => Some("Bind a relation name, optionally followed by a template"),
            BindError::BadUrl { .. } => Some("Check the base URL and entity id"),
            BindError::Transport { .. } => Some("Check network connectivity and the API key"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_error_echoes_all_three_values() {
        let err = BindError::BootstrapIncomplete {
            api_key: Some("abc".into()),
            entity_type: None,
            entity_id: Some("42".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("HB-001"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("entity_type=None"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn every_variant_has_a_suggestion() {
        let err = BindError::EmptyExpression;
        assert!(err.fix_suggestion().is_some());

        let err = BindError::BadSchema {
            expected: "halbind/page@0.1".into(),
            found: "nope".into(),
        };
        assert!(err.fix_suggestion().unwrap().contains("halbind/page@0.1"));
    }
}
