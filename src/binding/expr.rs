//! Binding expression parsing
//!
//! An expression splits on the FIRST whitespace boundary only: everything
//! before it is the lookup field, everything after it (if anything) is the
//! interpolation template, kept verbatim. Fields are dot-joined relation
//! names.
//!
//! Field validation is a manual single-pass check: the alphabet is tiny
//! (lowercase letters, digits, `_`, `-`, with `.` as the segment joiner)
//! and a regex would add compile cost for no expressive gain.

use crate::error::BindError;

/// A parsed binding expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingExpr {
    /// Relation field to look up, possibly dotted (`group.name`).
    pub field: String,
    /// Optional per-item interpolation template (`${field}` tokens).
    pub template: Option<String>,
}

/// Parse a raw expression into field and optional template.
pub fn parse_expression(raw: &str) -> Result<BindingExpr, BindError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BindError::EmptyExpression);
    }

    let (field, template) = match raw.split_once(char::is_whitespace) {
        Some((field, rest)) => {
            let rest = rest.trim_start();
            let template = if rest.is_empty() { None } else { Some(rest.to_string()) };
            (field, template)
        }
        None => (raw, None),
    };

    validate_field(field)?;

    Ok(BindingExpr {
        field: field.to_string(),
        template,
    })
}

/// Validate a dotted relation field.
///
/// Each segment must be non-empty and contain only `[a-z0-9_-]`. Dots are
/// the segment joiner and are reserved for descending into sub-objects.
fn validate_field(field: &str) -> Result<(), BindError> {
    for segment in field.split('.') {
        if segment.is_empty() {
            return Err(BindError::InvalidField {
                field: field.to_string(),
                reason: "empty segment (leading, trailing, or doubled '.')".into(),
            });
        }
        for &byte in segment.as_bytes() {
            let ok = byte.is_ascii_lowercase()
                || byte.is_ascii_digit()
                || byte == b'_'
                || byte == b'-';
            if !ok {
                return Err(BindError::InvalidField {
                    field: field.to_string(),
                    reason: "segments may contain only lowercase letters, digits, '_' and '-'"
                        .into(),
                });
            }
        }
    }
    Ok(())
}
