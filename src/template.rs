//! Single-pass template interpolation with caching
//!
//! Binding templates interpolate `${field}` tokens against one entity's
//! fields. Templates repeat across page loads and per list item, so the
//! tokenized form is cached:
//! - Tokenizes a template once and caches the result
//! - Performs single-pass interpolation, no regex passes
//! - Uses Arc for zero-copy sharing of tokenized templates

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::ops::Range;
use std::sync::Arc;

use crate::formatter::escape_html;

/// Token representing a parsed template fragment
#[derive(Debug, Clone)]
pub enum Token {
    /// Literal text (stores range in original string)
    Literal(Range<usize>),
    /// Field reference: ${name}
    Field(String),
}

/// Template interpolator with caching
pub struct TemplateInterpolator {
    /// Cache of parsed templates
    cache: DashMap<String, Arc<Vec<Token>>>,
}

impl Default for TemplateInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateInterpolator {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Parse a template into tokens (with caching)
    pub fn tokenize(&self, template: &str) -> Arc<Vec<Token>> {
        if let Some(cached) = self.cache.get(template) {
            return Arc::clone(&cached);
        }

        let mut tokens = Vec::new();
        let mut chars = template.char_indices().peekable();
        let mut literal_start = 0;

        while let Some((i, ch)) = chars.next() {
            if ch == '$' && chars.peek().map(|(_, c)| *c) == Some('{') {
                chars.next(); // consume '{'
                if let Some((name, end)) = parse_field_ref(&mut chars, i + 2, template) {
                    if i > literal_start {
                        tokens.push(Token::Literal(literal_start..i));
                    }
                    tokens.push(Token::Field(name));
                    literal_start = end;
                }
                // Unterminated "${" stays literal text.
            }
        }

        if literal_start < template.len() {
            tokens.push(Token::Literal(literal_start..template.len()));
        }

        let tokens = Arc::new(tokens);
        self.cache.insert(template.to_string(), tokens.clone());
        tokens
    }

    /// Interpolate a template against one entity's fields.
    ///
    /// Scalar field values substitute in (HTML-escaped); an unknown field,
    /// a null, or a structured value re-emits the original `${name}` token
    /// verbatim.
    pub fn interpolate(&self, template: &str, entity: &Value) -> String {
        let tokens = self.tokenize(template);
        let mut result = String::with_capacity(template.len() * 2);

        for token in tokens.iter() {
            match token {
                Token::Literal(range) => {
                    result.push_str(&template[range.clone()]);
                }
                Token::Field(name) => match entity.get(name) {
                    Some(Value::String(s)) => result.push_str(&escape_html(s)),
                    Some(Value::Number(n)) => result.push_str(&n.to_string()),
                    Some(Value::Bool(b)) => result.push_str(&b.to_string()),
                    _ => {
                        result.push_str("${");
                        result.push_str(name);
                        result.push('}');
                    }
                },
            }
        }

        result
    }
}

/// Parse the field name of a `${name}` token; returns (name, end offset).
fn parse_field_ref(
    chars: &mut std::iter::Peekable<std::str::CharIndices>,
    start_pos: usize,
    template: &str,
) -> Option<(String, usize)> {
    while let Some((i, ch)) = chars.peek() {
        if *ch == '}' {
            let end = *i;
            chars.next();
            if end > start_pos {
                return Some((template[start_pos..end].to_string(), end + 1));
            }
            return None;
        }
        chars.next();
    }
    None
}

/// Global interpolator instance
pub static TEMPLATES: Lazy<TemplateInterpolator> = Lazy::new(TemplateInterpolator::new);

/// Convenience function for interpolating a template
pub fn interpolate(template: &str, entity: &Value) -> String {
    TEMPLATES.interpolate(template, entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tokenize_plain_literal() {
        let interp = TemplateInterpolator::new();
        let tokens = interp.tokenize("plain text");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0], Token::Literal(r) if *r == (0..10)));
    }

    #[test]
    fn tokenize_mixed() {
        let interp = TemplateInterpolator::new();
        let tokens = interp.tokenize("Chair: ${name} (${id})");
        // Literal, Field, Literal, Field, Literal
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn substitutes_entity_fields() {
        let entity = json!({"name": "Ada", "id": 42});
        assert_eq!(
            interpolate("Chair: ${name} (${id})", &entity),
            "Chair: Ada (42)"
        );
    }

    #[test]
    fn unknown_token_left_verbatim() {
        let entity = json!({"name": "Ada"});
        assert_eq!(
            interpolate("${name} from ${country}", &entity),
            "Ada from ${country}"
        );
    }

    #[test]
    fn null_and_structured_values_left_verbatim() {
        let entity = json!({"a": null, "b": {"x": 1}});
        assert_eq!(interpolate("${a}/${b}", &entity), "${a}/${b}");
    }

    #[test]
    fn substituted_text_is_escaped() {
        let entity = json!({"name": "<Ada & Co>"});
        assert_eq!(interpolate("${name}", &entity), "&lt;Ada &amp; Co&gt;");
    }

    #[test]
    fn literal_markup_passes_through_unescaped() {
        let entity = json!({"name": "Ada"});
        assert_eq!(
            interpolate("<strong>${name}</strong>", &entity),
            "<strong>Ada</strong>"
        );
    }

    #[test]
    fn unterminated_token_is_literal() {
        let entity = json!({"name": "Ada"});
        assert_eq!(interpolate("broken ${name", &entity), "broken ${name");
    }

    #[test]
    fn cache_reuse() {
        let interp = TemplateInterpolator::new();
        let template = "${name} of ${group}";

        let tokens1 = interp.tokenize(template);
        let tokens2 = interp.tokenize(template);

        // Should be the same Arc
        assert!(Arc::ptr_eq(&tokens1, &tokens2));
    }
}
