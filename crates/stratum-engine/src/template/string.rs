//! Literal placeholder substitution engine.
//!
//! [`StringEngine`] replaces every occurrence of a data key in the template with
//! the key's value. Keys are matched literally, so the placeholder syntax is
//! whatever the caller chooses (`{{title}}`, `%name%`, `:id`).
//!
//! # Matching Rules
//!
//! - At each position the longest matching key wins
//! - Replaced text is never rescanned
//! - Empty keys are ignored
//!
//! # Example
//!
//! ```rust
//! use stratum_engine::template::{StringEngine, TemplateEngine};
//! use serde_json::json;
//!
//! let engine = StringEngine::new();
//! let output = engine
//!     .render("<h1>{{title}}</h1>", &json!({"{{title}}": "Foo"}))
//!     .unwrap();
//! assert_eq!(output, "<h1>Foo</h1>");
//! ```
//!
//! The engine supports every template, so it belongs at the end of an
//! [`EngineResolver`](super::EngineResolver) as the fallback.

use std::path::Path;

use crate::error::RenderError;

use super::engine::format_value;
use super::TemplateEngine;

/// A fallback engine doing literal key/value substitution.
///
/// When the template identifier names an existing file, the file content is
/// used as the template; otherwise the identifier itself is the template.
#[derive(Debug, Clone, Default)]
pub struct StringEngine;

impl StringEngine {
    /// Creates a new StringEngine.
    pub fn new() -> Self {
        Self
    }

    /// Loads the template source for an identifier.
    fn source(template: &str) -> Result<String, RenderError> {
        let path = Path::new(template);
        if !template.is_empty() && path.is_file() {
            Ok(std::fs::read_to_string(path)?)
        } else {
            Ok(template.to_string())
        }
    }

    /// Substitutes keys in `source`, longest key first at each position.
    fn substitute(source: &str, data: &serde_json::Value) -> String {
        let mut pairs: Vec<(&str, String)> = match data {
            serde_json::Value::Object(map) => map
                .iter()
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.as_str(), format_value(value)))
                .collect(),
            _ => Vec::new(),
        };

        if pairs.is_empty() {
            return source.to_string();
        }

        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut result = String::with_capacity(source.len());
        let mut rest = source;

        'scan: while !rest.is_empty() {
            for (key, value) in &pairs {
                if let Some(tail) = rest.strip_prefix(*key) {
                    result.push_str(value);
                    rest = tail;
                    continue 'scan;
                }
            }

            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                result.push(ch);
            }
            rest = chars.as_str();
        }

        result
    }
}

impl TemplateEngine for StringEngine {
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let source = Self::source(template)?;
        Ok(Self::substitute(&source, data))
    }

    fn supports(&self, _template: &str, _kind: Option<&str>) -> bool {
        true
    }

    fn name(&self) -> &str {
        "string"
    }
}
