//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait, the single contract every
//! rendering backend satisfies, and [`MiniJinjaEngine`], the Jinja-compatible
//! backend shipped with the crate.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, Value};

use crate::error::RenderError;

/// A backend that turns a template identifier plus data into a string.
///
/// The identifier is opaque to everything but the engine itself: it may be a
/// file path, a name known to the engine's loader, or literal template source.
///
/// Engines are `Send + Sync` so that one resolver can be shared by every
/// request a process serves.
pub trait TemplateEngine: Send + Sync {
    /// Renders `template` with `data`.
    ///
    /// `data` is a JSON object whose nested views have already been rendered
    /// to strings.
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, RenderError>;

    /// Whether this engine handles `template`.
    ///
    /// `kind` is an optional type hint (usually an extension without the dot)
    /// which takes precedence over the template's own extension.
    fn supports(&self, template: &str, kind: Option<&str>) -> bool;

    /// Short engine name used in logs and render profiles.
    fn name(&self) -> &str;
}

/// Returns the extension of a template identifier, without the dot.
///
/// Only the file name component is inspected, so `layouts/page.html.twig`
/// yields `twig` and `README` yields `None`.
pub fn template_extension(template: &str) -> Option<&str> {
    Path::new(template).extension().and_then(OsStr::to_str)
}

/// Picks the tag used to match an engine: the hint if present, else the extension.
pub(crate) fn type_tag<'a>(template: &'a str, kind: Option<&'a str>) -> Option<&'a str> {
    kind.or_else(|| template_extension(template))
}

/// Formats a JSON value as a string for output.
pub(crate) fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        // For arrays and objects, use JSON representation
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => value.to_string(),
    }
}

/// Extensions claimed by [`MiniJinjaEngine`] unless configured otherwise.
///
/// `html.twig` only matters as a type hint; a file named `page.html.twig`
/// already matches through `twig`.
pub const JINJA_EXTENSIONS: &[&str] = &["jinja", "jinja2", "j2", "twig", "html.twig"];

/// MiniJinja-based template engine.
///
/// Template identifiers are resolved in this order:
///
/// 1. A name known to the environment's loader (see [`MiniJinjaEngine::with_template_dir`])
/// 2. A path to an existing file, read on every render
/// 3. Literal template source
///
/// # Example
///
/// ```rust
/// use stratum_engine::template::{MiniJinjaEngine, TemplateEngine};
/// use serde_json::json;
///
/// let engine = MiniJinjaEngine::new();
/// let output = engine
///     .render("Hello, {{ name }}!", &json!({"name": "World"}))
///     .unwrap();
/// assert_eq!(output, "Hello, World!");
/// assert!(engine.supports("page.html.twig", None));
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    extensions: Vec<String>,
}

impl MiniJinjaEngine {
    /// Creates an engine without a loader, claiming [`JINJA_EXTENSIONS`].
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            extensions: JINJA_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    /// Loads named templates (and `{% include %}` targets) from `dir`.
    pub fn with_template_dir(self, dir: impl AsRef<Path>) -> Self {
        self.with_template_dirs([dir.as_ref().to_path_buf()])
    }

    /// Loads named templates from several directories, first match wins.
    pub fn with_template_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let loaders: Vec<_> = dirs
            .into_iter()
            .map(|dir| minijinja::path_loader(dir.into()))
            .collect();

        self.env.set_loader(move |name| {
            for loader in &loaders {
                if let Some(source) = loader(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(None)
        });
        self
    }

    /// Replaces the extensions this engine claims.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// This allows registering custom filters, functions or globals.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let ctx = Value::from_serialize(data);

        match self.env.get_template(template) {
            Ok(tmpl) => return Ok(tmpl.render(ctx)?),
            Err(err) if err.kind() != ErrorKind::TemplateNotFound => return Err(err.into()),
            Err(_) => {}
        }

        let path = Path::new(template);
        if path.is_file() {
            let source = std::fs::read_to_string(path)?;
            return Ok(self.env.render_named_str(template, &source, ctx)?);
        }

        Ok(self.env.render_str(template, ctx)?)
    }

    fn supports(&self, template: &str, kind: Option<&str>) -> bool {
        match type_tag(template, kind) {
            Some(tag) => self.extensions.iter().any(|ext| ext == tag),
            None => false,
        }
    }

    fn name(&self) -> &str {
        "minijinja"
    }
}
