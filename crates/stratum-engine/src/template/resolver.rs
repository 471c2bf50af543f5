//! Engine resolution.
//!
//! A resolver answers one question: which engine renders this template?
//! Two strategies are provided:
//!
//! - [`EngineResolver`]: an ordered list of engines, asked in registration
//!   order. The first engine whose [`supports`](TemplateEngine::supports)
//!   accepts the template wins, so specific engines go first and catch-all
//!   engines such as [`StringEngine`](super::StringEngine) go last.
//! - [`LazyEngineResolver`]: a table from type tag (an extension such as
//!   `html`) to an engine factory. Engines are only built when a template of
//!   their type is first resolved.
//!
//! Both return `None` rather than failing; turning a miss into an error is the
//! job of [`DelegatingEngine`](super::DelegatingEngine).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use super::engine::type_tag;
use super::TemplateEngine;

/// Something that can pick an engine for a template.
pub trait ResolveEngine: Send + Sync {
    /// Returns the engine for `template`, or `None` if nothing matches.
    ///
    /// `kind` is an optional type hint that takes precedence over the
    /// template's extension.
    fn resolve(&self, template: &str, kind: Option<&str>) -> Option<Arc<dyn TemplateEngine>>;
}

/// Ordered, first-match-wins engine list.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stratum_engine::template::{EngineResolver, MiniJinjaEngine, ResolveEngine, StringEngine};
///
/// let resolver = EngineResolver::new()
///     .with_engine(Arc::new(MiniJinjaEngine::new()))
///     .with_engine(Arc::new(StringEngine::new()));
///
/// assert_eq!(resolver.resolve("page.twig", None).unwrap().name(), "minijinja");
/// assert_eq!(resolver.resolve("page.html", None).unwrap().name(), "string");
/// ```
#[derive(Default, Clone)]
pub struct EngineResolver {
    engines: Vec<Arc<dyn TemplateEngine>>,
}

impl EngineResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver from engines in priority order.
    pub fn with_engines<I>(engines: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn TemplateEngine>>,
    {
        Self {
            engines: engines.into_iter().collect(),
        }
    }

    /// Appends an engine with the lowest priority (builder form).
    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.add_engine(engine);
        self
    }

    /// Appends an engine with the lowest priority.
    pub fn add_engine(&mut self, engine: Arc<dyn TemplateEngine>) {
        self.engines.push(engine);
    }

    /// Returns the registered engines in priority order.
    pub fn engines(&self) -> &[Arc<dyn TemplateEngine>] {
        &self.engines
    }
}

impl ResolveEngine for EngineResolver {
    fn resolve(&self, template: &str, kind: Option<&str>) -> Option<Arc<dyn TemplateEngine>> {
        let found = self
            .engines
            .iter()
            .find(|engine| engine.supports(template, kind))
            .cloned();

        match &found {
            Some(engine) => tracing::debug!(template, engine = engine.name(), "resolved engine"),
            None => tracing::debug!(template, ?kind, "no engine supports template"),
        }

        found
    }
}

impl fmt::Debug for EngineResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineResolver")
            .field(
                "engines",
                &self.engines.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builds an engine on first use.
pub type EngineFactory = Box<dyn Fn() -> Arc<dyn TemplateEngine> + Send + Sync>;

struct LazyEntry {
    factory: EngineFactory,
    instance: OnceCell<Arc<dyn TemplateEngine>>,
}

impl LazyEntry {
    fn new(factory: EngineFactory) -> Self {
        Self {
            factory,
            instance: OnceCell::new(),
        }
    }

    fn get(&self) -> Arc<dyn TemplateEngine> {
        self.instance.get_or_init(|| (self.factory)()).clone()
    }
}

/// Type-tag table resolving to lazily constructed engines.
///
/// The tag for a template is the explicit type hint, else the template's
/// extension, else the default tag. The engine's own `supports` predicate is
/// not consulted: the table is authoritative.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stratum_engine::template::{LazyEngineResolver, ResolveEngine, StringEngine};
///
/// let mut resolver = LazyEngineResolver::new().with_default_type("html");
/// resolver.add_mapping("html", || Arc::new(StringEngine::new()));
///
/// assert!(resolver.resolve("index.html", None).is_some());
/// assert!(resolver.resolve("index", None).is_some());
/// assert!(resolver.resolve("index.php", None).is_none());
/// ```
#[derive(Default)]
pub struct LazyEngineResolver {
    mappings: IndexMap<String, LazyEntry>,
    default_type: Option<String>,
}

impl LazyEngineResolver {
    /// Creates an empty table without a default tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag used for templates without extension or hint.
    pub fn with_default_type(mut self, tag: impl Into<String>) -> Self {
        self.default_type = Some(tag.into());
        self
    }

    /// Maps `tag` to an engine factory, replacing (and discarding) any previous
    /// mapping for the same tag.
    pub fn add_mapping<F>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn TemplateEngine> + Send + Sync + 'static,
    {
        self.mappings
            .insert(tag.into(), LazyEntry::new(Box::new(factory)));
    }

    /// Returns the mapped tags in registration order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    /// Whether the engine for `tag` has been constructed yet.
    pub fn is_loaded(&self, tag: &str) -> bool {
        self.mappings
            .get(tag)
            .is_some_and(|entry| entry.instance.get().is_some())
    }
}

impl ResolveEngine for LazyEngineResolver {
    fn resolve(&self, template: &str, kind: Option<&str>) -> Option<Arc<dyn TemplateEngine>> {
        let tag = type_tag(template, kind).or(self.default_type.as_deref())?;
        let engine = self.mappings.get(tag).map(LazyEntry::get);
        if engine.is_none() {
            tracing::debug!(template, tag, "no engine mapped for type");
        }
        engine
    }
}

impl fmt::Debug for LazyEngineResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEngineResolver")
            .field("types", &self.mappings.keys().collect::<Vec<_>>())
            .field("default_type", &self.default_type)
            .finish()
    }
}
