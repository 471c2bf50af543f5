//! An engine that forwards to whichever engine the resolver picks.

use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;

use super::{ResolveEngine, TemplateEngine};

/// Routes each render to the engine chosen by a [`ResolveEngine`].
///
/// This is the uniform entry point views render through: a view never knows
/// which backend will handle its template, so engines of different kinds can
/// be nested inside each other freely.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stratum_engine::template::{
///     DelegatingEngine, EngineResolver, MiniJinjaEngine, StringEngine, TemplateEngine,
/// };
/// use serde_json::json;
///
/// let engine = DelegatingEngine::new(
///     EngineResolver::new()
///         .with_engine(Arc::new(MiniJinjaEngine::new()))
///         .with_engine(Arc::new(StringEngine::new())),
/// );
///
/// let out = engine.render("Hi :name", &json!({":name": "Ada"})).unwrap();
/// assert_eq!(out, "Hi Ada");
/// ```
pub struct DelegatingEngine {
    resolver: Arc<dyn ResolveEngine>,
}

impl DelegatingEngine {
    /// Creates a delegating engine over `resolver`.
    pub fn new<R: ResolveEngine + 'static>(resolver: R) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Creates a delegating engine over an already shared resolver.
    pub fn from_shared(resolver: Arc<dyn ResolveEngine>) -> Self {
        Self { resolver }
    }

    /// Returns the engine that would render `template`.
    pub fn resolve(&self, template: &str, kind: Option<&str>) -> Option<Arc<dyn TemplateEngine>> {
        self.resolver.resolve(template, kind)
    }

    /// Returns the underlying resolver.
    pub fn resolver(&self) -> &Arc<dyn ResolveEngine> {
        &self.resolver
    }
}

impl TemplateEngine for DelegatingEngine {
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let engine = self
            .resolver
            .resolve(template, None)
            .ok_or_else(|| RenderError::Unresolved {
                template: template.to_string(),
            })?;

        engine.render(template, data)
    }

    fn supports(&self, template: &str, kind: Option<&str>) -> bool {
        self.resolver.resolve(template, kind).is_some()
    }

    fn name(&self) -> &str {
        "delegating"
    }
}

impl fmt::Debug for DelegatingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatingEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{EngineResolver, MiniJinjaEngine, StringEngine};
    use serde_json::json;

    fn engine() -> DelegatingEngine {
        DelegatingEngine::new(
            EngineResolver::new()
                .with_engine(Arc::new(MiniJinjaEngine::new()))
                .with_engine(Arc::new(StringEngine::new())),
        )
    }

    #[test]
    fn test_render_forwards_to_resolved_engine() {
        let dir = tempfile::tempdir().unwrap();
        let jinja = dir.path().join("page.j2");
        std::fs::write(&jinja, "{{ title | upper }}").unwrap();

        let engine = engine();
        let out = engine
            .render(jinja.to_str().unwrap(), &json!({"title": "home"}))
            .unwrap();
        assert_eq!(out, "HOME");

        let out = engine
            .render("<h1>{{title}}</h1>", &json!({"{{title}}": "Foo"}))
            .unwrap();
        assert_eq!(out, "<h1>Foo</h1>");
    }

    #[test]
    fn test_render_fails_with_empty_resolver() {
        let engine = DelegatingEngine::new(EngineResolver::new());
        let err = engine.render("foobar.html", &json!({})).unwrap_err();
        assert!(err.is_unresolved());
        assert!(err.to_string().contains("foobar.html"));
    }

    #[test]
    fn test_supports_mirrors_resolution() {
        let only_jinja =
            DelegatingEngine::new(EngineResolver::new().with_engine(Arc::new(MiniJinjaEngine::new())));

        assert!(only_jinja.supports("a.twig", None));
        assert!(only_jinja.supports("a.html", Some("jinja")));
        assert!(!only_jinja.supports("a.html", None));
        assert!(!DelegatingEngine::new(EngineResolver::new()).supports("", None));
    }

    #[test]
    fn test_resolve_exposes_concrete_engine() {
        let engine = engine();
        assert_eq!(engine.resolve("a.twig", None).unwrap().name(), "minijinja");
        assert_eq!(engine.resolve("a.html", None).unwrap().name(), "string");
        assert_eq!(engine.name(), "delegating");
    }
}
