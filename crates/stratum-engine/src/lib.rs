//! # Stratum Engine - Template Engine Resolution
//!
//! `stratum-engine` is the rendering foundation of the `stratum` view layer. It
//! defines the contract every template backend satisfies and the machinery that
//! picks a backend per template, so that templates written for different
//! engines can be mixed and nested freely.
//!
//! ## Core Concepts
//!
//! - [`TemplateEngine`]: `render(template, data)` and `supports(template, type)`
//! - [`EngineResolver`]: Ordered engine list, first supporting engine wins
//! - [`LazyEngineResolver`]: Type tag to engine table, engines built lazily
//! - [`DelegatingEngine`]: Forwards to whatever the resolver picks
//! - [`EngineConfig`]: The resolution table as YAML
//! - [`RenderError`]: The one error type every engine returns
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stratum_engine::{DelegatingEngine, EngineResolver, MiniJinjaEngine, StringEngine, TemplateEngine};
//! use serde_json::json;
//!
//! let engine = DelegatingEngine::new(
//!     EngineResolver::new()
//!         .with_engine(Arc::new(MiniJinjaEngine::new()))
//!         .with_engine(Arc::new(StringEngine::new())),
//! );
//!
//! let html = engine
//!     .render("<h1>{{title}}</h1>", &json!({"{{title}}": "Report"}))
//!     .unwrap();
//! assert_eq!(html, "<h1>Report</h1>");
//! ```
//!
//! ## Resolution Failures
//!
//! A resolver that finds no engine returns `None`; [`DelegatingEngine`] turns
//! that into [`RenderError::Unresolved`], the only error the view layer does not
//! swallow.

pub mod config;
mod error;
pub mod template;

// Error type
pub use error::RenderError;

// Config exports
pub use config::{ConfigError, EngineConfig, EngineKind, EngineMapping};

// Template engine exports
pub use template::{
    template_extension, DelegatingEngine, EngineFactory, EngineResolver, FinderError,
    LazyEngineResolver, MiniJinjaEngine, ResolveEngine, StringEngine, TemplateEngine,
    TemplateFinder,
};
