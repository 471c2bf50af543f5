//! Template engines and engine resolution.
//!
//! Every backend implements [`TemplateEngine`]: `render(template, data)` plus a
//! `supports(template, type)` predicate. Resolvers pick a backend for a
//! template, and [`DelegatingEngine`] turns a resolver back into an engine so
//! callers only ever hold one.
//!
//! ```text
//! View ──render──▶ DelegatingEngine ──resolve──▶ EngineResolver
//!                                                 ├─ MiniJinjaEngine   (.twig, .j2, ...)
//!                                                 └─ StringEngine      (everything)
//! ```
//!
//! ## Key Types
//!
//! - [`TemplateEngine`]: The engine contract
//! - [`EngineResolver`]: Ordered, first-match-wins resolution
//! - [`LazyEngineResolver`]: Type-tag table with engines built on first use
//! - [`DelegatingEngine`]: Engine that forwards to the resolved engine
//! - [`TemplateFinder`]: Logical template names to paths

mod delegating;
mod engine;
pub mod finder;
mod resolver;
mod string;

pub use delegating::DelegatingEngine;
pub use engine::{template_extension, MiniJinjaEngine, TemplateEngine, JINJA_EXTENSIONS};
pub use finder::{FinderError, TemplateFinder, NAMESPACE_DELIMITER, TEMPLATE_EXTENSIONS};
pub use resolver::{EngineFactory, EngineResolver, LazyEngineResolver, ResolveEngine};
pub use string::StringEngine;
