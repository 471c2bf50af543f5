//! # Stratum - Nestable Views
//!
//! `stratum` separates what a page shows from how it is rendered. Controllers
//! build trees of views, each a template plus a slot map; the template engine
//! behind each view is chosen per template, so a MiniJinja layout can embed a
//! plain substitution partial and the other way round.
//!
//! ## Core Concepts
//!
//! - [`View`]: Template, own data, inherited data and request-wide shared data
//! - [`ViewCollection`]: Several views accumulated under one slot
//! - [`ViewFactory`]: Builds views bound to one engine and one shared bag
//! - [`DataBag`]: Ordered key/value storage
//! - [`ExceptionBag`]: Render failures captured instead of propagated
//! - [`LoggableView`] and [`ViewLogger`]: Render logging and profiling
//!
//! Engines, resolvers and the bundled backends live in
//! [`stratum_engine`], re-exported here as [`engine`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use stratum::prelude::*;
//!
//! let engine = DelegatingEngine::new(
//!     EngineResolver::new()
//!         .with_engine(Arc::new(MiniJinjaEngine::new()))
//!         .with_engine(Arc::new(StringEngine::new())),
//! );
//! let factory = ViewFactory::new(Arc::new(engine));
//! factory.assign("{{site}}", "Stratum");
//!
//! let layout = factory.create("<main>{{site}}: {{body}}</main>", Context::new());
//! let body = factory.create("<p>{{text}}</p>", [("{{text}}", "hello")].into());
//! layout.nest(body, "{{body}}");
//!
//! let html = layout.render(Context::new()).unwrap();
//! assert_eq!(html, "<main>Stratum: <p>hello</p></main>");
//! ```
//!
//! ## Failures
//!
//! A view whose engine fails records the error in the factory's
//! [`ExceptionBag`] and renders as an empty string, leaving the rest of the
//! page intact. The one exception is a template no engine accepts
//! ([`RenderError::Unresolved`]), which propagates to the caller.

pub mod bag;
pub mod logger;
pub mod prelude;
pub mod view;

pub use stratum_engine as engine;
pub use stratum_engine::RenderError;

pub use bag::{DataBag, ExceptionBag, SharedBag, SharedExceptions};
pub use logger::{RenderLogger, RenderProfile, RenderRecord, SharedLogger, Stopwatch, ViewLogger};
pub use view::{
    Context, LoggableView, LoggableViewFactory, Slot, View, ViewCollection, ViewData, ViewFactory,
    ViewId, ViewInterface, ViewNode, ViewSource, DEFAULT_SLOT, TEMPLATE_KEY,
};
