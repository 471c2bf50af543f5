//! Common imports.
//!
//! ```rust
//! use stratum::prelude::*;
//! ```

pub use crate::bag::{DataBag, ExceptionBag};
pub use crate::logger::{RenderLogger, Stopwatch, ViewLogger};
pub use crate::view::{
    Context, LoggableView, LoggableViewFactory, Slot, View, ViewCollection, ViewFactory,
    ViewInterface, ViewNode, DEFAULT_SLOT,
};

pub use stratum_engine::{
    DelegatingEngine, EngineResolver, MiniJinjaEngine, RenderError, StringEngine, TemplateEngine,
};
