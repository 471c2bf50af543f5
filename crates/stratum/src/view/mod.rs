//! Nestable views.
//!
//! A view is a template identifier plus a slot map. Slots hold plain data or
//! other views; rendering a view renders its nested views first and hands
//! their output to the engine in place of the view.
//!
//! ```text
//! page (layout.html)
//! ├─ title   = "Home"
//! ├─ content = View(article.j2)
//! └─ footer  = ViewCollection [View(links.html), View(copyright.html)]
//! ```
//!
//! ## Key Types
//!
//! - [`ViewInterface`]: The operations shared by every kind of view
//! - [`View`]: A template, its data and the collaborators it renders with
//! - [`ViewCollection`]: Several views at one slot, rendered back to back
//! - [`LoggableView`]: Reports each render to a [`RenderLogger`](crate::RenderLogger)
//! - [`ViewNode`]: Shared handle used to nest views inside each other
//! - [`ViewFactory`]: Creates views bound to one engine and one shared bag
//!
//! ## Data Lookup
//!
//! Reads go through three layers, first hit wins:
//!
//! 1. The view's own slots
//! 2. Values inherited from the parent view at render time
//! 3. Data shared across the request via [`ViewInterface::share`]

mod collection;
mod factory;
mod loggable;
mod node;
mod single;
mod slot;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use stratum_engine::{RenderError, TemplateEngine};

use crate::bag::DataBag;

pub use collection::ViewCollection;
pub use factory::{LoggableViewFactory, ViewFactory, ViewSource};
pub use loggable::LoggableView;
pub use node::ViewNode;
pub use single::View;
pub use slot::{Context, Slot, ViewData};

/// Slot used by `nest` and `wrap` when no key is given.
pub const DEFAULT_SLOT: &str = "content";

/// Reserved key carrying the template in [`ViewInterface::to_array`].
pub const TEMPLATE_KEY: &str = "_template";

/// Process-unique view identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ViewId(u64);

impl ViewId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ViewId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operations shared by [`View`], [`ViewCollection`] and [`LoggableView`].
///
/// The trait is object safe; nested views are stored as
/// `Rc<RefCell<dyn ViewInterface>>` behind a [`ViewNode`]. Mutating methods
/// return `&mut dyn ViewInterface` so calls chain:
///
/// ```rust
/// use stratum::prelude::*;
///
/// let mut page = View::new("<title>:title</title>");
/// page.with([(":title", "Home")].into())
///     .share([("lang", "en")].into());
///
/// assert_eq!(page.render(Context::new()).unwrap(), "<title>Home</title>");
/// ```
pub trait ViewInterface {
    fn id(&self) -> ViewId;

    /// Short type name used in logs: `View`, `ViewCollection` or `LoggableView`.
    fn kind(&self) -> &'static str;

    /// The template identifier, if the view has one.
    fn template(&self) -> Option<&str>;

    /// The engine the view renders with. Collections have none.
    fn engine(&self) -> Option<Arc<dyn TemplateEngine>>;

    /// Merges `context` into the view's own slots, overwriting existing keys.
    fn with(&mut self, context: Context) -> &mut dyn ViewInterface;

    /// Nests `child` under `key`.
    ///
    /// A second view nested under the same key turns the slot into a
    /// [`ViewCollection`], so every child renders at that position in the
    /// order it was nested.
    fn nest(&mut self, child: ViewNode, key: &str) -> &mut dyn ViewInterface;

    /// Writes `context` into the request-wide shared bag.
    fn share(&mut self, context: Context) -> &mut dyn ViewInterface;

    /// Stores the plain values of `context` as inherited data. Nested views
    /// are skipped.
    fn inherit(&mut self, context: Context) -> &mut dyn ViewInterface;

    /// Snapshot of the shared bag.
    fn globals(&self) -> DataBag<Slot>;

    /// The view's own slots only.
    fn all(&self) -> ViewData;

    /// Own, inherited and shared data merged; own wins, then inherited.
    fn get_array_copy(&self) -> ViewData;

    /// Looks `key` up through own, inherited and shared data.
    fn get(&self, key: &str) -> Option<Slot>;

    fn has(&self, key: &str) -> bool;

    /// Sets an own slot.
    fn set(&mut self, key: &str, value: Slot);

    /// Removes an own slot.
    fn remove(&mut self, key: &str) -> Option<Slot>;

    /// Renders the view after merging `context` into its slots.
    ///
    /// Backend failures are recorded in the exception bag and yield an empty
    /// string. Only [`RenderError::Unresolved`] is returned as an error.
    fn render(&mut self, context: Context) -> Result<String, RenderError>;

    /// Own data with nested views expanded recursively.
    fn to_array(&self) -> serde_json::Value;

    /// Mutable access to the collection behind this view, if it is one.
    fn as_collection_mut(&mut self) -> Option<&mut ViewCollection> {
        None
    }

    fn is_collection(&self) -> bool {
        false
    }
}
