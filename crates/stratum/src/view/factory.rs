//! View construction.

use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use stratum_engine::{TemplateEngine, TemplateFinder};

use crate::bag::{SharedBag, SharedExceptions};
use crate::logger::SharedLogger;

use super::{Context, LoggableView, Slot, View, ViewInterface, ViewNode};

/// What [`ViewFactory::create`] builds from: a template or an existing view.
#[derive(Debug, Clone)]
pub enum ViewSource {
    Template(String),
    View(ViewNode),
}

impl From<&str> for ViewSource {
    fn from(template: &str) -> Self {
        ViewSource::Template(template.to_string())
    }
}

impl From<String> for ViewSource {
    fn from(template: String) -> Self {
        ViewSource::Template(template)
    }
}

impl From<ViewNode> for ViewSource {
    fn from(node: ViewNode) -> Self {
        ViewSource::View(node)
    }
}

impl From<View> for ViewSource {
    fn from(view: View) -> Self {
        ViewSource::View(view.into_node())
    }
}

/// Creates views bound to one engine, one shared bag and one exception bag.
///
/// A factory is scoped to a request: everything shared through it, or through
/// any view it created, is visible to every other view of the same factory.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stratum::prelude::*;
///
/// let factory = ViewFactory::new(Arc::new(StringEngine::new()));
/// factory.assign(":site", "Stratum");
///
/// let page = factory.create("<title>:site - :page</title>", [(":page", "Home")].into());
/// assert_eq!(page.render(Context::new()).unwrap(), "<title>Stratum - Home</title>");
/// ```
pub struct ViewFactory {
    engine: Arc<dyn TemplateEngine>,
    shared: SharedBag,
    exceptions: SharedExceptions,
    finder: Option<TemplateFinder>,
}

impl ViewFactory {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            engine,
            shared: SharedBag::default(),
            exceptions: SharedExceptions::default(),
            finder: None,
        }
    }

    /// Maps logical template names to paths when views are created.
    ///
    /// Names the finder cannot locate are used verbatim, so inline templates
    /// keep working.
    pub fn with_finder(mut self, finder: TemplateFinder) -> Self {
        self.finder = Some(finder);
        self
    }

    /// Returns `data` merged into an existing view, or a new view for a
    /// template.
    pub fn create(&self, source: impl Into<ViewSource>, data: Context) -> ViewNode {
        match source.into() {
            ViewSource::View(node) => {
                node.with(data);
                node
            }
            ViewSource::Template(template) => self.view(template).with_data(data).into_node(),
        }
    }

    /// Creates a concrete view for `template`.
    pub fn view(&self, template: impl Into<String>) -> View {
        View::new(self.locate(template.into()))
            .with_engine(Arc::clone(&self.engine))
            .with_shared_bag(Rc::clone(&self.shared))
            .with_exception_bag(Rc::clone(&self.exceptions))
    }

    fn locate(&self, template: String) -> String {
        let Some(finder) = &self.finder else {
            return template;
        };
        match finder.find(&template) {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(error) => {
                tracing::trace!(%template, %error, "using template verbatim");
                template
            }
        }
    }

    /// Writes `context` into the shared bag.
    pub fn share(&self, context: Context) -> &Self {
        {
            let mut shared = self.shared.borrow_mut();
            for (key, value) in context {
                shared.set(key, value);
            }
        }
        self
    }

    /// Stores one shared value.
    pub fn assign(&self, key: impl Into<String>, value: impl Into<Slot>) -> &Self {
        self.shared.borrow_mut().set(key, value.into());
        self
    }

    /// Returns the shared value under `key`.
    pub fn release(&self, key: &str) -> Option<Slot> {
        self.shared.borrow().get(key).cloned()
    }

    pub fn shared_bag(&self) -> &SharedBag {
        &self.shared
    }

    pub fn exception_bag(&self) -> &SharedExceptions {
        &self.exceptions
    }

    pub fn engine(&self) -> &Arc<dyn TemplateEngine> {
        &self.engine
    }

    pub fn finder(&self) -> Option<&TemplateFinder> {
        self.finder.as_ref()
    }
}

/// A [`ViewFactory`] whose views report their renders to a logger.
///
/// Dereferences to the wrapped factory for sharing data and inspecting bags.
pub struct LoggableViewFactory {
    factory: ViewFactory,
    logger: SharedLogger,
}

impl LoggableViewFactory {
    pub fn new(engine: Arc<dyn TemplateEngine>, logger: SharedLogger) -> Self {
        Self::from_factory(ViewFactory::new(engine), logger)
    }

    pub fn from_factory(factory: ViewFactory, logger: SharedLogger) -> Self {
        Self { factory, logger }
    }

    /// Like [`ViewFactory::create`], but new views are [`LoggableView`]s
    /// carrying this factory's logger.
    pub fn create(&self, source: impl Into<ViewSource>, data: Context) -> ViewNode {
        match source.into() {
            ViewSource::View(node) => {
                node.with(data);
                node
            }
            ViewSource::Template(template) => {
                let mut view = self.view(template);
                view.with(data);
                view.into_node()
            }
        }
    }

    /// Creates a concrete loggable view for `template`.
    pub fn view(&self, template: impl Into<String>) -> LoggableView {
        LoggableView::new(self.factory.view(template)).with_logger(Rc::clone(&self.logger))
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    pub fn into_inner(self) -> ViewFactory {
        self.factory
    }
}

impl Deref for LoggableViewFactory {
    type Target = ViewFactory;

    fn deref(&self) -> &ViewFactory {
        &self.factory
    }
}
