use std::fmt;
use std::sync::Arc;

use stratum_engine::{RenderError, TemplateEngine};

use crate::bag::DataBag;
use crate::logger::SharedLogger;

use super::{Context, Slot, View, ViewCollection, ViewData, ViewId, ViewInterface, ViewNode};

/// Decorator reporting every render to a [`RenderLogger`](crate::RenderLogger).
///
/// Without a logger it behaves exactly like the wrapped view. With one, each
/// `render` is bracketed by `start_render` and `stop_render`; all other
/// operations go straight to the inner view.
#[derive(Clone)]
pub struct LoggableView<V = View> {
    inner: V,
    logger: Option<SharedLogger>,
}

impl<V: ViewInterface> LoggableView<V> {
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Attaches or detaches the logger.
    pub fn set_logger(&mut self, logger: Option<SharedLogger>) -> &mut Self {
        self.logger = logger;
        self
    }

    pub fn logger(&self) -> Option<&SharedLogger> {
        self.logger.as_ref()
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut V {
        &mut self.inner
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<V: ViewInterface + 'static> LoggableView<V> {
    pub fn into_node(self) -> ViewNode {
        ViewNode::new(self)
    }
}

impl<V: ViewInterface> ViewInterface for LoggableView<V> {
    fn id(&self) -> ViewId {
        self.inner.id()
    }

    fn kind(&self) -> &'static str {
        "LoggableView"
    }

    fn template(&self) -> Option<&str> {
        self.inner.template()
    }

    fn engine(&self) -> Option<Arc<dyn TemplateEngine>> {
        self.inner.engine()
    }

    fn with(&mut self, context: Context) -> &mut dyn ViewInterface {
        self.inner.with(context);
        self
    }

    fn nest(&mut self, child: ViewNode, key: &str) -> &mut dyn ViewInterface {
        self.inner.nest(child, key);
        self
    }

    fn share(&mut self, context: Context) -> &mut dyn ViewInterface {
        self.inner.share(context);
        self
    }

    fn inherit(&mut self, context: Context) -> &mut dyn ViewInterface {
        self.inner.inherit(context);
        self
    }

    fn globals(&self) -> DataBag<Slot> {
        self.inner.globals()
    }

    fn all(&self) -> ViewData {
        self.inner.all()
    }

    fn get_array_copy(&self) -> ViewData {
        self.inner.get_array_copy()
    }

    fn get(&self, key: &str) -> Option<Slot> {
        self.inner.get(key)
    }

    fn has(&self, key: &str) -> bool {
        self.inner.has(key)
    }

    fn set(&mut self, key: &str, value: Slot) {
        self.inner.set(key, value);
    }

    fn remove(&mut self, key: &str) -> Option<Slot> {
        self.inner.remove(key)
    }

    fn render(&mut self, context: Context) -> Result<String, RenderError> {
        let Some(logger) = self.logger.clone() else {
            return self.inner.render(context);
        };

        if let Ok(mut logger) = logger.try_borrow_mut() {
            logger.start_render(&*self);
        }
        let content = self.inner.render(context);
        if let Ok(mut logger) = logger.try_borrow_mut() {
            logger.stop_render(&*self);
        }

        content
    }

    fn to_array(&self) -> serde_json::Value {
        self.inner.to_array()
    }

    fn as_collection_mut(&mut self) -> Option<&mut ViewCollection> {
        self.inner.as_collection_mut()
    }

    fn is_collection(&self) -> bool {
        self.inner.is_collection()
    }
}

impl<V: fmt::Debug> fmt::Debug for LoggableView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggableView")
            .field("inner", &self.inner)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::RenderLogger;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records the order of start/stop calls.
    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
    }

    impl RenderLogger for Trace {
        fn start_render(&mut self, view: &dyn ViewInterface) {
            self.events.push(format!("start {}", view.template().unwrap_or("-")));
        }

        fn stop_render(&mut self, view: &dyn ViewInterface) {
            self.events.push(format!("stop {}", view.template().unwrap_or("-")));
        }
    }

    #[test]
    fn test_without_logger_renders_plainly() {
        let mut view = LoggableView::new(View::new("hi :n").with_data([(":n", 1)]));
        assert!(view.logger().is_none());
        assert_eq!(view.render(Context::new()).unwrap(), "hi 1");
    }

    #[test]
    fn test_logger_brackets_nested_renders() {
        let trace = Rc::new(RefCell::new(Trace::default()));

        let child = LoggableView::new(View::new("child"))
            .with_logger(trace.clone())
            .into_node();
        let mut parent = LoggableView::new(View::new("parent:c")).with_logger(trace.clone());
        parent.set(":c", Slot::View(child));

        assert_eq!(parent.render(Context::new()).unwrap(), "parentchild");
        assert_eq!(
            trace.borrow().events,
            vec!["start parent:c", "start child", "stop child", "stop parent:c"]
        );
    }

    #[test]
    fn test_set_logger_detaches() {
        let trace = Rc::new(RefCell::new(Trace::default()));
        let mut view = LoggableView::new(View::new("x")).with_logger(trace.clone());
        view.set_logger(None);
        view.render(Context::new()).unwrap();
        assert!(trace.borrow().events.is_empty());
    }

    #[test]
    fn test_delegates_identity_and_data() {
        let inner = View::new("t").with_data([("a", 1)]);
        let id = inner.id();
        let view = LoggableView::new(inner);

        assert_eq!(view.id(), id);
        assert_eq!(view.kind(), "LoggableView");
        assert_eq!(view.template(), Some("t"));
        assert_eq!(view.get("a"), Some(Slot::from(1)));
        assert_eq!(view.engine().unwrap().name(), "string");
    }
}
