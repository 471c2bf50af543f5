use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use stratum_engine::{RenderError, StringEngine, TemplateEngine};

use crate::bag::{DataBag, SharedBag, SharedExceptions};

use super::{Context, Slot, ViewCollection, ViewData, ViewId, ViewInterface, ViewNode, TEMPLATE_KEY};

/// A template bound to its data and rendering collaborators.
///
/// A view owns its slot map. The engine, the shared bag and the exception bag
/// are shared handles, normally handed out by a
/// [`ViewFactory`](super::ViewFactory); a view built on its own gets a
/// [`StringEngine`] and fresh bags.
///
/// # Example
///
/// ```rust
/// use stratum::prelude::*;
///
/// let child = View::new("<h1>{{title}}</h1>").with_data([("{{title}}", "Foo")]);
/// let mut parent = View::new("<h1>{{title}}</h1>");
/// parent.with([("{{title}}", child)].into());
///
/// assert_eq!(parent.render(Context::new()).unwrap(), "<h1><h1>Foo</h1></h1>");
/// ```
///
/// # Cloning
///
/// A clone gets a new id and its own copy of the slot map. Nested child views
/// are not duplicated, and the engine, shared bag, inherited bag and exception
/// bag stay shared with the original.
pub struct View {
    id: ViewId,
    template: Option<String>,
    engine: Arc<dyn TemplateEngine>,
    data: DataBag<Slot>,
    shared: SharedBag,
    parent: Rc<RefCell<DataBag>>,
    exceptions: SharedExceptions,
}

impl View {
    /// Creates a view for `template` with the default collaborators.
    pub fn new(template: impl Into<String>) -> Self {
        Self::build(Some(template.into()))
    }

    /// Creates a view without a template. It renders through the engine with
    /// an empty template identifier.
    pub fn untemplated() -> Self {
        Self::build(None)
    }

    fn build(template: Option<String>) -> Self {
        Self {
            id: ViewId::next(),
            template,
            engine: Arc::new(StringEngine::new()),
            data: DataBag::new(),
            shared: SharedBag::default(),
            parent: Rc::default(),
            exceptions: SharedExceptions::default(),
        }
    }

    /// Merges initial data into the view (builder form of `with`).
    pub fn with_data(mut self, context: impl Into<Context>) -> Self {
        self.merge(context.into());
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_shared_bag(mut self, bag: SharedBag) -> Self {
        self.shared = bag;
        self
    }

    pub fn with_exception_bag(mut self, bag: SharedExceptions) -> Self {
        self.exceptions = bag;
        self
    }

    pub fn shared_bag(&self) -> &SharedBag {
        &self.shared
    }

    pub fn exception_bag(&self) -> &SharedExceptions {
        &self.exceptions
    }

    /// Snapshot of the values inherited from the parent view.
    pub fn inherited(&self) -> DataBag {
        self.parent.borrow().clone()
    }

    /// Moves the view behind a shared [`ViewNode`] handle.
    pub fn into_node(self) -> ViewNode {
        ViewNode::new(self)
    }

    /// Stores this view at `outer[key]` and returns `outer`.
    pub fn wrap(self, outer: ViewNode, key: &str) -> ViewNode {
        self.into_node().wrap(outer, key)
    }

    fn merge(&mut self, context: Context) {
        for (key, value) in context {
            self.data.set(key, value);
        }
    }

    fn capture(&self, error: RenderError) {
        tracing::debug!(view = %self.id, template = ?self.template, %error, "captured render failure");
        self.exceptions.borrow_mut().add(error);
    }

    /// Own, inherited and shared slots; the first layer to define a key wins.
    fn merged(&self) -> IndexMap<String, Slot> {
        let mut merged: IndexMap<String, Slot> = self
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (key, value) in self.parent.borrow().iter() {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), Slot::Value(value.clone()));
            }
        }

        for (key, value) in self.shared.borrow().iter() {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }

        merged
    }

    /// Hands own and inherited plain data one level down to every child.
    fn propagate(&self) {
        let children: Vec<&ViewNode> = self.data.iter().filter_map(|(_, v)| v.as_view()).collect();
        if children.is_empty() {
            return;
        }

        let mut context: Context = self
            .data
            .iter()
            .filter(|(_, v)| !v.is_view())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in self.parent.borrow().iter() {
            if !self.data.has(key) {
                context.insert(key.clone(), value.clone());
            }
        }

        for child in children {
            child.try_inherit(context.clone());
        }
    }

    fn render_child(&self, child: &ViewNode) -> Result<String, RenderError> {
        match child.render(Context::new()) {
            Err(error) if !error.is_unresolved() => {
                self.capture(error);
                Ok(String::new())
            }
            result => result,
        }
    }

    fn render_inner(&mut self, context: Context) -> Result<String, RenderError> {
        self.propagate();
        self.merge(context);

        let mut data = serde_json::Map::new();
        for (key, slot) in self.merged() {
            let value = match slot {
                Slot::Value(value) => value,
                Slot::View(child) => serde_json::Value::String(self.render_child(&child)?),
            };
            data.insert(key, value);
        }

        let template = self.template.as_deref().unwrap_or_default();
        self.engine.render(template, &serde_json::Value::Object(data))
    }
}

impl ViewInterface for View {
    fn id(&self) -> ViewId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "View"
    }

    fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    fn engine(&self) -> Option<Arc<dyn TemplateEngine>> {
        Some(Arc::clone(&self.engine))
    }

    fn with(&mut self, context: Context) -> &mut dyn ViewInterface {
        self.merge(context);
        self
    }

    fn nest(&mut self, child: ViewNode, key: &str) -> &mut dyn ViewInterface {
        let existing = self.data.get(key).and_then(Slot::as_view).cloned();

        match existing {
            Some(existing) if existing.append(&child) => {}
            Some(existing) => {
                let mut collection = ViewCollection::new(existing)
                    .with_exception_bag(Rc::clone(&self.exceptions));
                collection.push(child);
                self.data.set(key, Slot::View(ViewNode::new(collection)));
            }
            None => self.data.set(key, Slot::View(child)),
        }

        self
    }

    fn share(&mut self, context: Context) -> &mut dyn ViewInterface {
        {
            let mut shared = self.shared.borrow_mut();
            for (key, value) in context {
                shared.set(key, value);
            }
        }
        self
    }

    fn inherit(&mut self, context: Context) -> &mut dyn ViewInterface {
        {
            let mut parent = self.parent.borrow_mut();
            for (key, value) in context {
                if let Slot::Value(value) = value {
                    parent.set(key, value);
                }
            }
        }
        self
    }

    fn globals(&self) -> DataBag<Slot> {
        self.shared.borrow().clone()
    }

    fn all(&self) -> ViewData {
        ViewData::Map(self.data.all().clone())
    }

    fn get_array_copy(&self) -> ViewData {
        ViewData::Map(self.merged())
    }

    fn get(&self, key: &str) -> Option<Slot> {
        if let Some(value) = self.data.get(key) {
            return Some(value.clone());
        }
        if let Some(value) = self.parent.borrow().get(key) {
            return Some(Slot::Value(value.clone()));
        }
        self.shared.borrow().get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.data.has(key) || self.parent.borrow().has(key) || self.shared.borrow().has(key)
    }

    fn set(&mut self, key: &str, value: Slot) {
        self.data.set(key, value);
    }

    fn remove(&mut self, key: &str) -> Option<Slot> {
        self.data.remove(key)
    }

    fn render(&mut self, context: Context) -> Result<String, RenderError> {
        match self.render_inner(context) {
            Err(error) if !error.is_unresolved() => {
                self.capture(error);
                Ok(String::new())
            }
            result => result,
        }
    }

    fn to_array(&self) -> serde_json::Value {
        let mut content: serde_json::Map<String, serde_json::Value> = self
            .data
            .iter()
            .map(|(key, slot)| (key.clone(), slot.to_json()))
            .collect();

        if let Some(template) = &self.template {
            if !content.contains_key(TEMPLATE_KEY) {
                content.insert(TEMPLATE_KEY.to_string(), template.clone().into());
            }
        }

        serde_json::Value::Object(content)
    }
}

impl Clone for View {
    fn clone(&self) -> Self {
        Self {
            id: ViewId::next(),
            template: self.template.clone(),
            engine: Arc::clone(&self.engine),
            data: self.data.clone(),
            shared: Rc::clone(&self.shared),
            parent: Rc::clone(&self.parent),
            exceptions: Rc::clone(&self.exceptions),
        }
    }
}

/// Renders with an empty context; failures display as empty output.
impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.clone().render(Context::new()).unwrap_or_default();
        f.write_str(&rendered)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("template", &self.template)
            .field("engine", &self.engine.name())
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}
