use std::sync::Arc;

use indexmap::IndexMap;
use stratum_engine::{RenderError, TemplateEngine};

use crate::bag::{DataBag, SharedExceptions};

use super::{Context, Slot, ViewData, ViewId, ViewInterface, ViewNode};

/// Views sharing one slot.
///
/// Created when a second view is nested under a key that already holds a view.
/// Writes fan out to every member and reads return the first member that has
/// the key; rendering concatenates the members' output in the order they were
/// nested.
///
/// Members that are busy rendering (a collection nested inside one of its own
/// members) are skipped by reads and writes instead of panicking.
///
/// A collection always has at least one member and only grows.
pub struct ViewCollection {
    id: ViewId,
    members: Vec<ViewNode>,
    exceptions: SharedExceptions,
}

impl ViewCollection {
    pub fn new(first: ViewNode) -> Self {
        Self {
            id: ViewId::next(),
            members: vec![first],
            exceptions: SharedExceptions::default(),
        }
    }

    /// Records member failures in `bag`, normally the enclosing view's.
    pub fn with_exception_bag(mut self, bag: SharedExceptions) -> Self {
        self.exceptions = bag;
        self
    }

    pub fn exception_bag(&self) -> &SharedExceptions {
        &self.exceptions
    }

    pub fn members(&self) -> &[ViewNode] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn push(&mut self, view: ViewNode) {
        self.members.push(view);
    }

    fn first(&self) -> &ViewNode {
        &self.members[0]
    }

    fn each(&self, mut apply: impl FnMut(&mut dyn ViewInterface)) {
        for member in &self.members {
            member.try_apply_mut(&mut apply);
        }
    }

    /// Per-member data; a busy member shows up as an empty map.
    fn collect_data(&self, read: impl Fn(&dyn ViewInterface) -> ViewData) -> ViewData {
        ViewData::List(
            self.members
                .iter()
                .map(|m| m.try_apply(&read).unwrap_or_else(|| ViewData::Map(IndexMap::new())))
                .collect(),
        )
    }
}

impl ViewInterface for ViewCollection {
    fn id(&self) -> ViewId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "ViewCollection"
    }

    fn template(&self) -> Option<&str> {
        None
    }

    fn engine(&self) -> Option<Arc<dyn TemplateEngine>> {
        None
    }

    fn with(&mut self, context: Context) -> &mut dyn ViewInterface {
        self.each(|view| {
            view.with(context.clone());
        });
        self
    }

    /// Appends `child`; the key is ignored.
    fn nest(&mut self, child: ViewNode, _key: &str) -> &mut dyn ViewInterface {
        self.push(child);
        self
    }

    fn share(&mut self, context: Context) -> &mut dyn ViewInterface {
        self.first().try_apply_mut(|view| {
            view.share(context);
        });
        self
    }

    fn inherit(&mut self, context: Context) -> &mut dyn ViewInterface {
        for member in &self.members {
            member.try_inherit(context.clone());
        }
        self
    }

    fn globals(&self) -> DataBag<Slot> {
        self.first().try_apply(|view| view.globals()).unwrap_or_default()
    }

    fn all(&self) -> ViewData {
        self.collect_data(|view| view.all())
    }

    fn get_array_copy(&self) -> ViewData {
        self.collect_data(|view| view.get_array_copy())
    }

    fn get(&self, key: &str) -> Option<Slot> {
        self.members
            .iter()
            .find_map(|m| m.try_apply(|view| view.get(key)).flatten())
    }

    fn has(&self, key: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.try_apply(|view| view.has(key)).unwrap_or(false))
    }

    fn set(&mut self, key: &str, value: Slot) {
        self.each(|view| view.set(key, value.clone()));
    }

    /// Removes `key` from every member and returns the first removed value.
    fn remove(&mut self, key: &str) -> Option<Slot> {
        let mut removed = None;
        self.each(|view| {
            let value = view.remove(key);
            if removed.is_none() {
                removed = value;
            }
        });
        removed
    }

    /// A failing member contributes `""` and its error goes to the exception
    /// bag. Only [`RenderError::Unresolved`] stops the collection.
    fn render(&mut self, context: Context) -> Result<String, RenderError> {
        let mut content = String::new();
        for member in &self.members {
            match member.render(context.clone()) {
                Ok(output) => content.push_str(&output),
                Err(error) if error.is_unresolved() => return Err(error),
                Err(error) => {
                    tracing::debug!(collection = %self.id, member = %member.id(), %error, "captured member failure");
                    self.exceptions.borrow_mut().add(error);
                }
            }
        }
        Ok(content)
    }

    fn to_array(&self) -> serde_json::Value {
        serde_json::Value::Array(self.members.iter().map(ViewNode::to_array).collect())
    }

    fn as_collection_mut(&mut self) -> Option<&mut ViewCollection> {
        Some(self)
    }

    fn is_collection(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::View;
    use serde_json::json;
    use stratum_engine::{DelegatingEngine, EngineResolver};

    fn collection() -> ViewCollection {
        ViewCollection::new(View::new("one").with_data([("foo", "bar")]).into_node())
    }

    #[test]
    fn test_starts_with_one_member() {
        let views = collection();
        assert_eq!(views.len(), 1);
        assert!(!views.is_empty());
        assert!(views.template().is_none());
        assert!(views.engine().is_none());
    }

    #[test]
    fn test_nest_appends_ignoring_key() {
        let mut views = collection();
        let second = View::new("two").into_node();
        views.nest(second.clone(), "whatever");

        assert_eq!(views.len(), 2);
        assert!(views.members()[1].ptr_eq(&second));
    }

    #[test]
    fn test_render_concatenates_in_order() {
        let mut views = collection();
        views.nest(View::new(" two").into_node(), "");
        views.nest(View::new(" three").into_node(), "");

        assert_eq!(views.render(Context::new()).unwrap(), "one two three");
    }

    #[test]
    fn test_render_passes_context_to_each_member() {
        let mut views = ViewCollection::new(View::new("[:x]").into_node());
        views.nest(View::new("(:x)").into_node(), "");

        assert_eq!(views.render([(":x", 7)].into()).unwrap(), "[7](7)");
    }

    #[test]
    fn test_with_fans_out() {
        let mut views = collection();
        views.nest(View::new("two").with_data([("bar", "baz")]).into_node(), "");

        assert_eq!(views.get_array_copy().to_json(), json!([{"foo": "bar"}, {"bar": "baz"}]));

        views.with([("bar", "foo")].into());
        assert_eq!(
            views.get_array_copy().to_json(),
            json!([{"foo": "bar", "bar": "foo"}, {"bar": "foo"}])
        );
    }

    #[test]
    fn test_reads_return_first_match() {
        let mut views = collection();
        views.nest(
            View::new("two").with_data([("foo", "other"), ("only", "second")]).into_node(),
            "",
        );

        assert_eq!(views.get("foo"), Some(Slot::from("bar")));
        assert_eq!(views.get("only"), Some(Slot::from("second")));
        assert!(views.has("only"));
        assert_eq!(views.get("missing"), None);
    }

    #[test]
    fn test_set_and_remove_fan_out() {
        let mut views = collection();
        views.nest(View::new("two").into_node(), "");

        views.set("k", Slot::from(1));
        assert_eq!(views.all().to_json(), json!([{"foo": "bar", "k": 1}, {"k": 1}]));

        assert_eq!(views.remove("k"), Some(Slot::from(1)));
        assert!(!views.has("k"));
    }

    #[test]
    fn test_share_and_globals_use_first_member() {
        let mut views = collection();
        views.share([("site", "stratum")].into());
        assert_eq!(views.globals().get("site"), Some(&Slot::from("stratum")));
    }

    #[test]
    fn test_inherit_fans_out() {
        let first = View::new("a").into_node();
        let mut views = ViewCollection::new(first.clone());
        views.inherit([("lang", "en")].into());
        assert_eq!(first.get("lang"), Some(Slot::from("en")));
    }

    #[test]
    fn test_failing_member_keeps_siblings() {
        let busy = View::new("B").into_node();
        let mut views = ViewCollection::new(View::new("A").into_node());
        views.nest(busy.clone(), "");
        views.nest(View::new("C").into_node(), "");

        let _guard = busy.borrow_mut();
        assert_eq!(views.render(Context::new()).unwrap(), "AC");

        let bag = views.exception_bag().borrow();
        assert_eq!(bag.count(), 1);
        assert!(matches!(bag.all()[0], RenderError::Recursion(_)));
    }

    #[test]
    fn test_unresolved_member_stops_render() {
        let unresolvable = View::new("page.tpl")
            .with_engine(Arc::new(DelegatingEngine::new(EngineResolver::new())))
            .into_node();
        let mut views = collection();
        views.nest(unresolvable, "");

        let err = views.render(Context::new()).unwrap_err();
        assert!(err.is_unresolved());
        assert!(views.exception_bag().borrow().is_empty());
    }

    #[test]
    fn test_busy_member_is_skipped_by_reads_and_writes() {
        let busy = View::new("two").with_data([("foo", "busy")]).into_node();
        let mut views = collection();
        views.nest(busy.clone(), "");

        let _guard = busy.borrow_mut();
        assert_eq!(views.all().to_json(), json!([{"foo": "bar"}, {}]));
        assert_eq!(views.get_array_copy().to_json(), json!([{"foo": "bar"}, {}]));
        assert_eq!(views.get("foo"), Some(Slot::from("bar")));
        assert!(!views.has("missing"));

        views.set("k", Slot::from(1));
        views.with([("w", 2)].into());
        assert_eq!(views.get("k"), Some(Slot::from(1)));
        assert_eq!(views.remove("k"), Some(Slot::from(1)));
    }

    #[test]
    fn test_to_array_lists_members() {
        let mut views = collection();
        views.nest(View::new("two").into_node(), "");
        assert_eq!(
            views.to_array(),
            json!([{"foo": "bar", "_template": "one"}, {"_template": "two"}])
        );
    }
}
